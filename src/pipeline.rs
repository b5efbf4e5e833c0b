//! Load, merge, optionally assemble, validate and serialize in one pass.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::assembly::{AssemblyError, assemble};
use crate::config::SchemaConfig;
use crate::loader::{ParseError, Source, load_source};
use crate::merge::merge;
use crate::schema::Fragment;
use crate::serializer::to_yaml;
use crate::validate::{ValidationError, validate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Drop fragments that fail to load instead of aborting.
    pub skip_malformed: bool,
    /// Produce output even when validation reports findings.
    pub allow_invalid: bool,
    /// Work on the physical table set instead of the merged tables.
    pub assemble: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("{} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

#[derive(Debug)]
pub struct RunOutput {
    pub yaml: String,
    /// Findings let through by `allow_invalid`.
    pub findings: Vec<ValidationError>,
    /// Fragments dropped by `skip_malformed`.
    pub skipped: Vec<ParseError>,
}

/// Read fragment files; unreadable files are dropped when `skip_malformed` is set.
pub fn read_sources(paths: &[PathBuf], skip_malformed: bool) -> Result<Vec<Source>, ParseError> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match Source::from_path(path) {
            Ok(source) => sources.push(source),
            Err(e) if skip_malformed => warn!("skipping fragment: {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(sources)
}

pub fn run(
    base: &[Source],
    fragments: &[Source],
    config: &SchemaConfig,
    options: &RunOptions,
) -> Result<RunOutput, RunError> {
    let mut base_tables = Vec::new();
    for source in base {
        base_tables.extend(load_source(source)?.into_iter().map(Fragment::into_table));
    }

    let mut loaded = Vec::new();
    let mut skipped = Vec::new();
    for source in fragments {
        match load_source(source) {
            Ok(blocks) => loaded.extend(blocks),
            Err(e) if options.skip_malformed => {
                warn!("skipping fragment: {}", e);
                skipped.push(e);
            }
            Err(e) => return Err(e.into()),
        }
    }
    info!(
        base_tables = base_tables.len(),
        fragments = loaded.len(),
        "loaded schema documents"
    );

    let merged = merge(&base_tables, &loaded);
    let schema = if options.assemble {
        assemble(&merged, config)?
    } else {
        merged
    };

    let findings = validate(&schema);
    if !findings.is_empty() && !options.allow_invalid {
        return Err(RunError::Invalid(findings));
    }

    Ok(RunOutput {
        yaml: to_yaml(&schema)?,
        findings,
        skipped,
    })
}
