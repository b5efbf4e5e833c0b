use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ppdb_schema::config::{DiaObjectIndex, SchemaConfig};
use ppdb_schema::pipeline::{self, RunError, RunOptions, read_sources};
use tracing_subscriber::{EnvFilter, fmt};

/// Merge PPDB schema fragments onto a base schema and validate the result.
#[derive(Parser, Debug)]
#[command(name = "ppdb-schema", version)]
struct Cli {
    /// Fragment documents, applied in order
    #[arg(required = true, value_name = "FRAGMENT")]
    fragments: Vec<PathBuf>,

    /// Base schema document (repeatable)
    #[arg(short, long, value_name = "FILE")]
    base: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prefix for table and index names
    #[arg(long)]
    prefix: Option<String>,

    /// DiaObject indexing mode: baseline, pix_id_iov, last_object_table
    #[arg(long, value_name = "MODE", value_parser = parse_index_mode)]
    dia_object_index: Option<DiaObjectIndex>,

    /// Add the DiaObjectNightly table
    #[arg(long)]
    nightly: bool,

    /// Validate and emit the physical table set
    #[arg(long)]
    assemble: bool,

    /// Skip fragments that fail to parse instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Emit output even when validation reports problems
    #[arg(long)]
    allow_invalid: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_index_mode(s: &str) -> Result<DiaObjectIndex, String> {
    DiaObjectIndex::from_str(s).ok_or_else(|| format!("invalid indexing mode: {}", s))
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<SchemaConfig> {
    let mut config = match &cli.config {
        Some(path) => SchemaConfig::load(path)?,
        None => SchemaConfig::default(),
    };
    if let Some(prefix) = &cli.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(mode) = cli.dia_object_index {
        config.dia_object_index = mode;
    }
    if cli.nightly {
        config.dia_object_nightly = true;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let options = RunOptions {
        skip_malformed: cli.skip_malformed,
        allow_invalid: cli.allow_invalid,
        assemble: cli.assemble,
    };

    let base = read_sources(&cli.base, false)?;
    let fragments = read_sources(&cli.fragments, cli.skip_malformed)?;

    let output = match pipeline::run(&base, &fragments, &config, &options) {
        Ok(output) => output,
        Err(RunError::Invalid(findings)) => {
            for finding in &findings {
                eprintln!("error: {}", finding);
            }
            bail!("{} validation error(s)", findings.len());
        }
        Err(e) => return Err(e.into()),
    };
    for finding in &output.findings {
        eprintln!("error: {}", finding);
    }

    match &cli.output {
        Some(path) => fs::write(path, &output.yaml)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", output.yaml),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}
