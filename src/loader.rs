//! Loader for schema fragment documents.
//!
//! A source holds one or more YAML documents separated by `---`. Each
//! document is a block keyed by `table:` with optional `columns:` and
//! `indices:` lists:
//!
//! ```yaml
//! table: DiaObjectLast
//! columns:
//! - name: pixelId
//!   type: BIGINT
//!   nullable: false
//! indices:
//! - name: PK_DiaObjectLast
//!   columns: [pixelId, diaObjectId]
//!   type: PRIMARY
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::schema::{ColumnDef, ColumnType, DefaultValue, Fragment, IndexDef, IndexType};

/// Where in the input a block came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub origin: String,
    /// 1-based document number within the source.
    pub block: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (block {})", self.origin, self.block)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{origin}: {error}")]
    Io {
        origin: String,
        #[source]
        error: std::io::Error,
    },
    #[error("{at}: malformed YAML: {error}")]
    Malformed {
        at: Location,
        #[source]
        error: serde_yaml::Error,
    },
    #[error("{at}: block is not a mapping")]
    NotAMapping { at: Location },
    #[error("{at}: block has no `table` key")]
    MissingTable { at: Location },
    #[error("{at}: {entry} #{position} of table {table} is missing `{field}`")]
    MissingField {
        at: Location,
        table: String,
        entry: &'static str,
        position: usize,
        field: &'static str,
    },
    #[error("{at}: index {index} of table {table} lists no columns")]
    EmptyIndex {
        at: Location,
        table: String,
        index: String,
    },
    #[error("{at}: column {table}.{column} has unknown type {typ}")]
    UnknownColumnType {
        at: Location,
        table: String,
        column: String,
        typ: String,
    },
    #[error("{at}: index {index} of table {table} has unknown type {typ}")]
    UnknownIndexType {
        at: Location,
        table: String,
        index: String,
        typ: String,
    },
    #[error("{at}: column {table}.{column} has a non-scalar default")]
    InvalidDefault {
        at: Location,
        table: String,
        column: String,
    },
}

/// A named fragment document.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let name = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self { name, text }),
            Err(error) => Err(ParseError::Io {
                origin: name,
                error,
            }),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<RawColumn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<RawIndex>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// Parse every source in order. The first malformed block aborts loading.
pub fn load_fragments(sources: &[Source]) -> Result<Vec<Fragment>, ParseError> {
    let mut fragments = Vec::new();
    for source in sources {
        fragments.extend(load_source(source)?);
    }
    Ok(fragments)
}

/// Parse a single inline document.
pub fn load_str(text: &str) -> Result<Vec<Fragment>, ParseError> {
    load_source(&Source::new("<input>", text))
}

/// Parse all blocks of one source.
pub fn load_source(source: &Source) -> Result<Vec<Fragment>, ParseError> {
    let mut fragments = Vec::new();

    let blank = source
        .text
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---");
    if blank {
        debug!(source = %source.name, "fragment source has no blocks");
        return Ok(fragments);
    }

    for (i, document) in serde_yaml::Deserializer::from_str(&source.text).enumerate() {
        let at = Location {
            origin: source.name.clone(),
            block: i + 1,
        };
        let value = Value::deserialize(document).map_err(|error| ParseError::Malformed {
            at: at.clone(),
            error,
        })?;

        match value {
            // Comment-only document
            Value::Null => continue,
            Value::Mapping(_) => {}
            _ => return Err(ParseError::NotAMapping { at }),
        }

        let raw: RawBlock = serde_yaml::from_value(value).map_err(|error| {
            ParseError::Malformed {
                at: at.clone(),
                error,
            }
        })?;
        fragments.push(convert_block(raw, &at)?);
    }

    debug!(source = %source.name, blocks = fragments.len(), "loaded fragment source");
    Ok(fragments)
}

fn convert_block(raw: RawBlock, at: &Location) -> Result<Fragment, ParseError> {
    let table = match raw.table {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ParseError::MissingTable { at: at.clone() }),
    };

    let columns = match raw.columns {
        Some(columns) => Some(
            columns
                .into_iter()
                .enumerate()
                .map(|(i, c)| convert_column(c, i + 1, &table, at))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let indices = match raw.indices {
        Some(indices) => Some(
            indices
                .into_iter()
                .enumerate()
                .map(|(i, idx)| convert_index(idx, i + 1, &table, at))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    Ok(Fragment {
        table,
        columns,
        indices,
    })
}

fn missing(
    at: &Location,
    table: &str,
    entry: &'static str,
    position: usize,
    field: &'static str,
) -> ParseError {
    ParseError::MissingField {
        at: at.clone(),
        table: table.to_string(),
        entry,
        position,
        field,
    }
}

fn convert_column(
    raw: RawColumn,
    position: usize,
    table: &str,
    at: &Location,
) -> Result<ColumnDef, ParseError> {
    let name = raw
        .name
        .ok_or_else(|| missing(at, table, "column", position, "name"))?;
    let typ_name = raw
        .typ
        .ok_or_else(|| missing(at, table, "column", position, "type"))?;
    let typ = ColumnType::from_str(&typ_name).ok_or_else(|| ParseError::UnknownColumnType {
        at: at.clone(),
        table: table.to_string(),
        column: name.clone(),
        typ: typ_name.clone(),
    })?;

    let default = match raw.default {
        Some(value) => convert_default(value).ok_or_else(|| ParseError::InvalidDefault {
            at: at.clone(),
            table: table.to_string(),
            column: name.clone(),
        })?,
        None => None,
    };

    Ok(ColumnDef {
        name,
        typ,
        nullable: raw.nullable.unwrap_or(true),
        default,
        description: raw.description,
        ucd: raw.ucd,
        unit: raw.unit,
    })
}

/// `Some(None)` for an explicit null, `None` for a non-scalar.
fn convert_default(value: Value) -> Option<Option<DefaultValue>> {
    match value {
        Value::Null => Some(None),
        Value::Bool(b) => Some(Some(DefaultValue::Bool(b))),
        Value::Number(n) => {
            let v = match n.as_i64() {
                Some(i) => DefaultValue::Int(i),
                None => DefaultValue::Float(n.as_f64()?),
            };
            Some(Some(v))
        }
        Value::String(s) => Some(Some(DefaultValue::Str(s))),
        Value::Tagged(tagged) => convert_default(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn convert_index(
    raw: RawIndex,
    position: usize,
    table: &str,
    at: &Location,
) -> Result<IndexDef, ParseError> {
    let name = raw
        .name
        .ok_or_else(|| missing(at, table, "index", position, "name"))?;
    let columns = raw
        .columns
        .ok_or_else(|| missing(at, table, "index", position, "columns"))?;
    if columns.is_empty() {
        return Err(ParseError::EmptyIndex {
            at: at.clone(),
            table: table.to_string(),
            index: name,
        });
    }

    let typ = match raw.typ {
        Some(t) => IndexType::from_str(&t).ok_or_else(|| ParseError::UnknownIndexType {
            at: at.clone(),
            table: table.to_string(),
            index: name.clone(),
            typ: t.clone(),
        })?,
        None => IndexType::default(),
    };

    Ok(IndexDef { name, columns, typ })
}
