//! Column and index type vocabularies of the catalog schema.

use std::fmt;

/// Catalog column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Double,
    Float,
    Datetime,
    Bigint,
    Integer,
    Int,
    Tinyint,
    Blob,
    Char,
    Bool,
}

impl ColumnType {
    /// Parse a catalog type name, ignoring case.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DOUBLE" => Some(Self::Double),
            "FLOAT" => Some(Self::Float),
            "DATETIME" => Some(Self::Datetime),
            "BIGINT" => Some(Self::Bigint),
            "INTEGER" => Some(Self::Integer),
            "INT" => Some(Self::Int),
            "TINYINT" => Some(Self::Tinyint),
            "BLOB" => Some(Self::Blob),
            "CHAR" => Some(Self::Char),
            "BOOL" => Some(Self::Bool),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Double => "DOUBLE",
            Self::Float => "FLOAT",
            Self::Datetime => "DATETIME",
            Self::Bigint => "BIGINT",
            Self::Integer => "INTEGER",
            Self::Int => "INT",
            Self::Tinyint => "TINYINT",
            Self::Blob => "BLOB",
            Self::Char => "CHAR",
            Self::Bool => "BOOL",
        }
    }

    /// Whether `value` can serve as a default for a column of this type.
    pub fn accepts(self, value: &DefaultValue) -> bool {
        match self {
            Self::Bigint | Self::Integer | Self::Int | Self::Tinyint => {
                matches!(value, DefaultValue::Int(_))
            }
            Self::Double | Self::Float => {
                matches!(value, DefaultValue::Int(_) | DefaultValue::Float(_))
            }
            Self::Datetime | Self::Char | Self::Blob => matches!(value, DefaultValue::Str(_)),
            Self::Bool => matches!(
                value,
                DefaultValue::Bool(_) | DefaultValue::Int(0) | DefaultValue::Int(1)
            ),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    Primary,
    #[default]
    Index,
    Unique,
}

impl IndexType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PRIMARY" => Some(Self::Primary),
            "INDEX" => Some(Self::Index),
            "UNIQUE" => Some(Self::Unique),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY",
            Self::Index => "INDEX",
            Self::Unique => "UNIQUE",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar column default.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => write!(f, "{:?}", s),
        }
    }
}
