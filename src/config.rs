//! Physical schema configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io {
        path: String,
        #[source]
        error: std::io::Error,
    },
    #[error("invalid configuration in {path}: {error}")]
    Toml {
        path: String,
        #[source]
        error: toml::de::Error,
    },
}

/// How the DiaObject table is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiaObjectIndex {
    /// Indices as defined for DiaObject
    #[default]
    Baseline,
    /// (pixelId, diaObjectId, validityStart) primary key
    PixIdIov,
    /// Separate DiaObjectLast table
    LastObjectTable,
}

impl DiaObjectIndex {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "baseline" => Some(Self::Baseline),
            "pix_id_iov" => Some(Self::PixIdIov),
            "last_object_table" => Some(Self::LastObjectTable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    pub dia_object_index: DiaObjectIndex,
    /// Add a DiaObjectNightly table with DiaObject columns and no indices.
    pub dia_object_nightly: bool,
    /// Prepended to every table and index name.
    pub prefix: String,
}

impl SchemaConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path).map_err(|error| ConfigError::Io {
            path: path_str.clone(),
            error,
        })?;
        Self::from_toml(&content).map_err(|error| ConfigError::Toml {
            path: path_str,
            error,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SchemaConfig::from_toml("").unwrap();
        assert_eq!(config, SchemaConfig::default());
        assert_eq!(config.dia_object_index, DiaObjectIndex::Baseline);
        assert!(!config.dia_object_nightly);
        assert!(config.prefix.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = SchemaConfig::from_toml(
            r#"
dia_object_index = "last_object_table"
dia_object_nightly = true
prefix = "test_"
"#,
        )
        .unwrap();
        assert_eq!(config.dia_object_index, DiaObjectIndex::LastObjectTable);
        assert!(config.dia_object_nightly);
        assert_eq!(config.prefix, "test_");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(SchemaConfig::from_toml("dia_object_index = \"clustered\"").is_err());
        assert!(SchemaConfig::from_toml("dia_object_idx = \"baseline\"").is_err());
    }

    #[test]
    fn test_index_mode_from_str() {
        assert_eq!(DiaObjectIndex::from_str("PIX_ID_IOV"), Some(DiaObjectIndex::PixIdIov));
        assert_eq!(DiaObjectIndex::from_str("nope"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dia_object_index = \"pix_id_iov\"").unwrap();
        let config = SchemaConfig::load(file.path()).unwrap();
        assert_eq!(config.dia_object_index, DiaObjectIndex::PixIdIov);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchemaConfig::load(dir.path().join("ppdb.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
