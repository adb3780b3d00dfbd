//! Run configuration
//!
//! Everything has a default, so an empty YAML file (or none at all) is a
//! valid configuration. The CLI layers `PHAGECLOUDS_*` environment variables
//! and flags over the database credentials loaded here.

use crate::taxonomy::TieBreak;
use phageclouds_gateway::{FailurePolicy, RemoteConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let remote = RemoteConfig::default();
        Self {
            uri: remote.uri,
            user: remote.user,
            password: remote.password,
            database: remote.database,
        }
    }
}

impl DatabaseConfig {
    pub fn to_remote(&self) -> RemoteConfig {
        RemoteConfig {
            uri: self.uri.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Local NCBI taxonomy database
    pub db_path: PathBuf,
    /// `accession,taxid` side file
    pub accession_taxids: PathBuf,
    pub tie_break: TieBreak,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        let db_path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".etetoolkit")
            .join("taxa.sqlite");
        Self {
            db_path,
            accession_taxids: PathBuf::from("phages.accessions.txt.taxid"),
            tie_break: TieBreak::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub height: String,
    pub width: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            height: "1500px".to_string(),
            width: "1500px".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhageCloudsConfig {
    pub database: DatabaseConfig,
    pub taxonomy: TaxonomyConfig,
    pub failure_policy: FailurePolicy,
    pub output_dir: PathBuf,
    pub render: CanvasConfig,
}

impl Default for PhageCloudsConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            taxonomy: TaxonomyConfig::default(),
            failure_policy: FailurePolicy::default(),
            output_dir: PathBuf::from("."),
            render: CanvasConfig::default(),
        }
    }
}

impl PhageCloudsConfig {
    pub fn from_yaml_str(raw: &str, origin: &str) -> ConfigResult<Self> {
        // An empty document deserializes as unit, not as an empty map
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw, &path.display().to_string())?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PhageCloudsConfig::default();
        assert_eq!(config.database.uri, "http://127.0.0.1:7474");
        assert_eq!(config.database.password, "phagedb");
        assert_eq!(config.failure_policy, FailurePolicy::Lenient);
        assert_eq!(config.taxonomy.tie_break, TieBreak::Error);
        assert!(config.taxonomy.db_path.ends_with(".etetoolkit/taxa.sqlite"));
        assert_eq!(config.render.height, "1500px");
    }

    #[test]
    fn test_partial_yaml() {
        let raw = "database:\n  uri: http://db:7474\nfailure_policy: strict\ntaxonomy:\n  tie_break: lowest_id\n";
        let config = PhageCloudsConfig::from_yaml_str(raw, "inline").unwrap();
        assert_eq!(config.database.uri, "http://db:7474");
        assert_eq!(config.database.user, "neo4j");
        assert_eq!(config.failure_policy, FailurePolicy::Strict);
        assert_eq!(config.taxonomy.tie_break, TieBreak::LowestId);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_empty_file_is_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file).unwrap();
        let config = PhageCloudsConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config, PhageCloudsConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = PhageCloudsConfig::from_yaml_str("failure_policy: sometimes\n", "bad.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(PhageCloudsConfig::from_yaml_file("/nonexistent/phageclouds.yaml").is_err());
    }

    #[test]
    fn test_to_remote() {
        let raw = "database:\n  uri: http://other:7474\n  password: s3cret\n";
        let remote = PhageCloudsConfig::from_yaml_str(raw, "inline").unwrap().database.to_remote();
        assert_eq!(remote.uri, "http://other:7474");
        assert_eq!(remote.user, "neo4j");
        assert_eq!(remote.password, "s3cret");
    }
}
