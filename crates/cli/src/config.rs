//! Configuration management for the CLI

use anyhow::{Context, Result};
use monitor_lib::labels::MapLabels;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend base URL, used when `--api-url` is not given
    pub api_url: Option<String>,
    /// Line used when a line-scoped command omits `--line`
    pub default_line: Option<u32>,
    /// Seed used when `--seed` is not given
    pub seed: Option<u64>,
    /// Label overrides keyed by label key
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// English labels with this file's overrides applied
    pub fn labels(&self) -> MapLabels {
        MapLabels::english().merged(self.labels.clone())
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("pmctl").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_lib::labels::{keys, LabelResolver};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.labels.is_empty());
    }

    #[test]
    fn test_load_with_label_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_url":"http://backend:8000","default_line":2,"seed":7,
                "labels":{"oee.availability":"Verfügbarkeit"}}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://backend:8000"));
        assert_eq!(config.default_line, Some(2));
        assert_eq!(config.seed, Some(7));

        let labels = config.labels();
        assert_eq!(labels.resolve(keys::OEE_AVAILABILITY), "Verfügbarkeit");
        assert_eq!(labels.resolve(keys::OEE_QUALITY), "Quality");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
