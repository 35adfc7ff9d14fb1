use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::download::BMF_URL;
use crate::error::{PipelineError, Result};
use crate::validate::DEFAULT_KENNZIFFER_PATTERN;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to fetch the raw extract from.
    pub source_url: String,
    /// Sanity floor for the record count; fewer records fail validation.
    pub min_rows: usize,
    /// Directory the artifacts and schema documents are written to.
    pub output_dir: PathBuf,
    /// Override for the Kennziffer warning pattern.
    pub kennziffer_pattern: String,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub retries: u32,
    pub delay_seconds: u64,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: BMF_URL.to_string(),
            min_rows: 100,
            output_dir: PathBuf::from("data"),
            kennziffer_pattern: DEFAULT_KENNZIFFER_PATTERN.to_string(),
            download: DownloadConfig::default(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            delay_seconds: 5,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// The config file is optional; compiled-in defaults apply when it is
    /// absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn kennziffer_regex(&self) -> Result<Regex> {
        Regex::new(&self.kennziffer_pattern)
            .map_err(|e| PipelineError::Config(format!("invalid kennziffer_pattern: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_config_file() {
        let config = Config::load_or_default(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.source_url, BMF_URL);
        assert_eq!(config.min_rows, 100);
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.download.retries, 3);
        assert_eq!(config.download.timeout_seconds, 30);
        config.kennziffer_regex().unwrap();
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "min_rows = 5\n\n[download]\nretries = 1").unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.min_rows, 5);
        assert_eq!(config.download.retries, 1);
        // Untouched keys keep their defaults.
        assert_eq!(config.source_url, BMF_URL);
        assert_eq!(config.download.delay_seconds, 5);
    }

    #[test]
    fn invalid_kennziffer_pattern_is_config_error() {
        let config = Config {
            kennziffer_pattern: "([unclosed".to_string(),
            ..Config::default()
        };
        match config.kennziffer_regex() {
            Err(PipelineError::Config(msg)) => assert!(msg.contains("kennziffer_pattern")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "min_rows = [not an int").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
