//! Configuration management for revcryptfs

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding extra exclude files, separated by `:`
pub const ENV_EXCLUDE_FROM: &str = "REVCRYPTFS_EXCLUDE_FROM";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Plaintext tree presented through the reverse mount
    pub source_dir: PathBuf,

    /// Exclusion configuration
    #[serde(default)]
    pub exclude: ExcludeConfig,
}

/// Exclusion configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeConfig {
    /// Paths relative to the source root, anchored to the root
    #[serde(default)]
    pub exclude: Vec<String>,

    /// gitignore-style patterns, matched at any depth
    #[serde(default)]
    pub exclude_wildcard: Vec<String>,

    /// Files with one pattern per line
    #[serde(default)]
    pub exclude_from: Vec<PathBuf>,
}

impl ExcludeConfig {
    /// True when no exclusion input is configured at all
    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty() && self.exclude_wildcard.is_empty() && self.exclude_from.is_empty()
    }
}

impl Config {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Config {
            source_dir: source_dir.into(),
            exclude: ExcludeConfig::default(),
        }
    }

    /// Load configuration from a file, with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(files) = std::env::var(ENV_EXCLUDE_FROM) {
            self.exclude.exclude_from.extend(
                files
                    .split(':')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(PathBuf::from),
            );
        }
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "Source directory is required".to_string(),
            ));
        }

        if self.exclude.exclude.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "Exclude paths must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
