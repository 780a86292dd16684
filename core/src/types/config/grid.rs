use crate::types::chunk_size::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Grid settings, persisted as grid.toml.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    #[serde(default)]
    pub bucket: BucketConfig,
}

impl GridConfig {
    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, GridConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), GridConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.bucket.prefix.trim().is_empty() {
            errors.push("prefix must not be empty".to_string());
        }

        if self.bucket.chunk_size == 0 {
            errors.push("chunk_size must be at least 1".to_string());
        }

        if self.bucket.chunk_size > MAX_CHUNK_SIZE {
            errors.push(format!("chunk_size must be at most {MAX_CHUNK_SIZE}"));
        }

        errors
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let defaults = Self::default();
        Self {
            bucket: BucketConfig {
                prefix: if self.bucket.prefix.trim().is_empty() {
                    defaults.bucket.prefix
                } else {
                    self.bucket.prefix.clone()
                },
                chunk_size: if self.bucket.chunk_size == 0
                    || self.bucket.chunk_size > MAX_CHUNK_SIZE
                {
                    defaults.bucket.chunk_size
                } else {
                    self.bucket.chunk_size
                },
            },
        }
    }
}

/// Collection naming and chunking for one grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Collections are named `<prefix>.files` and `<prefix>.chunks`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_prefix() -> String {
    "fs".to_string()
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

/// Errors that can occur when loading or saving config.
#[derive(Debug, Error)]
pub enum GridConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
