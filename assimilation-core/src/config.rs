//! Optional YAML configuration for `usb-assimilate`.
use crate::transfer::DEFAULT_VENTOY_DIR;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Settings that customise provisioning. The clone and install copy path
/// reads none of them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssimilatorConfig {
    /// Directory holding the bundled `Ventoy2Disk.sh`.
    pub ventoy_dir: PathBuf,
}

impl Default for AssimilatorConfig {
    fn default() -> Self {
        Self {
            ventoy_dir: PathBuf::from(DEFAULT_VENTOY_DIR),
        }
    }
}

impl AssimilatorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::parse(&raw).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    #[cfg(feature = "yaml")]
    fn parse(raw: &str) -> Result<Self, String> {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    }

    #[cfg(not(feature = "yaml"))]
    fn parse(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }
}
