//! Configuration management for Epitaph.
//!
//! Configuration is loaded from the platform config directory (or an explicit
//! path) with defaults for every field. Nothing here is process-global: the
//! endpoint, limits and model id travel into the client at construction, so
//! tests can point a client at a local stub.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Epitaph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote vision model settings
    pub api: ApiConfig,

    /// Image attachment limits
    pub limits: LimitsConfig,

    /// Retry settings
    pub retry: RetryConfig,

    /// OCR engine settings
    pub ocr: OcrConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.epitaph.epitaph/config.toml
    /// - Linux: ~/.config/epitaph/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\epitaph\config\config.toml
    ///
    /// Falls back to ~/.epitaph/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "epitaph", "epitaph")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".epitaph").join("config.toml")
            })
    }

    /// Get the resolved credentials file path (with ~ expansion), if one is set.
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.api.credentials_file.as_ref().map(|path| {
            let path_str = path.to_string_lossy();
            PathBuf::from(shellexpand::tilde(&path_str).into_owned())
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
