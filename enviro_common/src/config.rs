//! Settings files and the error shared by every configuration source.
//!
//! Two kinds of file configure a field process: the optional TOML settings
//! file (loaded through [`ConfigLoader`]) and the line-oriented
//! environment-description file written for the driver. Both report
//! failures as [`ConfigError`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use enviro_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct SoilSettings {
//!     #[serde(default)]
//!     shared: SharedConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let settings = SoilSettings::load(Path::new("soil.toml"))?;
//!     settings.shared.validate()?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to read, parse or validate a configuration source.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("configuration file {} not found", path.display())]
    FileNotFound {
        /// Path that was tried
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {}: {reason}", path.display())]
    Unreadable {
        /// Path that was tried
        path: PathBuf,
        /// OS error text
        reason: String,
    },

    /// Syntax or schema error.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Values parsed but are not acceptable.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log verbosity, lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-line protocol tracing
    Trace,
    /// Per-chunk and per-episode events
    Debug,
    /// Start-up, shutdown and transport selection
    #[default]
    Info,
    /// Ignored directives and dropped input
    Warn,
    /// Fatal failures only
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// `[shared]` section common to every field binary.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "soil-field-02"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Verbosity when `-v` and `RUST_LOG` are absent.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance name shown in the start-up log line.
    #[serde(default = "SharedConfig::default_service_name")]
    pub service_name: String,
}

impl SharedConfig {
    fn default_service_name() -> String {
        String::from("soil-field")
    }

    /// Reject blank instance names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name must not be blank".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: Self::default_service_name(),
        }
    }
}

/// TOML loading for any deserializable settings type.
///
/// A missing file is [`ConfigError::FileNotFound`]; bad TOML or a schema
/// mismatch is [`ConfigError::ParseError`].
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and deserialize `path`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_config_file(path)?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

/// Whole contents of a configuration file.
pub fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })
}
