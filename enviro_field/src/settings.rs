//! Optional TOML settings for the field binary.
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! service_name = "soil-field-02"
//!
//! [files]
//! directory = "/tmp/soil"
//! ```

use std::path::{Path, PathBuf};

use enviro::config::{ConfigError, ConfigLoader, SharedConfig};
use serde::Deserialize;

/// Settings file contents; every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSettings {
    /// Logging and instance name
    #[serde(default)]
    pub shared: SharedConfig,
    /// Files transport
    #[serde(default)]
    pub files: FilesSettings,
}

/// `[files]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesSettings {
    /// Directory holding the exchange files
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for FilesSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

impl FieldSettings {
    /// Load and validate, or fall back to defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let settings = <Self as ConfigLoader>::load(path)?;
        settings.shared.validate()?;
        Ok(settings)
    }
}
