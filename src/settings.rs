//! App settings stored as a TOML file under the `.wavepeek` root.
//!
//! Missing files fall back to defaults so a fresh install works without any
//! configuration step.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;

/// Default filename used to store the app settings.
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// User-tunable settings for the waveform pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Default display width, in pixels, used when a request does not carry
    /// its own.
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    /// Upper bound, in milliseconds, on waiting for the worker to stop during
    /// shutdown before it is detached.
    #[serde(default = "default_shutdown_wait_ms")]
    pub shutdown_wait_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_width: default_target_width(),
            shutdown_wait_ms: default_shutdown_wait_ms(),
        }
    }
}

impl Settings {
    /// Shutdown bound as a [`Duration`].
    pub fn shutdown_wait(&self) -> Duration {
        Duration::from_millis(self.shutdown_wait_ms)
    }
}

fn default_target_width() -> u32 {
    680
}

fn default_shutdown_wait_ms() -> u64 {
    2_000
}

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Could not resolve the settings directory.
    #[error(transparent)]
    Dir(#[from] app_dirs::AppDirError),
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO failure.
        source: std::io::Error,
    },
    /// Settings file contents are not valid TOML for [`Settings`].
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// TOML deserialization failure.
        source: toml::de::Error,
    },
    /// Settings could not be serialized to TOML.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Failed to write the settings file.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying IO failure.
        source: std::io::Error,
    },
}

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn settings_path() -> Result<PathBuf, SettingsError> {
    Ok(app_dirs::app_root_dir()?.join(SETTINGS_FILE_NAME))
}

/// Load settings from the default location, returning defaults if missing.
pub fn load_or_default() -> Result<Settings, SettingsError> {
    load_from(&settings_path()?)
}

/// Load settings from `path`, returning defaults if the file does not exist.
pub fn load_from(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist settings to `path`, creating parent directories as needed.
pub fn save_to(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(settings)?;
    std::fs::write(path, text).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
