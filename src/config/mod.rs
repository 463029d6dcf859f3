//! Configuration management for IssueFeed.
//!
//! This module locates and loads the per-user JSON settings file that holds
//! the account credentials and the project to work on.

mod settings;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use settings::Settings;

/// Name of the per-user configuration directory.
pub const APP_DIR: &str = "issuefeed";

/// Name of the settings file inside the configuration directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no per-user configuration directory.
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// The settings file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The settings file is not valid JSON or lacks a required field.
    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field is present but unusable.
    #[error("Invalid settings: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The per-user configuration directory.
///
/// - Linux: `~/.config/issuefeed/`
/// - macOS: `~/Library/Application Support/issuefeed/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\issuefeed\`
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoConfigDir)
}

/// The default location of the settings file.
pub fn settings_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}
