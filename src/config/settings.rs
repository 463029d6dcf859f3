//! Account and project settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{ConfigError, Result};
use crate::api::auth::DEFAULT_LOGIN_URL;
use crate::api::client::DEFAULT_FEEDS_URL;

/// Settings read from `settings.json`.
#[derive(Clone, Deserialize)]
pub struct Settings {
    /// Account email used to log in.
    pub email: String,
    /// Account password used to log in.
    pub password: String,
    /// The project whose issues are addressed.
    #[serde(default = "default_project")]
    pub project: String,
    /// Root of the hosted feeds.
    #[serde(default = "default_feeds_url")]
    pub feeds_url: String,
    /// Account login endpoint.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Directory the settings were loaded from. Drafts are written here.
    #[serde(skip)]
    pub dir: PathBuf,
}

fn default_project() -> String {
    "go".to_string()
}

fn default_feeds_url() -> String {
    DEFAULT_FEEDS_URL.to_string()
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("project", &self.project)
            .field("feeds_url", &self.feeds_url)
            .field("login_url", &self.login_url)
            .field("dir", &self.dir)
            .finish()
    }
}

impl Settings {
    /// Load and validate the settings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON,
    /// lacks `email` or `password`, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading settings");

        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let mut settings = Self::from_json(&text).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        settings.dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        settings.validate()?;
        Ok(settings)
    }

    fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Validate the settings.
    ///
    /// Checks that the email, password and project are non-empty.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() {
            return Err(ConfigError::ValidationError(
                "email cannot be empty".to_string(),
            ));
        }

        if self.password.is_empty() {
            return Err(ConfigError::ValidationError(
                "password cannot be empty".to_string(),
            ));
        }

        if self.project.is_empty() || self.project.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "project '{}' must be a non-empty name without whitespace",
                self.project
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_defaults_to_go() {
        let settings =
            Settings::from_json(r#"{"email": "a@example.com", "password": "pw"}"#).unwrap();
        assert_eq!(settings.project, "go");
        assert_eq!(settings.feeds_url, DEFAULT_FEEDS_URL);
        assert_eq!(settings.login_url, DEFAULT_LOGIN_URL);
    }

    #[test]
    fn test_explicit_project() {
        let settings = Settings::from_json(
            r#"{"email": "a@example.com", "password": "pw", "project": "chromium"}"#,
        )
        .unwrap();
        assert_eq!(settings.project, "chromium");
    }

    #[test]
    fn test_missing_password_rejected() {
        assert!(Settings::from_json(r#"{"email": "a@example.com"}"#).is_err());
    }

    #[test]
    fn test_empty_email_rejected() {
        let settings = Settings::from_json(r#"{"email": "", "password": "pw"}"#).unwrap();
        let result = settings.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("email cannot be empty"));
    }

    #[test]
    fn test_whitespace_project_rejected() {
        let settings = Settings::from_json(
            r#"{"email": "a@example.com", "password": "pw", "project": "my project"}"#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_records_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"email": "a@example.com", "password": "pw"}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.email, "a@example.com");
        assert_eq!(settings.dir, dir.path());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = Settings::load(&dir.path().join("settings.json"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let result = Settings::load(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings =
            Settings::from_json(r#"{"email": "a@example.com", "password": "s3cret"}"#).unwrap();
        assert!(!format!("{:?}", settings).contains("s3cret"));
    }
}
