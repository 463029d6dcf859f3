//! Centralized error types for IssueFeed.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages. All error types use `thiserror` for
//! ergonomic error handling. Nothing in the core recovers from an error: it
//! is carried up to the dispatcher in `main`, which prints it and exits.

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::content::RenderError;
use crate::draft::{DraftError, EditorError};

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Login and feed errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Content that could not be flattened for display.
    #[error("{0}")]
    Render(#[from] RenderError),

    /// New-issue draft errors.
    #[error("{0}")]
    Draft(#[from] DraftError),

    /// IO errors (writing output, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ReadError { path, .. } => format!(
                    "Could not read {}. Create it with your \"email\" and \"password\".",
                    path.display()
                ),
                ConfigError::ParseError { path, source } => {
                    format!("{} is invalid: {}", path.display(), source)
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            AppError::Api(e) => match e {
                ApiError::AuthFailed(status) => {
                    format!("Failed to authenticate: {}", status)
                }
                ApiError::MalformedLoginResponse(msg) => {
                    format!("Failed to authenticate: unexpected login response ({})", msg)
                }
                ApiError::Transport(err) => format!("Connection failed: {}", err),
                ApiError::Protocol { status, .. } => format!("Request failed: {}", status),
                ApiError::MalformedFeed(msg) => format!("Failed to parse xml: {}", msg),
            },
            AppError::Render(e) => format!("Failed to render issue content: {}", e),
            AppError::Draft(e) => match e {
                DraftError::Validation => "failed to create issue".to_string(),
                DraftError::Editor(err) => format!("failed to create issue: {}", err),
                DraftError::Io(err) => format!("failed to create issue: {}", err),
            },
            AppError::Io(e) => format!("Output failed: {}", e),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Api(ApiError::AuthFailed(_))
            | AppError::Api(ApiError::MalformedLoginResponse(_)) => 3,
            AppError::Api(ApiError::Transport(_)) | AppError::Api(ApiError::Protocol { .. }) => 4,
            AppError::Api(ApiError::MalformedFeed(_)) | AppError::Render(_) => 5,
            AppError::Draft(_) => 6,
            AppError::Io(_) => 1,
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::ReadError { .. }) => {
                Some("Write {\"email\": \"...\", \"password\": \"...\"} to the settings file.")
            }
            AppError::Api(ApiError::AuthFailed(_)) => {
                Some("Check the email and password in your settings file.")
            }
            AppError::Api(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
                Some("Check the issue ids and the \"project\" in your settings file.")
            }
            AppError::Draft(DraftError::Validation) => {
                Some("Keep the 'from: ' and 'title: ' lines at the top of the draft and fill them in.")
            }
            AppError::Draft(DraftError::Editor(EditorError::Spawn { .. })) => {
                Some("Set the EDITOR environment variable to an installed editor.")
            }
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
