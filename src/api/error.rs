//! API error types for the issue feed client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the login endpoint or the issue feeds.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or HTTP-layer failure.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The login endpoint rejected the credentials.
    #[error("Authentication failed: HTTP {0}")]
    AuthFailed(StatusCode),

    /// The login endpoint answered 200 but the body had no token line.
    #[error("Malformed login response: {0}")]
    MalformedLoginResponse(String),

    /// An authenticated feed request returned something other than 200.
    #[error("Request failed: HTTP {status}: {context}")]
    Protocol { status: StatusCode, context: String },

    /// The response body was not a feed or entry document.
    #[error("Malformed feed: {0}")]
    MalformedFeed(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create a protocol error from an HTTP status code.
    pub fn from_status(status: StatusCode, context: &str) -> Self {
        ApiError::Protocol {
            status,
            context: context.to_string(),
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthFailed(status) | ApiError::Protocol { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status_keeps_context() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "issue 42");
        match err {
            ApiError::Protocol { status, context } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(context, "issue 42");
            }
            _ => panic!("Expected Protocol error"),
        }
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(
            ApiError::AuthFailed(StatusCode::FORBIDDEN).status(),
            Some(StatusCode::FORBIDDEN)
        );
        assert_eq!(ApiError::MalformedFeed("x".into()).status(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::AuthFailed(StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Authentication failed: HTTP 403 Forbidden");

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "issues feed");
        assert_eq!(
            err.to_string(),
            "Request failed: HTTP 500 Internal Server Error: issues feed"
        );
    }
}
