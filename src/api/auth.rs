//! Authentication against the account login endpoint.
//!
//! Credentials are exchanged once per run for a session token, which is then
//! sent as `Authorization: GoogleLogin <token>` on every feed request.
//! There is no refresh, expiry handling or caching.

use std::fmt;

use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

use super::error::{ApiError, Result};

/// The default account login endpoint.
pub const DEFAULT_LOGIN_URL: &str = "https://www.google.com/accounts/ClientLogin";

/// Service name the tracker registers with the login endpoint.
const SERVICE: &str = "code";

/// Account type sent with every login.
const ACCOUNT_TYPE: &str = "GOOGLE";

/// Index of the token line in the login response body.
const TOKEN_LINE: usize = 2;

/// A session token obtained from the login endpoint.
#[derive(Clone)]
pub struct Auth {
    /// The complete "GoogleLogin ..." header value.
    auth_header: String,
}

impl Auth {
    /// Wrap a token returned by the login endpoint.
    pub fn new(token: &str) -> Self {
        Self {
            auth_header: format!("GoogleLogin {}", token),
        }
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth").field("auth_header", &"<redacted>").finish()
    }
}

/// Client identifier sent as the `source` form field.
pub fn source_tag() -> String {
    format!("issuefeed-{}", env!("CARGO_PKG_VERSION"))
}

/// Exchange an email and password for a session token.
///
/// Performs a single form-encoded POST to `login_url`. There is no retry.
///
/// # Errors
///
/// - `ApiError::Transport` if the request cannot be sent or the body read
/// - `ApiError::AuthFailed` on any non-200 status
/// - `ApiError::MalformedLoginResponse` if the body has fewer than three lines
#[instrument(skip(client, password))]
pub async fn login(client: &Client, login_url: &str, email: &str, password: &str) -> Result<Auth> {
    debug!("Requesting session token");

    let source = source_tag();
    let form = [
        ("accountType", ACCOUNT_TYPE),
        ("Email", email),
        ("Passwd", password),
        ("service", SERVICE),
        ("source", source.as_str()),
    ];

    let response = client.post(login_url).form(&form).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status != StatusCode::OK {
        debug!("Login rejected: {}", status);
        return Err(ApiError::AuthFailed(status));
    }

    let token = extract_token(&body)?;
    info!("Obtained session token");
    Ok(Auth::new(token))
}

/// Take the token from the third line of the login response.
///
/// The line is used verbatim; its `Auth=` prefix is not checked. If the
/// endpoint ever reorders its lines this silently picks the wrong value.
fn extract_token(body: &str) -> Result<&str> {
    body.split('\n').nth(TOKEN_LINE).ok_or_else(|| {
        ApiError::MalformedLoginResponse(format!(
            "expected at least {} lines, got {}",
            TOKEN_LINE + 1,
            body.split('\n').count()
        ))
    })
}
