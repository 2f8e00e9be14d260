//! Authentication API seam and its wire types.
//!
//! SYSTEM CONTEXT
//! ==============
//! The coordinator needs login, refresh, logout, and the current-user lookup
//! used to learn a missing role. Account creation shares the seam so the
//! signup view goes through the same transport. The browser
//! implementation lives in the client crate; tests use an in-memory fake.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::{Deserialize, Serialize};

use crate::credential::AccessToken;

/// Transport-level failure of an API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// `POST /login` body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /users` body. An empty `admin_code` asks for a regular account.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "adminCode")]
    pub admin_code: String,
}

/// `POST /login` success body.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginGrant {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// `POST /refresh` success body. The role may be omitted.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshGrant {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// The fields of `GET /user` the coordinator consumes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityGrant {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// 4xx body returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Server endpoints used by the coordinator.
///
/// `?Send` because every implementation runs on the browser's single thread.
#[async_trait::async_trait(?Send)]
pub trait AuthApi {
    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] carrying the server's message on a 4xx.
    async fn login(&self, request: &LoginRequest) -> Result<LoginGrant, ApiError>;

    /// Mint a new access token from the server-held refresh credential.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-2xx status.
    async fn refresh(&self) -> Result<RefreshGrant, ApiError>;

    /// Revoke the server-held refresh credential.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-2xx status.
    async fn logout(&self) -> Result<(), ApiError>;

    /// Fetch the signed-in user's identity.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-2xx status.
    async fn fetch_identity(&self, token: &AccessToken) -> Result<IdentityGrant, ApiError>;

    /// Create an account. The new user still has to sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] carrying the server's message on a 4xx
    /// (duplicate email, wrong admin code).
    async fn sign_up(&self, request: &SignupRequest) -> Result<(), ApiError>;
}

/// `Authorization` header value for a protected request.
pub fn bearer(token: &AccessToken) -> String {
    format!("Bearer {}", token.as_str())
}

fn server_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|msg| !msg.trim().is_empty())
}

/// Message to show for a failed login, preferring the server's `{error}` text.
pub fn login_failure_message(status: u16, body: &str) -> String {
    server_error(body).unwrap_or_else(|| format!("login failed: {status}"))
}

/// Message to show for a failed signup, preferring the server's `{error}` text.
pub fn signup_failure_message(status: u16, body: &str) -> String {
    server_error(body).unwrap_or_else(|| format!("signup failed: {status}"))
}
