//! Error taxonomy of the session coordinator.
//!
//! ERROR HANDLING
//! ==============
//! Only `RefreshFailed` and `RoleMismatch` ever turn into a navigation the
//! user sees. `CredentialAbsent` is recovered by a refresh,
//! `StorageUnavailable` degrades the session to memory-only, and `StaleWrite`
//! results are dropped.

use crate::api::ApiError;
use crate::credential::Role;
use crate::persistence::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No access token is held and no refresh has been attempted yet.
    #[error("no access token is held")]
    CredentialAbsent,
    /// The refresh exchange failed; the session is over.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),
    /// The session is valid but its role does not open the view.
    #[error("role {actual} does not grant access to {required} views")]
    RoleMismatch { required: Role, actual: Role },
    /// Per-tab storage could not be read or written.
    #[error("session storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
    /// A guard evaluation finished after it was superseded.
    #[error("guard evaluation was superseded")]
    StaleWrite,
    /// The server rejected a login attempt.
    #[error("{0}")]
    Login(String),
    /// The server rejected an account creation.
    #[error("{0}")]
    Signup(String),
    /// Form input failed validation before any request was made.
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}
