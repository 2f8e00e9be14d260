//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Provided as an `RwSignal<AuthState>` via context and kept in sync with the
//! session's credential store, so user-aware components re-render when the
//! identity changes. Access decisions never read this signal; they go
//! through a `RouteGuard`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use session::{Credential, Role};

/// Display projection of the credential. Never carries the token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user_name: Option<String>,
    pub role: Option<Role>,
    pub authenticated: bool,
    /// Whether the session has been hydrated on the client.
    pub hydrated: bool,
}

impl AuthState {
    pub fn from_credential(credential: &Credential, hydrated: bool) -> Self {
        Self {
            user_name: credential.user_name.clone(),
            role: credential.role,
            authenticated: credential.is_authenticated(),
            hydrated,
        }
    }

    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or("Account")
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}
