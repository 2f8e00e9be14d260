//! Credential model shared by the store, the persistence bridge and the guard.
//!
//! DESIGN
//! ======
//! The access token is the only client-side authority for "signed in".
//! `user_name` and `role` are display and UI-gating hints; the server
//! re-checks authorization on every request.

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque bearer token issued by the server.
///
/// The client never parses it. `Debug` output hides the value so tokens do
/// not end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token. Returns `None` for an empty or blank string.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Coarse authorization tier used for UI-level gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Whether a session holding `self` may open a view that requires `required`.
    ///
    /// Admins may open every view; users only user views.
    #[must_use]
    pub fn grants(self, required: Role) -> bool {
        match (self, required) {
            (Self::Admin, _) | (Self::User, Self::User) => true,
            (Self::User, Self::Admin) => false,
        }
    }

    /// Parse a role as sent by the server. Unknown values are logged and
    /// treated as absent.
    pub fn from_wire(raw: Option<&str>) -> Option<Self> {
        match raw?.parse() {
            Ok(role) => Some(role),
            Err(err) => {
                log::warn!("ignoring role from server: {err}");
                None
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not part of the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// The current credential. Every field starts absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credential {
    pub access_token: Option<AccessToken>,
    pub user_name: Option<String>,
    pub role: Option<Role>,
}

impl Credential {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// The persistable part of the credential.
    pub fn identity(&self) -> Identity {
        Identity { user_name: self.user_name.clone(), role: self.role }
    }
}

/// Identity snapshot persisted across reloads. Never holds the token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Identity {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.role.is_none()
    }
}

/// Update instruction for one credential field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field<T> {
    /// Leave the current value untouched.
    Keep,
    /// Replace the current value.
    Set(T),
    /// Reset the field to absent.
    Unset,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> Field<T> {
    /// `Some(v)` sets the field, `None` unsets it.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Set)
    }

    /// `Some(v)` sets the field, `None` leaves it untouched.
    pub fn set_if_some(value: Option<T>) -> Self {
        value.map_or(Self::Keep, Self::Set)
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    fn apply(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(value) => *slot = Some(value),
            Self::Unset => *slot = None,
        }
    }
}

/// Partial credential merged into the store. Fields left at [`Field::Keep`]
/// are not touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialPatch {
    pub access_token: Field<AccessToken>,
    pub user_name: Field<String>,
    pub role: Field<Role>,
}

impl CredentialPatch {
    #[must_use]
    pub fn token(mut self, token: AccessToken) -> Self {
        self.access_token = Field::Set(token);
        self
    }

    #[must_use]
    pub fn user_name(mut self, user_name: Option<String>) -> Self {
        self.user_name = Field::from_option(user_name);
        self
    }

    /// Set the role, or mark it unknown when `None`.
    #[must_use]
    pub fn role(mut self, role: Option<Role>) -> Self {
        self.role = Field::from_option(role);
        self
    }

    /// Patch that sets only the fields present in `identity`.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            access_token: Field::Keep,
            user_name: Field::set_if_some(identity.user_name.clone()),
            role: Field::set_if_some(identity.role),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_keep() && self.user_name.is_keep() && self.role.is_keep()
    }

    pub(crate) fn apply_to(self, credential: &mut Credential) {
        self.access_token.apply(&mut credential.access_token);
        self.user_name.apply(&mut credential.user_name);
        self.role.apply(&mut credential.role);
    }
}
