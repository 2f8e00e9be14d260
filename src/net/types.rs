//! Wire DTOs for the dashboard API.
//!
//! DESIGN
//! ======
//! Field names follow the API's JSON (`camelCase` on the user record). The
//! auth request/response bodies live in the session crate and are re-exported
//! here so pages import every wire type from one place.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

pub use session::api::{ErrorBody, IdentityGrant, LoginGrant, LoginRequest, RefreshGrant};

/// The signed-in user as returned by `GET /user`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Lot the user manages, if any.
    #[serde(default, rename = "parkingLotID")]
    pub parking_lot_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    /// The part of the record the session coordinator consumes.
    pub fn identity_grant(&self) -> IdentityGrant {
        IdentityGrant { name: Some(self.name.clone()), role: Some(self.role.clone()) }
    }
}
