//! Session and authorization coordinator for the parking dashboard client.
//!
//! This crate owns the credential lifecycle of a browser session: the
//! reactive credential store, the per-tab identity snapshot, the hydration
//! gate, the silent refresh exchange, the route guard state machine, signup,
//! and logout. It is UI-framework agnostic; the `parkdash` client crate wires it
//! into Leptos and the browser.
//!
//! DESIGN
//! ======
//! Everything runs on one thread. Shared state lives behind `Rc` handles that
//! are cheap to clone into `'static` futures, and all coordination between
//! asynchronous continuations goes through the [`Session`] context object
//! rather than ambient globals.

pub mod api;
pub mod config;
pub mod cookies;
pub mod coordinator;
pub mod credential;
pub mod edge;
pub mod error;
pub mod guard;
pub mod hydration;
pub mod logout;
pub mod persistence;
pub mod refresh;
pub mod signup;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use api::{ApiError, AuthApi, IdentityGrant, LoginGrant, LoginRequest, RefreshGrant, SignupRequest};
pub use config::SessionConfig;
pub use cookies::{CookieJar, MemoryCookieJar};
pub use coordinator::{Session, validate_login_input};
pub use credential::{AccessToken, Credential, CredentialPatch, Field, Identity, Role};
pub use edge::{EdgeDecision, prerender_decision};
pub use error::SessionError;
pub use guard::{GuardDecision, GuardOptions, GuardState, RouteGuard};
pub use hydration::HydrationGate;
pub use logout::Navigator;
pub use persistence::{IdentityStorage, MemoryStorage, PersistenceBridge, StorageError, UnavailableStorage};
pub use refresh::RefreshExchange;
pub use signup::{SignupForm, validate_signup_input};
pub use store::{CredentialStore, Subscription};
