//! Networking modules for the dashboard REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` implements the session crate's `AuthApi` over HTTP and hosts the
//! other protected calls; `types` defines the wire schema they decode.

pub mod api;
pub mod types;
