//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! The credential itself lives in the session crate's store; `auth` holds the
//! reactive projection of it that components read.

pub mod auth;
