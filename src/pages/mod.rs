//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each protected page wraps its content in `<Protected>` and `<AppShell>`;
//! the login and signup pages are the only public screens.

pub mod account;
pub mod admin;
pub mod dashboard;
pub mod login;
pub mod map;
pub mod signup;
