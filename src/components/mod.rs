//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `protected` gates route content on the session; `app_shell` renders the
//! authenticated chrome (navigation, user menu, logout) around page content.

pub mod app_shell;
pub mod protected;
