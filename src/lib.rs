//! # parkdash
//!
//! Leptos + WASM frontend for the parking-lot dashboard.
//!
//! This crate contains the application shell, pages, the `<Protected>` route
//! guard component, and the browser adapters (HTTP, `sessionStorage`,
//! `document.cookie`) that plug into the `session` crate's coordinator.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging, then hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        leptos::logging::warn!("console logger already installed");
    }
    leptos::mount::hydrate_body(app::App);
}
