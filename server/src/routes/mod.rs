//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Serves the Leptos app with SSR under a single Axum router. Every page
//! request passes the cookie-presence gate in `edge` before rendering; the
//! WASM bundle under `/pkg` and `/healthz` skip it.

pub mod edge;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use parkdash::config::ClientConfig;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Leptos SSR pages behind the edge gate, plus static assets.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded (missing or
/// malformed `[package.metadata.leptos]` section or `LEPTOS_*` variables).
pub fn app() -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(parkdash::app::App);
    let session_config = Arc::new(ClientConfig::from_build_env().session);

    let pages = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            move || parkdash::app::shell(opts.clone())
        })
        .with_state(leptos_options.clone())
        .layer(middleware::from_fn_with_state(session_config, edge::edge_gate));

    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(Router::new()
        .route("/healthz", get(healthz))
        .merge(pages)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg")))
        .layer(TraceLayer::new_for_http()))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
