//! Cookie-presence gate in front of server rendering.
//!
//! Requests for protected pages without an access or refresh cookie are
//! redirected to the login page before any markup is produced. Requests that
//! pass still meet the client route guard, which makes the real decision.

#[cfg(test)]
#[path = "edge_test.rs"]
mod edge_test;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use session::{EdgeDecision, SessionConfig, prerender_decision};

/// All `Cookie` headers of `request` folded into one header value.
///
/// HTTP/2 clients may send one header per cookie.
fn cookie_header(request: &Request) -> String {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn edge_gate(State(config): State<Arc<SessionConfig>>, request: Request, next: Next) -> Response {
    let cookies = cookie_header(&request);
    match prerender_decision(&config, request.uri().path(), Some(&cookies)) {
        EdgeDecision::Pass => next.run(request).await,
        EdgeDecision::Redirect(target) => {
            tracing::debug!(path = %request.uri().path(), %target, "edge redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}
