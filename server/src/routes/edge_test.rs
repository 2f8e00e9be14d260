use super::*;

use axum::Router;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

fn gated_router() -> Router {
    Router::new()
        .route("/", get(|| async { "root" }))
        .route("/login", get(|| async { "login" }))
        .route("/dashboard", get(|| async { "dashboard" }))
        .route("/dashboard/userLogs", get(|| async { "logs" }))
        .layer(middleware::from_fn_with_state(Arc::new(SessionConfig::default()), edge_gate))
}

async fn send(path: &str, cookies: &[&str]) -> Response {
    let mut builder = axum::http::Request::builder().uri(path);
    for cookie in cookies {
        builder = builder.header(header::COOKIE, *cookie);
    }
    gated_router().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

fn location(response: &Response) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

// =============================================================================
// Redirects
// =============================================================================

#[tokio::test]
async fn protected_page_without_cookies_redirects_to_login_with_return_path() {
    let response = send("/dashboard/userLogs", &[]).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login?redirect=%2Fdashboard%2FuserLogs"));
}

#[tokio::test]
async fn root_redirects_to_home_even_when_signed_in() {
    let response = send("/", &["access_token=jwt"]).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn empty_token_cookie_does_not_count() {
    let response = send("/dashboard", &["access_token=; theme=dark"]).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

// =============================================================================
// Pass-through
// =============================================================================

#[tokio::test]
async fn public_page_renders_without_cookies() {
    let response = send("/login", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_cookie_lets_the_page_render() {
    let response = send("/dashboard", &["theme=dark; access_token=jwt"]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_cookie_in_a_separate_header_lets_the_page_render() {
    let response = send("/dashboard", &["theme=dark", "refresh_token=r1"]).await;
    assert_eq!(response.status(), StatusCode::OK);
}
