//! Pre-render allow/deny decision for a server or edge layer.
//!
//! Looks only at cookie presence: a forged or expired cookie still renders
//! the page shell, where the route guard makes the real decision.

#[cfg(test)]
#[path = "edge_test.rs"]
mod edge_test;

use crate::config::SessionConfig;
use crate::cookies::cookie_value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeDecision {
    Pass,
    Redirect(String),
}

/// Decide whether `path` may be rendered for a request carrying `cookie_header`.
pub fn prerender_decision(config: &SessionConfig, path: &str, cookie_header: Option<&str>) -> EdgeDecision {
    if path == "/" {
        return EdgeDecision::Redirect(config.home_path.clone());
    }
    if config.is_public(path) {
        return EdgeDecision::Pass;
    }
    let header = cookie_header.unwrap_or_default();
    let has_token = cookie_value(header, &config.token_cookie).is_some();
    let has_refresh = cookie_value(header, &config.refresh_cookie).is_some();
    if has_token || has_refresh {
        EdgeDecision::Pass
    } else {
        EdgeDecision::Redirect(config.login_redirect(path))
    }
}
