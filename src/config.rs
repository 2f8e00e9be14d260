//! Client configuration fixed at build time.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use session::SessionConfig;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the dashboard API, without a trailing `/`.
    pub api_base_url: String,
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_base_url(None)
    }
}

impl ClientConfig {
    /// Build config from variables captured at compile time.
    ///
    /// Optional:
    /// - `PARKDASH_API_BASE_URL`: default `http://localhost:8080/api`
    pub fn from_build_env() -> Self {
        Self::with_base_url(option_env!("PARKDASH_API_BASE_URL"))
    }

    pub fn with_base_url(raw: Option<&str>) -> Self {
        let api_base_url = raw
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_owned();
        Self { api_base_url, session: SessionConfig::default() }
    }

    /// Absolute URL of an API endpoint such as `login` or `/user`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}
