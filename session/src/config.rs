//! Session configuration: routes, cookie names, and storage keys.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/dashboard";
pub const DEFAULT_RETURN_PARAM: &str = "redirect";
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/login", "/signup"];
pub const DEFAULT_TOKEN_COOKIE: &str = "access_token";
pub const DEFAULT_REFRESH_COOKIE: &str = "refresh_token";
/// Matches the server's access-token lifetime (15 minutes).
pub const DEFAULT_TOKEN_MAX_AGE_SECS: u32 = 900;
pub const DEFAULT_IDENTITY_KEY: &str = "parkdash.identity";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Route of the login view.
    pub login_path: String,
    /// Default authenticated view; also the target of role denials.
    pub home_path: String,
    /// Query parameter carrying the return path to the login view.
    pub return_param: String,
    /// Route prefixes that never require a session.
    pub public_paths: Vec<String>,
    /// Client-visible cookie holding the access token.
    pub token_cookie: String,
    /// httpOnly cookie holding the refresh credential (server-owned).
    pub refresh_cookie: String,
    pub token_max_age_secs: u32,
    /// Per-tab storage key of the identity snapshot.
    pub identity_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            return_param: DEFAULT_RETURN_PARAM.to_owned(),
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| (*p).to_owned()).collect(),
            token_cookie: DEFAULT_TOKEN_COOKIE.to_owned(),
            refresh_cookie: DEFAULT_REFRESH_COOKIE.to_owned(),
            token_max_age_secs: DEFAULT_TOKEN_MAX_AGE_SECS,
            identity_key: DEFAULT_IDENTITY_KEY.to_owned(),
        }
    }
}

impl SessionConfig {
    /// Login route carrying `requested_path` as the return parameter.
    pub fn login_redirect(&self, requested_path: &str) -> String {
        format!("{}?{}={}", self.login_path, self.return_param, urlencoding::encode(requested_path))
    }

    /// Whether `path` is one of the public routes or below one.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|public| {
            path.strip_prefix(public.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    /// Where login should forward to, given the (already decoded) return
    /// parameter.
    ///
    /// Only local absolute paths are honored; anything that could leave the
    /// origin, or that points back at the login view, falls back to the home
    /// view.
    pub fn return_target(&self, raw: Option<&str>) -> String {
        let Some(path) = raw.map(str::trim).filter(|p| !p.is_empty()) else {
            return self.home_path.clone();
        };
        let local = path.starts_with('/') && !path.starts_with("//") && !path.contains('\\');
        let is_login = path == self.login_path || path.starts_with(&format!("{}?", self.login_path));
        if local && !is_login { path.to_owned() } else { self.home_path.clone() }
    }
}
