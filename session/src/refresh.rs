//! Silent refresh exchange.
//!
//! Exactly one request per call and no retries. Callers go through
//! [`Session::refresh`](crate::Session::refresh), which keeps at most one
//! exchange in flight.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::rc::Rc;

use crate::api::AuthApi;
use crate::config::SessionConfig;
use crate::cookies::CookieJar;
use crate::credential::{AccessToken, CredentialPatch, Role};
use crate::error::SessionError;
use crate::store::CredentialStore;

#[derive(Clone)]
pub struct RefreshExchange {
    api: Rc<dyn AuthApi>,
    store: CredentialStore,
    cookies: Rc<dyn CookieJar>,
    config: Rc<SessionConfig>,
}

impl RefreshExchange {
    pub fn new(
        api: Rc<dyn AuthApi>,
        store: CredentialStore,
        cookies: Rc<dyn CookieJar>,
        config: Rc<SessionConfig>,
    ) -> Self {
        Self { api, store, cookies, config }
    }

    /// Ask the server for a new access token.
    ///
    /// On success the token is installed, the role is installed when the
    /// server sent one and marked unknown when it did not, and the
    /// credential cookie is rewritten. On failure nothing is mutated.
    pub async fn try_refresh(&self) -> bool {
        let grant = match self.api.refresh().await {
            Ok(grant) => grant,
            Err(err) => {
                log::warn!("{}", SessionError::RefreshFailed(err.to_string()));
                return false;
            }
        };
        let Some(token) = AccessToken::new(grant.access_token) else {
            log::warn!("{}", SessionError::RefreshFailed("response carried no access token".to_owned()));
            return false;
        };
        let role = Role::from_wire(grant.role.as_deref());
        self.cookies.set(&self.config.token_cookie, token.as_str(), self.config.token_max_age_secs);
        self.store.set_credential(CredentialPatch::default().token(token).role(role));
        log::debug!("access token refreshed (role known: {})", role.is_some());
        true
    }
}
