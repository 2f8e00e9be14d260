//! HTTP implementation of the session crate's `AuthApi`.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, always with
//! `credentials: include` so the httpOnly refresh cookie travels.
//! Server-side (SSR): stubs returning a network error since these endpoints
//! are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `ApiError` instead of panicking. Non-2xx responses
//! become `ApiError::Status` carrying the server's `{error}` text when there
//! is one, so the login form can show it verbatim.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use session::{AccessToken, ApiError, AuthApi, IdentityGrant, LoginGrant, LoginRequest, RefreshGrant, SignupRequest};

use super::types::User;
#[cfg(any(test, feature = "hydrate"))]
use super::types::ErrorBody;
use crate::config::ClientConfig;

pub const LOGIN_ENDPOINT: &str = "login";
pub const REFRESH_ENDPOINT: &str = "refresh";
pub const LOGOUT_ENDPOINT: &str = "logout";
pub const USER_ENDPOINT: &str = "user";
pub const USERS_ENDPOINT: &str = "users";

#[cfg(any(test, feature = "hydrate"))]
fn request_failed_message(endpoint: &str, status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| format!("{endpoint} request failed: {status}"))
}

#[cfg(not(feature = "hydrate"))]
fn unavailable<T>() -> Result<T, ApiError> {
    Err(ApiError::Network("not available on server".to_owned()))
}

#[cfg(feature = "hydrate")]
fn post(url: &str) -> gloo_net::http::RequestBuilder {
    gloo_net::http::Request::post(url).credentials(web_sys::RequestCredentials::Include)
}

#[cfg(feature = "hydrate")]
fn get(url: &str) -> gloo_net::http::RequestBuilder {
    gloo_net::http::Request::get(url).credentials(web_sys::RequestCredentials::Include)
}

/// Turn a non-2xx response into `ApiError::Status`.
#[cfg(feature = "hydrate")]
async fn ensure_ok(
    endpoint: &str,
    resp: gloo_net::http::Response,
    message: impl FnOnce(u16, &str) -> String,
) -> Result<gloo_net::http::Response, ApiError> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    leptos::logging::warn!("{endpoint} returned {status}");
    Err(ApiError::Status { status, message: message(status, &body) })
}

#[cfg(feature = "hydrate")]
async fn decode<T: serde::de::DeserializeOwned>(resp: gloo_net::http::Response) -> Result<T, ApiError> {
    resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(feature = "hydrate")]
fn network(err: gloo_net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

/// Fetch the signed-in user from `GET /user`.
///
/// # Errors
///
/// Returns an `ApiError` if the request fails or the token is rejected.
pub async fn fetch_user(config: &ClientConfig, token: &AccessToken) -> Result<User, ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let resp = get(&config.endpoint(USER_ENDPOINT))
            .header("Authorization", &session::api::bearer(token))
            .send()
            .await
            .map_err(network)?;
        let resp = ensure_ok(USER_ENDPOINT, resp, |status, body| request_failed_message(USER_ENDPOINT, status, body))
            .await?;
        decode(resp).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, token);
        unavailable()
    }
}

/// `AuthApi` backed by the browser's `fetch`.
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    config: ClientConfig,
}

impl HttpAuthApi {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait::async_trait(?Send)]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginGrant, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = post(&self.config.endpoint(LOGIN_ENDPOINT))
                .json(request)
                .map_err(network)?
                .send()
                .await
                .map_err(network)?;
            let resp = ensure_ok(LOGIN_ENDPOINT, resp, session::api::login_failure_message).await?;
            decode(resp).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            unavailable()
        }
    }

    async fn refresh(&self) -> Result<RefreshGrant, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = post(&self.config.endpoint(REFRESH_ENDPOINT)).send().await.map_err(network)?;
            let resp = ensure_ok(REFRESH_ENDPOINT, resp, |status, body| {
                request_failed_message(REFRESH_ENDPOINT, status, body)
            })
            .await?;
            decode(resp).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            unavailable()
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = post(&self.config.endpoint(LOGOUT_ENDPOINT)).send().await.map_err(network)?;
            ensure_ok(LOGOUT_ENDPOINT, resp, |status, body| request_failed_message(LOGOUT_ENDPOINT, status, body))
                .await?;
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            unavailable()
        }
    }

    async fn fetch_identity(&self, token: &AccessToken) -> Result<IdentityGrant, ApiError> {
        fetch_user(&self.config, token).await.map(|user| user.identity_grant())
    }

    async fn sign_up(&self, request: &SignupRequest) -> Result<(), ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = post(&self.config.endpoint(USERS_ENDPOINT))
                .json(request)
                .map_err(network)?
                .send()
                .await
                .map_err(network)?;
            ensure_ok(USERS_ENDPOINT, resp, session::api::signup_failure_message).await?;
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            unavailable()
        }
    }
}
