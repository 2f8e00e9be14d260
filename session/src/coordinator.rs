//! The session context object.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `Session` is created at startup and handed to every route guard and
//! page that needs the credential. It owns the store and its collaborators,
//! and it is the only place that starts a refresh exchange.
//!
//! DESIGN
//! ======
//! Concurrent refresh requests (two guards mounting at once, a double mount,
//! a re-render mid-check) share a single in-flight exchange through a
//! `Shared` future, so the store only ever has one writer at a time.

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::api::{ApiError, AuthApi, LoginRequest, bearer};
use crate::config::SessionConfig;
use crate::cookies::CookieJar;
use crate::credential::{AccessToken, Credential, CredentialPatch, Field, Identity, Role};
use crate::error::SessionError;
use crate::hydration::HydrationGate;
use crate::persistence::{IdentityStorage, PersistenceBridge};
use crate::refresh::RefreshExchange;
use crate::store::CredentialStore;

/// Refresh exchange shared by every caller while it is in flight.
pub type SharedRefresh = Shared<LocalBoxFuture<'static, bool>>;

pub(crate) struct SessionInner {
    pub(crate) config: Rc<SessionConfig>,
    pub(crate) store: CredentialStore,
    pub(crate) bridge: PersistenceBridge,
    pub(crate) gate: HydrationGate,
    pub(crate) exchange: RefreshExchange,
    pub(crate) api: Rc<dyn AuthApi>,
    pub(crate) cookies: Rc<dyn CookieJar>,
    refresh_in_flight: RefCell<Option<SharedRefresh>>,
}

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Rc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credential", &self.credential())
            .field("hydrated", &self.inner.gate.is_hydrated())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        config: SessionConfig,
        api: Rc<dyn AuthApi>,
        storage: Rc<dyn IdentityStorage>,
        cookies: Rc<dyn CookieJar>,
    ) -> Self {
        let config = Rc::new(config);
        let store = CredentialStore::new();
        let bridge = PersistenceBridge::new(storage, config.identity_key.clone(), store.clone());
        let exchange = RefreshExchange::new(Rc::clone(&api), store.clone(), Rc::clone(&cookies), Rc::clone(&config));
        Self {
            inner: Rc::new(SessionInner {
                config,
                store,
                bridge,
                gate: HydrationGate::new(),
                exchange,
                api,
                cookies,
                refresh_in_flight: RefCell::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    pub fn gate(&self) -> &HydrationGate {
        &self.inner.gate
    }

    pub fn persistence(&self) -> &PersistenceBridge {
        &self.inner.bridge
    }

    pub fn credential(&self) -> Credential {
        self.inner.store.snapshot()
    }

    /// Post-mount hook: restore the persisted identity, then open the gate.
    ///
    /// The restore completes before any guard can observe an open gate.
    /// Calls after the first are no-ops.
    pub fn hydrate(&self) {
        if self.inner.gate.is_hydrated() {
            return;
        }
        self.inner.bridge.restore_once();
        self.inner.gate.open();
    }

    /// Start a refresh exchange, or join the one already in flight.
    pub fn refresh(&self) -> SharedRefresh {
        let mut slot = self.inner.refresh_in_flight.borrow_mut();
        if let Some(pending) = slot.as_ref() {
            log::debug!("joining in-flight refresh");
            return pending.clone();
        }
        let exchange = self.inner.exchange.clone();
        let session: Weak<SessionInner> = Rc::downgrade(&self.inner);
        let pending = async move {
            let ok = exchange.try_refresh().await;
            if let Some(session) = session.upgrade() {
                session.refresh_in_flight.borrow_mut().take();
            }
            ok
        }
        .boxed_local()
        .shared();
        *slot = Some(pending.clone());
        pending
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidInput`] before any request when a field is
    /// blank, [`SessionError::Login`] when the server rejects the attempt or
    /// returns no token, and [`SessionError::Api`] for transport failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let request = validate_login_input(email, password)?;
        let grant = self.inner.api.login(&request).await.map_err(|err| match err {
            ApiError::Status { message, .. } => SessionError::Login(message),
            other => SessionError::Api(other),
        })?;
        let token = AccessToken::new(grant.access_token)
            .ok_or_else(|| SessionError::Login("No access token returned".to_owned()))?;
        let role = Role::from_wire(grant.role.as_deref());
        let config = &self.inner.config;
        self.inner.cookies.set(&config.token_cookie, token.as_str(), config.token_max_age_secs);
        self.inner
            .store
            .set_credential(CredentialPatch::default().token(token).user_name(grant.name).role(role));
        log::info!("signed in");
        Ok(self.credential().identity())
    }

    /// Look up the signed-in user and merge the name and role into the store.
    ///
    /// Used when a role-gated view holds a token but no role.
    ///
    /// # Errors
    ///
    /// [`SessionError::CredentialAbsent`] without a token,
    /// [`SessionError::Api`] when the lookup fails.
    pub async fn resolve_identity(&self) -> Result<Identity, SessionError> {
        let token = self.credential().access_token.ok_or(SessionError::CredentialAbsent)?;
        let grant = self.inner.api.fetch_identity(&token).await?;
        let patch = CredentialPatch {
            access_token: Field::Keep,
            user_name: Field::set_if_some(grant.name),
            role: Field::set_if_some(Role::from_wire(grant.role.as_deref())),
        };
        if !patch.is_empty() {
            self.inner.store.set_credential(patch);
        }
        Ok(self.credential().identity())
    }

    /// Drop the local session: store, persisted snapshot and cookie.
    ///
    /// No server call and no navigation; used for definitive refresh failure
    /// and account deletion. Logout builds on it.
    pub fn invalidate(&self) {
        self.inner.store.clear();
        self.inner.bridge.clear_persisted();
        self.inner.cookies.remove(&self.inner.config.token_cookie);
    }

    /// `Authorization` header for a protected request.
    ///
    /// A 401 from that request is not retried here; the caller decides
    /// whether to go through a guard again.
    ///
    /// # Errors
    ///
    /// [`SessionError::CredentialAbsent`] when no token is held.
    pub fn authorization_header(&self) -> Result<String, SessionError> {
        self.credential().access_token.as_ref().map(bearer).ok_or(SessionError::CredentialAbsent)
    }
}

/// Trim and check the login form fields.
///
/// # Errors
///
/// [`SessionError::InvalidInput`] when either field is blank.
pub fn validate_login_input(email: &str, password: &str) -> Result<LoginRequest, SessionError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(SessionError::InvalidInput("Enter both email and password."));
    }
    Ok(LoginRequest { email: email.to_owned(), password: password.to_owned() })
}
