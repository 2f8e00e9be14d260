//! Route guard state machine shared by every protected view.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each protected view owns one `RouteGuard`. Mounting the view calls
//! [`RouteGuard::check`]; unmounting calls [`RouteGuard::cancel`]. The
//! returned decision is applied by the caller (render or navigate).
//!
//! DESIGN
//! ======
//! ```text
//! Pending --(gate open)--> Checking --token--------------------> role check
//!                             |                                     |
//!                             +--no token--> refresh --ok--------> role check
//!                                               |
//!                                               +--fail--> Denied (login + return path)
//!
//! role check: none required -> Allowed
//!             role known    -> Allowed | RoleDenied (home view)
//!             role absent   -> AwaitingRole, re-checked on every store change
//! ```
//! A check started while another is running joins it. A check whose guard
//! was cancelled meanwhile reports `StaleWrite` and applies nothing.
//! Cancelling also wakes checks parked in `AwaitingRole`, so their store
//! subscription and identity lookup are dropped with them.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::cell::{Cell, RefCell};
use std::pin::pin;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, Either, LocalBoxFuture, Shared};

use crate::coordinator::Session;
use crate::credential::Role;
use crate::error::SessionError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardState {
    /// Waiting for hydration; render a placeholder.
    #[default]
    Pending,
    /// Looking at the credential, possibly refreshing it.
    Checking,
    /// Authenticated, but the role the view needs is not known yet.
    AwaitingRole,
    Allowed,
    /// No usable credential; redirected to login.
    Denied,
    /// Authenticated but under-privileged; redirected to the home view.
    RoleDenied,
}

impl GuardState {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Allowed | Self::Denied | Self::RoleDenied)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Login route carrying the originally requested path.
    RedirectToLogin(String),
    /// Default authenticated view for a session lacking the required role.
    RedirectToHome(String),
}

impl GuardDecision {
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin(target) | Self::RedirectToHome(target) => Some(target),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuardOptions {
    pub required_role: Option<Role>,
}

impl GuardOptions {
    pub fn requires(role: Role) -> Self {
        Self { required_role: Some(role) }
    }
}

type SharedCheck = Shared<LocalBoxFuture<'static, GuardDecision>>;

/// Resolves when the epoch it was taken in ends.
type CancelSignal = Shared<oneshot::Receiver<()>>;

fn cancel_pair() -> (oneshot::Sender<()>, CancelSignal) {
    let (trigger, signal) = oneshot::channel();
    (trigger, signal.shared())
}

struct GuardInner {
    session: Session,
    options: GuardOptions,
    state: Cell<GuardState>,
    epoch: Cell<u64>,
    next_run: Cell<u64>,
    in_flight: RefCell<Option<(u64, SharedCheck)>>,
    /// Dropping the sender ends the current epoch for every waiting check.
    cancel: RefCell<(oneshot::Sender<()>, CancelSignal)>,
}

#[derive(Clone)]
pub struct RouteGuard {
    inner: Rc<GuardInner>,
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("options", &self.inner.options)
            .field("state", &self.inner.state.get())
            .finish_non_exhaustive()
    }
}

impl RouteGuard {
    pub fn new(session: Session, options: GuardOptions) -> Self {
        Self {
            inner: Rc::new(GuardInner {
                session,
                options,
                state: Cell::new(GuardState::Pending),
                epoch: Cell::new(0),
                next_run: Cell::new(0),
                in_flight: RefCell::new(None),
                cancel: RefCell::new(cancel_pair()),
            }),
        }
    }

    pub fn state(&self) -> GuardState {
        self.inner.state.get()
    }

    pub fn options(&self) -> GuardOptions {
        self.inner.options
    }

    /// Decide whether the view at `requested_path` may render.
    ///
    /// A `RedirectToLogin` decision also clears the local session, since the
    /// refresh credential is gone.
    ///
    /// # Errors
    ///
    /// [`SessionError::StaleWrite`] when [`cancel`](Self::cancel) was called
    /// while this check was running; the caller must not apply anything.
    pub async fn check(&self, requested_path: &str) -> Result<GuardDecision, SessionError> {
        let epoch = self.inner.epoch.get();
        let cancelled = self.inner.cancel.borrow().1.clone();
        let decision = match future::select(self.join_or_start(requested_path), cancelled).await {
            Either::Left((decision, _)) => decision,
            Either::Right(_) => {
                log::debug!("guard check for {requested_path} cancelled: {}", SessionError::StaleWrite);
                return Err(SessionError::StaleWrite);
            }
        };
        if self.inner.epoch.get() != epoch {
            log::debug!("discarding guard decision for {requested_path}: {}", SessionError::StaleWrite);
            return Err(SessionError::StaleWrite);
        }
        if matches!(decision, GuardDecision::RedirectToLogin(_)) {
            self.inner.session.invalidate();
        }
        Ok(decision)
    }

    /// Invalidate every check currently running (the view unmounted).
    ///
    /// Waiting checks resolve with `StaleWrite` at their next poll, and the
    /// running evaluation is dropped once no check holds it.
    pub fn cancel(&self) {
        self.inner.epoch.set(self.inner.epoch.get() + 1);
        self.inner.in_flight.borrow_mut().take();
        drop(self.inner.cancel.replace(cancel_pair()));
    }

    fn join_or_start(&self, requested_path: &str) -> SharedCheck {
        let mut slot = self.inner.in_flight.borrow_mut();
        if let Some((_, pending)) = slot.as_ref() {
            log::debug!("joining in-flight guard check");
            return pending.clone();
        }
        let run_id = self.inner.next_run.get();
        self.inner.next_run.set(run_id + 1);
        self.inner.state.set(GuardState::Pending);
        let pending = self.clone().run(run_id, requested_path.to_owned()).boxed_local().shared();
        *slot = Some((run_id, pending.clone()));
        pending
    }

    async fn run(self, run_id: u64, requested_path: String) -> GuardDecision {
        let decision = self.evaluate(run_id, &requested_path).await;
        let mut slot = self.inner.in_flight.borrow_mut();
        if slot.as_ref().is_some_and(|(id, _)| *id == run_id) {
            slot.take();
        }
        decision
    }

    async fn evaluate(&self, run: u64, requested_path: &str) -> GuardDecision {
        let session = &self.inner.session;
        if !session.gate().is_hydrated() {
            log::debug!("guard for {requested_path} pending until hydration");
        }
        session.gate().opened().await;
        self.set_state(run, GuardState::Checking);

        if session.credential().access_token.is_none() {
            log::debug!("{}; refreshing", SessionError::CredentialAbsent);
            if !session.refresh().await {
                return self.deny(run, requested_path);
            }
        }

        // Re-read: a logout may have landed between the refresh and this resume.
        let credential = session.credential();
        if credential.access_token.is_none() {
            return self.deny(run, requested_path);
        }
        match self.inner.options.required_role {
            None => self.allow(run),
            Some(required) => self.role_decision(run, required, credential.role, requested_path).await,
        }
    }

    async fn role_decision(
        &self,
        run: u64,
        required: Role,
        known: Option<Role>,
        requested_path: &str,
    ) -> GuardDecision {
        if let Some(actual) = known {
            return self.decide_role(run, required, actual);
        }
        let session = &self.inner.session;

        self.set_state(run, GuardState::AwaitingRole);
        let wait = pin!(self.wait_for_role(run, required, requested_path));
        let lookup = pin!(async {
            if let Err(err) = session.resolve_identity().await {
                log::warn!("role lookup failed, waiting for the next credential change: {err}");
            }
            future::pending::<GuardDecision>().await
        });
        future::select(wait, lookup).await.factor_first().0
    }

    /// Re-check the role on every store change until it is known.
    ///
    /// No role decision is taken while the role is absent.
    async fn wait_for_role(&self, run: u64, required: Role, requested_path: &str) -> GuardDecision {
        let store = self.inner.session.store();
        loop {
            let changed = store.changed();
            let credential = store.snapshot();
            if credential.access_token.is_none() {
                return self.deny(run, requested_path);
            }
            if let Some(actual) = credential.role {
                return self.decide_role(run, required, actual);
            }
            if changed.await.is_none() {
                return future::pending().await;
            }
        }
    }

    fn decide_role(&self, run: u64, required: Role, actual: Role) -> GuardDecision {
        if actual.grants(required) {
            return self.allow(run);
        }
        log::debug!("{}", SessionError::RoleMismatch { required, actual });
        self.set_state(run, GuardState::RoleDenied);
        GuardDecision::RedirectToHome(self.inner.session.config().home_path.clone())
    }

    fn allow(&self, run: u64) -> GuardDecision {
        self.set_state(run, GuardState::Allowed);
        GuardDecision::Allow
    }

    fn deny(&self, run: u64, requested_path: &str) -> GuardDecision {
        self.set_state(run, GuardState::Denied);
        GuardDecision::RedirectToLogin(self.inner.session.config().login_redirect(requested_path))
    }

    /// Record `next` unless `run` was cancelled or superseded.
    fn set_state(&self, run: u64, next: GuardState) {
        let current = self.inner.in_flight.borrow().as_ref().is_some_and(|(id, _)| *id == run);
        if !current {
            return;
        }
        let prev = self.inner.state.replace(next);
        if prev != next {
            log::debug!("guard {prev:?} -> {next:?}");
        }
    }
}
