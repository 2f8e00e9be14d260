//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `Session` is created once in `App` and reached from components through
//! context. Route components apply guard redirects the same way, replacing
//! the history entry so "back" never returns to a view the user cannot see.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use session::Session;

use crate::state::auth::AuthState;

/// Context handle to the process-wide session. `Session` is `!Send`, so it
/// lives in thread-local reactive storage.
pub type SessionHandle = StoredValue<Session, LocalStorage>;

/// Provide `session` and its reactive projection to the component tree.
///
/// The store subscription is owned by the current reactive owner and is
/// released with it.
pub fn provide_session(session: Session) -> RwSignal<AuthState> {
    let auth = RwSignal::new(AuthState::from_credential(&session.credential(), session.gate().is_hydrated()));
    let gate = session.gate().clone();
    let subscription = session.store().subscribe(move |credential| {
        auth.set(AuthState::from_credential(credential, gate.is_hydrated()));
    });
    let _subscription = StoredValue::new_local(subscription);
    provide_context::<SessionHandle>(StoredValue::new_local(session));
    provide_context(auth);
    auth
}

/// Restore the persisted identity and open the hydration gate.
///
/// Call from the root component's first effect run, which only happens after
/// the client has mounted.
pub fn hydrate_session(session: SessionHandle, auth: RwSignal<AuthState>) {
    session.with_value(Session::hydrate);
    auth.update(|state| state.hydrated = true);
}

pub fn use_session() -> SessionHandle {
    expect_context::<SessionHandle>()
}

/// Navigation options for guard and login redirects.
pub fn redirect_options() -> NavigateOptions {
    NavigateOptions { replace: true, ..NavigateOptions::default() }
}

/// Path plus query string of the current location, as a guard sees it.
pub fn requested_path(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() { pathname.to_owned() } else { format!("{pathname}?{search}") }
}
