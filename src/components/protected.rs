//! Route guard wrapper for protected pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route renders its content inside `<Protected>`. The
//! component owns one `RouteGuard` for its lifetime: it runs a check after
//! mount, renders a placeholder until the guard allows, applies redirects
//! with history replacement, and cancels the guard on unmount so a late
//! decision is never applied to a view that is gone.

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use session::{GuardDecision, GuardOptions, Role, RouteGuard, SessionError};

use crate::util::auth::{redirect_options, requested_path, use_session};

/// Render `children` only once the session may see this route.
///
/// With `required_role`, an authenticated session lacking the role is sent
/// to the default view instead of the login page.
#[component]
pub fn Protected(#[prop(optional)] required_role: Option<Role>, children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let guard = StoredValue::new_local(RouteGuard::new(session.get_value(), GuardOptions { required_role }));
    let allowed = RwSignal::new(false);
    let location = use_location();
    let navigate = use_navigate();

    Effect::new(move || {
        let path = requested_path(&location.pathname.get_untracked(), &location.search.get_untracked());
        let Some(check) = guard.try_get_value() else {
            return;
        };
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match check.check(&path).await {
                Ok(GuardDecision::Allow) => {
                    allowed.try_set(true);
                }
                Ok(decision) => {
                    if guard.is_disposed() {
                        return;
                    }
                    if let Some(target) = decision.redirect_target() {
                        navigate(target, redirect_options());
                    }
                }
                Err(SessionError::StaleWrite) => {}
                Err(err) => leptos::logging::warn!("route guard for {path} failed: {err}"),
            }
        });
    });

    on_cleanup(move || {
        guard.try_with_value(RouteGuard::cancel);
    });

    view! {
        <Show
            when=move || allowed.get()
            fallback=|| view! { <div class="guard-pending">"Checking your session..."</div> }
        >
            {children()}
        </Show>
    }
}
