//! Account page showing the signed-in user's record.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rendered only after the guard allows, so a token is normally present.
//! The record is fetched with the bearer token; a failed fetch falls back to
//! the name and role already held by the session.

#[cfg(test)]
#[path = "account_test.rs"]
mod account_test;

use leptos::prelude::*;

use crate::components::app_shell::AppShell;
use crate::components::protected::Protected;
use crate::config::ClientConfig;
use crate::net::types::User;
use crate::state::auth::AuthState;
use crate::util::auth::use_session;

fn role_label(role: &str) -> &'static str {
    if role.eq_ignore_ascii_case("admin") { "Administrator" } else { "User" }
}

#[component]
pub fn AccountPage() -> impl IntoView {
    view! {
        <Protected>
            <AppShell title="Account">
                <AccountDetails/>
            </AppShell>
        </Protected>
    }
}

#[component]
fn AccountDetails() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let config = expect_context::<ClientConfig>();
    let session = use_session();
    let user = RwSignal::new(None::<User>);

    Effect::new(move || {
        let Some(token) = session.with_value(|s| s.credential().access_token) else {
            return;
        };
        let config = config.clone();
        leptos::task::spawn_local(async move {
            match crate::net::api::fetch_user(&config, &token).await {
                Ok(record) => {
                    user.try_set(Some(record));
                }
                Err(err) => leptos::logging::warn!("account lookup failed: {err}"),
            }
        });
    });

    let name = move || user.get().map_or_else(|| auth.get().display_name().to_owned(), |u| u.name);
    let email = move || user.get().map(|u| u.email).unwrap_or_default();
    let role = move || {
        user.get()
            .map(|u| u.role)
            .or_else(|| auth.get().role.map(|r| r.as_str().to_owned()))
            .map_or("Unknown", |r| role_label(&r))
    };

    view! {
        <dl class="account-details">
            <dt>"Name"</dt>
            <dd>{name}</dd>
            <dt>"Email"</dt>
            <dd>{email}</dd>
            <dt>"Role"</dt>
            <dd>{role}</dd>
        </dl>
    }
}
