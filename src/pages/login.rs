//! Login page: email + password sign-in with return-path forwarding.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guards send unauthenticated users here with the requested route in the
//! `redirect` query parameter. After a successful sign-in the page forwards
//! there, provided it is a local path; otherwise to the default view.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::{use_navigate, use_query_map};
use session::{ApiError, SessionError, validate_login_input};

use crate::util::auth::{redirect_options, use_session};

/// Message shown under the form for a failed attempt.
fn login_error_text(err: &SessionError) -> String {
    match err {
        SessionError::Login(message) => message.clone(),
        SessionError::InvalidInput(message) => (*message).to_owned(),
        SessionError::Api(ApiError::Network(_)) => "Could not reach the server. Try again.".to_owned(),
        other => format!("Sign-in failed: {other}"),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let query = use_query_map();
    let navigate = use_navigate();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let email_value = email.get();
        let password_value = password.get();
        if let Err(err) = validate_login_input(&email_value, &password_value) {
            info.set(login_error_text(&err));
            return;
        }
        busy.set(true);
        info.set("Signing in...".to_owned());

        let session = session.get_value();
        let config = session.config();
        let target = config.return_target(query.get_untracked().get(&config.return_param).as_deref());
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match session.login(&email_value, &password_value).await {
                Ok(_) => navigate(&target, redirect_options()),
                Err(err) => {
                    info.set(login_error_text(&err));
                    busy.set(false);
                }
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"ParkDash"</h1>
                <p class="login-card__subtitle">"Sign in to your account"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "No account yet? "
                    <A href="/signup">"Create one"</A>
                </p>
            </div>
        </div>
    }
}
