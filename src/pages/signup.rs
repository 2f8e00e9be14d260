//! Signup page: account creation, then on to the login view.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use session::{ApiError, SessionError, SignupForm, validate_signup_input};

use crate::util::auth::use_session;

/// Message shown under the form for a failed attempt.
fn signup_error_text(err: &SessionError) -> String {
    match err {
        SessionError::Signup(message) => message.clone(),
        SessionError::InvalidInput(message) => (*message).to_owned(),
        SessionError::Api(ApiError::Network(_)) => "Could not reach the server. Try again.".to_owned(),
        other => format!("Signup failed: {other}"),
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let as_admin = RwSignal::new(false);
    let admin_code = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let form = SignupForm {
            name: name.get(),
            email: email.get(),
            password: password.get(),
            confirm_password: confirm.get(),
            admin_code: as_admin.get().then(|| admin_code.get()),
        };
        if let Err(err) = validate_signup_input(&form) {
            info.set(signup_error_text(&err));
            return;
        }
        busy.set(true);
        info.set("Creating your account...".to_owned());

        let session = session.get_value();
        let login_path = session.config().login_path.clone();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match session.sign_up(&form).await {
                Ok(()) => navigate(&login_path, NavigateOptions::default()),
                Err(err) => {
                    info.set(signup_error_text(&err));
                    busy.set(false);
                }
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"ParkDash"</h1>
                <p class="login-card__subtitle">"Create your account"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        placeholder="Full name"
                        autocomplete="name"
                        prop:value=move || name.get()
                        on:input=move |ev| name.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        autocomplete="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password (8+ characters)"
                        autocomplete="new-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Confirm password"
                        autocomplete="new-password"
                        prop:value=move || confirm.get()
                        on:input=move |ev| confirm.set(event_target_value(&ev))
                    />
                    <label class="login-check">
                        <input
                            type="checkbox"
                            prop:checked=move || as_admin.get()
                            on:change=move |ev| {
                                let checked = event_target_checked(&ev);
                                as_admin.set(checked);
                                if !checked {
                                    admin_code.set(String::new());
                                }
                            }
                        />
                        "Admin account"
                    </label>
                    <Show when=move || as_admin.get()>
                        <input
                            class="login-input"
                            type="password"
                            placeholder="Admin code"
                            prop:value=move || admin_code.get()
                            on:input=move |ev| admin_code.set(event_target_value(&ev))
                        />
                    </Show>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign Up"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "Already registered? "
                    <A href="/login">"Sign in"</A>
                </p>
            </div>
        </div>
    }
}
