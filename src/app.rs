//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` creates the one `Session` for the page and provides it, with the
//! client config and the reactive auth projection, to every route. The
//! session is hydrated from the root's first effect run, which only happens
//! on the client after mount.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Redirect, Route, Router, Routes},
};
use session::Session;
use session::config::DEFAULT_HOME_PATH;

use crate::config::ClientConfig;
use crate::net::api::HttpAuthApi;
use crate::pages::{
    account::AccountPage,
    admin::{ReviewsManagementPage, UserLogsPage},
    dashboard::{DashboardPage, LotManagementPage, ParkingLotsPage},
    login::LoginPage,
    map::MapPage,
    signup::SignupPage,
};
use crate::util::auth::{hydrate_session, provide_session, use_session};
use crate::util::browser::{cookie_jar, identity_storage};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Build the page's session from the browser adapters.
fn build_session(config: &ClientConfig) -> Session {
    Session::new(
        config.session.clone(),
        Rc::new(HttpAuthApi::new(config.clone())),
        identity_storage(),
        cookie_jar(),
    )
}

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::from_build_env();
    let auth = provide_session(build_session(&config));
    provide_context(config);

    let session = use_session();
    Effect::new(move || hydrate_session(session, auth));

    view! {
        <Stylesheet id="leptos" href="/pkg/parkdash.css"/>
        <Title text="ParkDash"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("signup") view=SignupPage/>
                <Route path=StaticSegment("") view=|| view! { <Redirect path=DEFAULT_HOME_PATH/> }/>
                <Route path=StaticSegment("dashboard") view=DashboardPage/>
                <Route path=(StaticSegment("dashboard"), StaticSegment("parking-lots")) view=ParkingLotsPage/>
                <Route path=(StaticSegment("dashboard"), StaticSegment("lotManagement")) view=LotManagementPage/>
                <Route path=(StaticSegment("dashboard"), StaticSegment("userLogs")) view=UserLogsPage/>
                <Route
                    path=(StaticSegment("dashboard"), StaticSegment("reviewsManagement"))
                    view=ReviewsManagementPage
                />
                <Route path=StaticSegment("map") view=MapPage/>
                <Route path=StaticSegment("account") view=AccountPage/>
            </Routes>
        </Router>
    }
}
