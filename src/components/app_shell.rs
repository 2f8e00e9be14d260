//! Authenticated page chrome: sidebar navigation, header, and logout.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rendered inside `<Protected>`, so it can assume a session exists. Admin
//! links are only listed for admin sessions; the admin pages still guard
//! themselves.

#[cfg(test)]
#[path = "app_shell_test.rs"]
mod app_shell_test;

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::auth::AuthState;
use crate::util::auth::{redirect_options, use_session};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
}

pub const MAIN_NAV: &[NavItem] = &[
    NavItem { title: "Overview", href: "/dashboard" },
    NavItem { title: "Map", href: "/map" },
    NavItem { title: "Parking Lots", href: "/dashboard/parking-lots" },
    NavItem { title: "Lot Management", href: "/dashboard/lotManagement" },
    NavItem { title: "Account", href: "/account" },
];

pub const ADMIN_NAV: &[NavItem] = &[
    NavItem { title: "User Logs", href: "/dashboard/userLogs" },
    NavItem { title: "Review Management", href: "/dashboard/reviewsManagement" },
];

/// Sidebar entries for a session with or without the admin role.
pub fn nav_items(is_admin: bool) -> Vec<NavItem> {
    let mut items = MAIN_NAV.to_vec();
    if is_admin {
        items.extend_from_slice(ADMIN_NAV);
    }
    items
}

fn link_class(href: &str, pathname: &str) -> &'static str {
    if href == pathname { "app-sidebar__link app-sidebar__link--active" } else { "app-sidebar__link" }
}

#[component]
pub fn AppShell(#[prop(into)] title: String, children: Children) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = use_session();
    let navigate = use_navigate();
    let pathname = use_location().pathname;

    let on_logout = move |_| {
        let session = session.get_value();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            let navigator = move |path: &str| navigate(path, redirect_options());
            session.logout(&navigator).await;
        });
    };

    view! {
        <div class="app-shell">
            <nav class="app-sidebar">
                <span class="app-sidebar__brand">"ParkDash"</span>
                <For
                    each=move || nav_items(auth.get().is_admin())
                    key=|item| item.href
                    children=move |item: NavItem| {
                        view! {
                            <a href=item.href class=move || link_class(item.href, &pathname.get())>
                                {item.title}
                            </a>
                        }
                    }
                />
            </nav>
            <div class="app-main">
                <header class="site-header">
                    <h1 class="site-header__title">{title}</h1>
                    <span class="site-header__spacer"></span>
                    <span class="site-header__user">{move || auth.get().display_name().to_owned()}</span>
                    <button class="btn site-header__logout" on:click=on_logout>
                        "Log out"
                    </button>
                </header>
                <main class="app-content">{children()}</main>
            </div>
        </div>
    }
}
