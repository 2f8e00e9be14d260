//! Admin-only pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both pages require the admin role. A signed-in user without it is sent to
//! the default view; a session whose role is not known yet waits on the
//! placeholder until the role arrives.

use leptos::prelude::*;
use session::Role;

use crate::components::app_shell::AppShell;
use crate::components::protected::Protected;

#[component]
pub fn UserLogsPage() -> impl IntoView {
    view! {
        <Protected required_role=Role::Admin>
            <AppShell title="User Logs">
                <section class="user-logs">
                    <p>"Parking entries and exits across all users."</p>
                </section>
            </AppShell>
        </Protected>
    }
}

#[component]
pub fn ReviewsManagementPage() -> impl IntoView {
    view! {
        <Protected required_role=Role::Admin>
            <AppShell title="Review Management">
                <section class="reviews-management">
                    <p>"Moderate lot reviews."</p>
                </section>
            </AppShell>
        </Protected>
    }
}
