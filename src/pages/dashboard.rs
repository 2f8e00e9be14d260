//! Dashboard pages available to every signed-in user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/dashboard` is the default authenticated view: login forwards here and
//! role denials land here. The lot pages share the same guard.

use leptos::prelude::*;

use crate::components::app_shell::AppShell;
use crate::components::protected::Protected;
use crate::state::auth::AuthState;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    view! {
        <Protected>
            <AppShell title="Overview">
                <section class="dashboard-welcome">
                    <h2>{move || format!("Welcome back, {}", auth.get().display_name())}</h2>
                    <p>"Occupancy, reviews and parking activity for your lots."</p>
                </section>
            </AppShell>
        </Protected>
    }
}

#[component]
pub fn ParkingLotsPage() -> impl IntoView {
    view! {
        <Protected>
            <AppShell title="Parking Lots">
                <section class="lots-overview">
                    <p>"Browse lots, their capacity and current availability."</p>
                </section>
            </AppShell>
        </Protected>
    }
}

#[component]
pub fn LotManagementPage() -> impl IntoView {
    view! {
        <Protected>
            <AppShell title="Lot Management">
                <section class="lot-management">
                    <p>"Create lots and edit their boundaries."</p>
                </section>
            </AppShell>
        </Protected>
    }
}
