//! Map view of all parking lots.

use leptos::prelude::*;

use crate::components::app_shell::AppShell;
use crate::components::protected::Protected;

#[component]
pub fn MapPage() -> impl IntoView {
    view! {
        <Protected>
            <AppShell title="Map">
                <div class="lot-map" id="lot-map"></div>
            </AppShell>
        </Protected>
    }
}
