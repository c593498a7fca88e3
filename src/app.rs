//! Inventory Console App
//!
//! Root component: wires the services into context and the store, then
//! guards the console behind the login page.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::components::{LoginPage, NavBar, Page, ProductList, SupplierList, Toaster};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::hooks;
use crate::services::{push_history, Services};
use crate::store::{store_bump_cache, store_set_toasts, store_sync_session, AppState, AppStateStoreFields};

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

#[component]
pub fn App() -> impl IntoView {
    let services = Services::browser(AppConfig::from_env());
    let store = Store::new(AppState::from_session(&services.session.snapshot()));

    // Mirror the pure stores into the reactive one
    {
        let session = services.session.clone();
        services.session.subscribe(move || store_sync_session(&store, &session.snapshot()));
    }
    {
        let notifier = services.notifier.clone();
        services.notifier.subscribe(move || store_set_toasts(&store, notifier.toasts()));
    }
    services.queries.subscribe(move || store_bump_cache(&store));

    if services.session.is_authenticated() {
        let services = services.clone();
        spawn_local(async move {
            if let Err(e) = hooks::auth::resume_session(&services).await {
                log::warn!("Could not resume the stored session: {}", e);
            }
        });
    }

    let ctx = AppContext::new(services);
    provide_context(ctx);
    provide_context(store);

    let (current_page, set_current_page) = signal(Page::from_path(&current_path()));

    // Keep the address bar in step with the selected tab
    Effect::new(move |_| {
        let page = current_page.get();
        if store.is_authenticated().get() && current_path() != page.path() {
            push_history(page.path());
        }
    });

    view! {
        <Toaster />
        <Show
            when=move || store.is_authenticated().get()
            fallback=|| view! { <LoginPage /> }
        >
            <div class="app-layout">
                <NavBar current_page=current_page set_current_page=set_current_page />
                <main class="main-content">
                    {move || match current_page.get() {
                        Page::Products => view! { <ProductList /> }.into_any(),
                        Page::Suppliers => view! { <SupplierList /> }.into_any(),
                    }}
                </main>
            </div>
        </Show>
        <Show when=move || store.is_loading().get()>
            <div class="loading-overlay">
                <div class="spinner" aria-label="Loading"></div>
            </div>
        </Show>
    }
}
