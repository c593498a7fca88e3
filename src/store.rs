//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The store is a
//! read model: the session, toast queue and query cache own the data and
//! push changes here through their subscriber lists.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::User;
use crate::notify::Toast;
use crate::session::Session;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Signed-in user, if any
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// Login / registration request running
    pub is_loading: bool,
    /// Visible toasts, oldest first
    pub toasts: Vec<Toast>,
    /// Bumped on every query cache change (increment to trigger reload)
    pub cache_version: u32,
}

impl AppState {
    pub fn from_session(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            is_authenticated: session.is_authenticated,
            is_loading: session.is_loading,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Mirror the session into the store, touching only fields that changed
pub fn store_sync_session(store: &AppStore, session: &Session) {
    if store.user().get_untracked() != session.user {
        store.user().set(session.user.clone());
    }
    if store.is_authenticated().get_untracked() != session.is_authenticated {
        store.is_authenticated().set(session.is_authenticated);
    }
    if store.is_loading().get_untracked() != session.is_loading {
        store.is_loading().set(session.is_loading);
    }
}

pub fn store_set_toasts(store: &AppStore, toasts: Vec<Toast>) {
    store.toasts().set(toasts);
}

/// Signal every list view that cached data changed
pub fn store_bump_cache(store: &AppStore) {
    store.cache_version().update(|v| *v = v.wrapping_add(1));
}
