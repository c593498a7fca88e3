//! Service Bundle
//!
//! Everything the hooks need, wired together once at startup: config,
//! session, API client, query cache and toast queue.

use std::rc::Rc;

use wasm_bindgen::JsValue;

use crate::api::{ApiClient, ReqwestTransport, Transport};
use crate::config::AppConfig;
use crate::notify::Notifier;
use crate::query::{QueryClient, QueryOptions};
use crate::session::{BrowserStorage, SessionStorage, SessionStore};

#[derive(Clone)]
pub struct Services {
    pub config: Rc<AppConfig>,
    pub session: SessionStore,
    pub api: ApiClient,
    pub queries: QueryClient,
    pub notifier: Notifier,
}

impl Services {
    pub fn new(
        config: AppConfig,
        transport: Rc<dyn Transport>,
        storage: Rc<dyn SessionStorage>,
        navigate: impl Fn(&str) + 'static,
    ) -> Self {
        let session = SessionStore::restore(storage);
        let api = ApiClient::new(config.clone(), transport, session.clone());
        let queries = QueryClient::new(QueryOptions::from_config(&config));
        let notifier = Notifier::new();

        {
            let queries = queries.clone();
            let login_path = config.login_path.clone();
            api.on_session_expired(move || {
                log::warn!("Session expired, redirecting to {}", login_path);
                queries.clear();
                navigate(&login_path);
            });
        }

        Self {
            config: Rc::new(config),
            session,
            api,
            queries,
            notifier,
        }
    }

    /// Production wiring: fetch transport, localStorage, history navigation
    pub fn browser(config: AppConfig) -> Self {
        let storage = Rc::new(BrowserStorage::new(config.storage_key.clone()));
        Self::new(config, Rc::new(ReqwestTransport::new()), storage, push_history)
    }
}

/// Navigate without a page reload
pub fn push_history(path: &str) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        log::error!("History API unavailable, cannot navigate to {}", path);
        return;
    };
    if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
        log::error!("Failed to navigate to {}: {:?}", path, e);
    }
}
