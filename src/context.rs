//! Application Context
//!
//! Shared services provided via Leptos Context API. The services hold `Rc`
//! state, so they live in a local `StoredValue`; the context itself is a
//! `Copy` handle that closures can capture freely.

use leptos::prelude::*;

use crate::services::Services;

#[derive(Clone, Copy)]
pub struct AppContext {
    services: StoredValue<Services, LocalStorage>,
}

impl AppContext {
    pub fn new(services: Services) -> Self {
        Self { services: StoredValue::new_local(services) }
    }

    /// Cheap clone of the service bundle, for moving into async tasks
    pub fn services(&self) -> Services {
        self.services.get_value()
    }

    pub fn login_path(&self) -> String {
        self.services.with_value(|s| s.config.login_path.clone())
    }

    pub fn home_path(&self) -> String {
        self.services.with_value(|s| s.config.home_path.clone())
    }

    pub fn page_size(&self) -> usize {
        self.services.with_value(|s| s.config.page_size)
    }

    pub fn dismiss_toast(&self, id: u32) {
        self.services.with_value(|s| s.notifier.dismiss(id));
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
