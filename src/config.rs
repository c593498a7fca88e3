//! Application Configuration
//!
//! Build-time settings for the API endpoint, cache windows and table paging.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_STORAGE_KEY: &str = "auth-storage";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL every API path is appended to
    pub api_base_url: String,
    /// Hard limit for a single HTTP exchange
    pub request_timeout: Duration,
    /// How long a cached query counts as fresh
    pub stale_time: Duration,
    /// How long an unused cache entry survives
    pub gc_time: Duration,
    /// Rows per data-table page
    pub page_size: usize,
    /// `page_size` sent with the supplier list request
    pub supplier_page_size: u32,
    /// localStorage key of the persisted session record
    pub storage_key: String,
    /// Where the console sends users whose session expired
    pub login_path: String,
    /// Landing page after a successful sign-in
    pub home_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
            page_size: 10,
            supplier_page_size: 100,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            login_path: "/login".to_string(),
            home_path: "/products".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `API_BASE_URL` / `API_TIMEOUT_MS` at build time
    pub fn from_env() -> Self {
        Self::from_values(option_env!("API_BASE_URL"), option_env!("API_TIMEOUT_MS"))
    }

    fn from_values(base_url: Option<&str>, timeout_ms: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        match timeout_ms.map(str::parse::<u64>) {
            Some(Ok(ms)) if ms > 0 => config.request_timeout = Duration::from_millis(ms),
            Some(_) => log::warn!("Ignoring invalid API_TIMEOUT_MS, keeping {:?}", config.request_timeout),
            None => {}
        }
        config
    }

    /// Join the base URL and an API path (`/suppliers/` style)
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
