//! Entity Hooks
//!
//! Query and mutation helpers per entity. Queries go through the shared
//! query cache; mutations call the API, then patch or invalidate the
//! affected cache entries and raise a toast. A failed mutation leaves the
//! cache untouched and hands the error back to the caller.

pub mod auth;
pub mod products;
pub mod suppliers;

use crate::error::AppError;
use crate::services::Services;

/// Toast text for a failure: the server's own message when it sent one
pub fn failure_message(err: &AppError, fallback: &str) -> String {
    match err {
        AppError::Api { message, .. } | AppError::Unauthorized(message) if !message.is_empty() => message.clone(),
        _ => fallback.to_string(),
    }
}

fn success_message(server: &str, fallback: &str) -> String {
    if server.trim().is_empty() {
        fallback.to_string()
    } else {
        server.to_string()
    }
}

fn report_failure(services: &Services, action: &str, err: &AppError, fallback: &str) {
    log::error!("{} failed: {}", action, err);
    services.notifier.error(failure_message(err, fallback));
}
