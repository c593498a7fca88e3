//! Application Errors
//!
//! One error type for everything that crosses the network or storage
//! boundary. Form validation failures are reported separately as
//! `FieldErrors` and never become an `AppError`.

use serde_json::Value;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Non-success response; `message` is the server's own text when it sent one
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No refresh token available")]
    MissingRefreshToken,
}

impl AppError {
    /// Build an error from a non-success HTTP response
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = server_message(body)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        if status == 401 {
            AppError::Unauthorized(message)
        } else {
            AppError::Api { status, message }
        }
    }

    /// Network hiccups and 5xx responses; the query layer retries these once
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Network(_) | AppError::Timeout(_) => true,
            AppError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message`, then `detail`, then the first entry of the first
/// field-error list (`{"email": ["already taken"]}`).
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["message", "detail", "error"] {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }

    object.values().find_map(|field| match field {
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        Value::String(text) => Some(text.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field_wins() {
        let err = AppError::from_response(400, r#"{"message": "Supplier already exists", "detail": "x"}"#);
        assert_eq!(
            err,
            AppError::Api { status: 400, message: "Supplier already exists".to_string() }
        );
    }

    #[test]
    fn test_field_error_list() {
        let err = AppError::from_response(400, r#"{"email": ["Enter a valid email address."]}"#);
        assert_eq!(err.to_string(), "Enter a valid email address.");
    }

    #[test]
    fn test_unparseable_body_falls_back() {
        let err = AppError::from_response(502, "<html>Bad gateway</html>");
        assert_eq!(err.to_string(), "Request failed with status 502");
        assert!(err.is_transient());
    }

    #[test]
    fn test_401_maps_to_unauthorized() {
        let err = AppError::from_response(401, r#"{"detail": "Token is invalid or expired"}"#);
        assert_eq!(err, AppError::Unauthorized("Token is invalid or expired".to_string()));
        assert!(!err.is_transient());
    }
}
