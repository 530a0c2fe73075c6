//! Shared primitives for all Rust crates in MyMatch Admin.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type used across MyMatch crates.
pub type AppResult<T> = Result<T, AppError>;

/// User-facing message attached to transport failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist in the loaded state.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with local state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No response reached the client (connection failure or timeout).
    #[error("{message}")]
    Network {
        /// User-facing message.
        message: String,
        /// Transport-level detail for logs.
        detail: String,
    },

    /// Credential refresh failed or was impossible; the user must log in again.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// Server answered with a non-2xx status the client does not recover from.
    #[error("http error {status}: {}", describe_payload(.payload))]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error payload returned by the server, or its raw text.
        payload: Value,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds a network error carrying the standard user-facing message.
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            message: NETWORK_ERROR_MESSAGE.to_owned(),
            detail: detail.into(),
        }
    }

    /// Returns the server-provided `message` of an HTTP error payload, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { payload, .. } => payload_message(payload),
            _ => None,
        }
    }

    /// Returns the HTTP status for server-side failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Indicates failures worth retrying by re-invoking the same action.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

fn payload_message(payload: &Value) -> Option<&str> {
    match payload {
        Value::String(text) if !text.trim().is_empty() => Some(text.as_str()),
        Value::Object(fields) => fields.get("message").and_then(Value::as_str),
        _ => None,
    }
}

fn describe_payload(payload: &Value) -> String {
    match payload_message(payload) {
        Some(message) => message.to_owned(),
        None if payload.is_null() => "<empty body>".to_owned(),
        None => payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AppError, NETWORK_ERROR_MESSAGE, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn http_error_exposes_server_message() {
        let error = AppError::Http {
            status: 400,
            payload: json!({ "code": 1001, "message": "name already exists" }),
        };

        assert_eq!(error.server_message(), Some("name already exists"));
        assert_eq!(error.status(), Some(400));
        assert_eq!(error.to_string(), "http error 400: name already exists");
    }

    #[test]
    fn http_error_without_message_formats_raw_payload() {
        let error = AppError::Http {
            status: 500,
            payload: json!({ "code": 9999 }),
        };

        assert_eq!(error.server_message(), None);
        assert_eq!(error.to_string(), "http error 500: {\"code\":9999}");
    }

    #[test]
    fn network_error_uses_user_facing_message() {
        let error = AppError::network("connection refused");

        assert!(error.is_transient());
        assert_eq!(error.to_string(), NETWORK_ERROR_MESSAGE);
    }
}
