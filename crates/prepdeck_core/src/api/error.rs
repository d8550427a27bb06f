//! REST boundary error taxonomy.
//!
//! # Invariants
//! - `Display` always yields a human-readable message suitable for a store
//!   `error` field or a toast.
//! - `Status` displays exactly the message extracted from the response body.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure surfaced by the REST boundary or by client-side validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Input rejected before any network call.
    Validation(String),
    /// Server answered with a non-2xx status.
    Status { status: u16, message: String },
    /// Request never produced a response (DNS, connect, timeout, body I/O).
    Transport(String),
    /// Response arrived but could not be mapped into the canonical shape.
    Decode(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a status error from a raw response body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        Self::Status {
            status,
            message: error_message_from_body(status, body),
        }
    }

    /// HTTP status when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message without variant decoration.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Transport(message)
            | Self::Decode(message)
            | Self::Status { message, .. } => message,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::Status { message, .. } => write!(f, "{message}"),
            Self::Transport(message) => write!(f, "network error: {message}"),
            Self::Decode(message) => write!(f, "unexpected response: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Extracts the best human-readable message from a failed response body.
///
/// Precedence: `detail`, then `message`, then a bare JSON string body. Falls
/// back to `API error: <status>` when the body is not JSON or carries none of
/// those.
pub fn error_message_from_body(status: u16, body: &[u8]) -> String {
    let fallback = format!("API error: {status}");
    let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
        return fallback;
    };

    match &parsed {
        Value::String(text) if !text.trim().is_empty() => return text.clone(),
        Value::Object(map) => {
            for key in ["detail", "message"] {
                if let Some(message) = map.get(key).and_then(render_message) {
                    return message;
                }
            }
        }
        _ => {}
    }
    fallback
}

fn render_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
