//! Response value object and error-body interpretation
//!
//! Error responses from the backend are structured when possible (FastAPI
//! style `detail` payloads) but may be plain text or empty. Extraction here
//! degrades gracefully: structured field, then raw text, then a status-code
//! summary. A malformed JSON error body must never produce a secondary
//! parse failure.

use serde::Deserialize;

/// A raw HTTP response as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text (empty for 204).
    pub body: String,
}

impl ApiResponse {
    /// Creates a response value.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 204 No Content.
    #[must_use]
    pub const fn is_no_content(&self) -> bool {
        self.status == 204
    }

    /// Best-effort human-readable message for a non-2xx response.
    #[must_use]
    pub fn error_message(&self) -> String {
        error_message(self.status, &self.body)
    }

    /// Message for a 422 validation response.
    #[must_use]
    pub fn validation_message(&self) -> String {
        validation_message(&self.body)
    }
}

/// Generic error body shape: `{"detail": ...}` or `{"message": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// One entry of a structured validation payload.
#[derive(Debug, Deserialize)]
struct ValidationViolation {
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidationBody {
    #[serde(default)]
    detail: Vec<ValidationViolation>,
}

/// Extracts a message from a non-2xx response body.
///
/// Tries JSON `detail` (when it is a string) or `message`, then the raw
/// body text, then a generic summary carrying the status code.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(serde_json::Value::String(detail)) = parsed.detail {
            return detail;
        }
        if let Some(message) = parsed.message {
            return message;
        }
    }
    if body.trim().is_empty() {
        format!("request failed with status {status}")
    } else {
        body.to_string()
    }
}

/// Extracts the first violation message from a 422 body.
///
/// Falls back to a generic validation message when the payload is missing,
/// malformed, or carries no `msg` field.
#[must_use]
pub fn validation_message(body: &str) -> String {
    serde_json::from_str::<ValidationBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail.into_iter().next())
        .and_then(|violation| violation.msg)
        .unwrap_or_else(|| "Invalid input. Please check your data and try again.".to_string())
}
