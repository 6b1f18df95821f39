//! Domain error types

use thiserror::Error;

/// Default message shown when a session expires.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";

/// Domain-level errors that can occur during validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A task title is empty or exceeds the allowed length.
    #[error("invalid title: {0}")]
    InvalidTitle(String),

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures surfaced by the authenticated request dispatcher.
///
/// Every variant is a distinguishable terminal outcome for the caller;
/// only network failures (bounded retries) and a single auth retry are
/// handled inside the dispatcher before one of these is raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached after exhausting network retries.
    #[error("unable to connect to the server: {0}")]
    Connectivity(String),

    /// The session is gone: no token, refresh failed, or a second 401.
    ///
    /// Terminal by contract. Callers must not convert this back into a
    /// retry; the expiry observer has already been notified.
    #[error("{message}")]
    SessionExpired {
        /// Human-readable reason, suitable for the login page.
        message: String,
    },

    /// The server answered 403.
    #[error("you do not have permission to access this resource")]
    Permission,

    /// The server answered 404.
    #[error("the requested resource was not found")]
    NotFound,

    /// The server rejected the payload with 422.
    #[error("{message}")]
    Validation {
        /// First structured violation message, or a generic fallback.
        message: String,
    },

    /// Any other non-2xx response.
    #[error("{message}")]
    Request {
        /// HTTP status code of the failed response.
        status: u16,
        /// Best-effort message extracted from the response body.
        message: String,
    },
}

impl ApiError {
    /// Creates a session-expired error with the default message.
    #[must_use]
    pub fn session_expired() -> Self {
        Self::SessionExpired {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
        }
    }

    /// Creates a session-expired error with a specific reason.
    #[must_use]
    pub fn session_expired_because(message: impl Into<String>) -> Self {
        Self::SessionExpired {
            message: message.into(),
        }
    }

    /// Returns true if this is the terminal session-expiry signal.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

/// Result type alias for dispatched API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_default_message() {
        let err = ApiError::session_expired();
        assert_eq!(err.to_string(), SESSION_EXPIRED_MESSAGE);
        assert!(err.is_session_expired());
    }

    #[test]
    fn test_session_expired_custom_reason() {
        let err = ApiError::session_expired_because("Not authenticated. Please sign in.");
        assert_eq!(err.to_string(), "Not authenticated. Please sign in.");
    }

    #[test]
    fn test_other_variants_are_not_session_expired() {
        assert!(!ApiError::Permission.is_session_expired());
        assert!(!ApiError::Connectivity("dns failure".to_string()).is_session_expired());
    }
}
