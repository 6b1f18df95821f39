//! HTTP transport port

use async_trait::async_trait;
use taskdeck_domain::{ApiResponse, PreparedRequest};

/// Errors that can occur below the HTTP layer.
///
/// The dispatcher only retries failures where no response was received;
/// anything the server actually answered is classified by status code
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// No response arrived within the transport timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns true if the request may never have reached the server,
    /// making it eligible for a backoff retry.
    #[must_use]
    pub const fn is_no_response(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ConnectionFailed(_) | Self::Other(_)
        )
    }
}

/// Port for executing a single prepared HTTP request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes the request and returns the raw response.
    ///
    /// Implementations must send credentials (cookies) unconditionally and
    /// must not retry on their own; retry policy lives in the dispatcher.
    ///
    /// # Errors
    /// Returns a [`TransportError`] when no usable response was obtained.
    async fn execute(&self, request: &PreparedRequest) -> Result<ApiResponse, TransportError>;
}
