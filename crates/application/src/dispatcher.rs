//! Authenticated request dispatcher
//!
//! Wraps every outbound call with token attachment, bounded network
//! retries, and 401 recovery through the refresh coordinator. The retry
//! logic is an explicit loop with two independent bounds: a network-retry
//! counter (exponential backoff) and an auth-retry flag (at most one
//! re-issue after a successful refresh). A network failure never resets
//! the auth flag, so one logical request can trigger at most one refresh.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use taskdeck_domain::{ApiError, ApiRequest, ApiResult, error::SESSION_EXPIRED_MESSAGE};

use crate::ports::{ExpiryObserver, HttpTransport, NoopExpiryObserver, SessionStore, Sleeper};
use crate::refresh::RefreshCoordinator;

/// Maximum number of backoff retries after a network-level failure.
pub const MAX_NETWORK_RETRIES: u32 = 3;

/// Base delay for the exponential backoff schedule.
pub const BASE_DELAY_MS: u64 = 1000;

/// Message used when no token is available before any network call.
pub(crate) const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated. Please sign in.";

/// Backoff delay for the given zero-based attempt: 1000, 2000, 4000 ms.
#[must_use]
pub const fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BASE_DELAY_MS << attempt)
}

/// Dispatches authenticated requests against the task backend.
pub struct Dispatcher<T, S, P> {
    base_url: String,
    transport: T,
    sessions: Arc<S>,
    sleeper: P,
    refresh: Arc<RefreshCoordinator<S>>,
    expiry: Arc<dyn ExpiryObserver>,
}

impl<T, S, P> Dispatcher<T, S, P>
where
    T: HttpTransport,
    S: SessionStore + Send + Sync + 'static,
    P: Sleeper,
{
    /// Creates a dispatcher with its own refresh coordinator and no
    /// expiry observer.
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: T, sessions: Arc<S>, sleeper: P) -> Self {
        let refresh = Arc::new(RefreshCoordinator::new(Arc::clone(&sessions)));
        Self {
            base_url: base_url.into(),
            transport,
            sessions,
            sleeper,
            refresh,
            expiry: Arc::new(NoopExpiryObserver),
        }
    }

    /// Shares a refresh coordinator with other dispatchers.
    #[must_use]
    pub fn with_refresh_coordinator(mut self, refresh: Arc<RefreshCoordinator<S>>) -> Self {
        self.refresh = refresh;
        self
    }

    /// Installs the observer notified on terminal session expiry.
    #[must_use]
    pub fn with_expiry_observer(mut self, expiry: Arc<dyn ExpiryObserver>) -> Self {
        self.expiry = expiry;
        self
    }

    pub(crate) const fn sessions(&self) -> &Arc<S> {
        &self.sessions
    }

    /// Notifies the expiry observer and builds the terminal error.
    pub(crate) fn expire(&self, message: &str) -> ApiError {
        self.expiry.session_expired(message);
        ApiError::session_expired_because(message)
    }

    /// Executes one logical request and parses the JSON response.
    ///
    /// Returns `Ok(None)` for 204 No Content; every other 2xx response is
    /// parsed into `D`.
    ///
    /// # Errors
    /// Returns an [`ApiError`] variant per the failure taxonomy:
    /// connectivity after exhausted retries, session expiry, permission,
    /// not-found, validation, or a generic request failure.
    pub async fn dispatch<D: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<Option<D>> {
        let mut network_attempts: u32 = 0;
        let mut auth_retried = false;

        loop {
            // The token is fetched fresh for every attempt; a refresh that
            // happened meanwhile is picked up automatically.
            let token = match self.sessions.access_token().await {
                Ok(Some(token)) => token,
                Ok(None) => return Err(self.expire(NOT_AUTHENTICATED_MESSAGE)),
                Err(err) => {
                    tracing::warn!("access token lookup failed: {err}");
                    return Err(self.expire(NOT_AUTHENTICATED_MESSAGE));
                }
            };

            let prepared = request.prepare(&self.base_url, &token);
            let response = match self.transport.execute(&prepared).await {
                Ok(response) => response,
                Err(err) if err.is_no_response() && network_attempts < MAX_NETWORK_RETRIES => {
                    let delay = backoff_delay(network_attempts);
                    tracing::warn!(
                        attempt = network_attempts + 1,
                        max_attempts = MAX_NETWORK_RETRIES,
                        ?delay,
                        "network error, retrying: {err}"
                    );
                    self.sleeper.sleep(delay).await;
                    network_attempts += 1;
                    continue;
                }
                Err(err) if err.is_no_response() => {
                    return Err(ApiError::Connectivity(err.to_string()));
                }
                // The server was reached (or never addressable at all);
                // connectivity would misdiagnose these.
                Err(err) => {
                    return Err(ApiError::Request {
                        status: 0,
                        message: err.to_string(),
                    });
                }
            };

            if response.is_no_content() {
                return Ok(None);
            }

            match response.status {
                401 => {
                    if !auth_retried && self.refresh.refresh().await {
                        auth_retried = true;
                        continue;
                    }
                    // Refresh failed, or this request already used its one
                    // auth retry: the session is truly gone.
                    return Err(self.expire(SESSION_EXPIRED_MESSAGE));
                }
                403 => return Err(ApiError::Permission),
                404 => return Err(ApiError::NotFound),
                422 => {
                    return Err(ApiError::Validation {
                        message: response.validation_message(),
                    });
                }
                status if !response.is_success() => {
                    return Err(ApiError::Request {
                        status,
                        message: response.error_message(),
                    });
                }
                status => {
                    return serde_json::from_str(&response.body).map(Some).map_err(|err| {
                        ApiError::Request {
                            status,
                            message: format!("invalid JSON in response body: {err}"),
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4000));
    }
}
