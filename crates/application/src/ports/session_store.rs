//! Session store port
//!
//! The session store is the external auth collaborator: an opaque provider
//! of bearer tokens and refreshable sessions. Token issuance, password
//! verification, and cookie mechanics all live behind this boundary.

use async_trait::async_trait;
use taskdeck_domain::{AccessToken, AuthSession};

/// Errors reported by the session store adapter.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    /// The auth service could not be reached.
    #[error("auth service unreachable: {0}")]
    Network(String),

    /// The auth service answered with something unexpected.
    #[error("unexpected auth service response: {0}")]
    Protocol(String),
}

/// Port for the external auth service.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns a current access token, or `None` when signed out.
    ///
    /// Called fresh before every request attempt; implementations own any
    /// caching.
    ///
    /// # Errors
    /// Returns a [`SessionStoreError`] if the auth service cannot answer.
    async fn access_token(&self) -> Result<Option<AccessToken>, SessionStoreError>;

    /// Forces a session refresh and returns the renewed session, or `None`
    /// when the session cannot be renewed.
    ///
    /// # Errors
    /// Returns a [`SessionStoreError`] if the auth service cannot answer.
    async fn refresh_session(&self) -> Result<Option<AuthSession>, SessionStoreError>;

    /// Returns the current session without forcing a refresh.
    ///
    /// # Errors
    /// Returns a [`SessionStoreError`] if the auth service cannot answer.
    async fn current_session(&self) -> Result<Option<AuthSession>, SessionStoreError>;

    /// Clears the session on the auth service.
    ///
    /// # Errors
    /// Returns a [`SessionStoreError`] if the auth service cannot answer.
    async fn sign_out(&self) -> Result<(), SessionStoreError>;
}
