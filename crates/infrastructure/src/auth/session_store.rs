//! Session store backed by the external auth service.
//!
//! Speaks JSON over HTTP to the auth service's session endpoints:
//! `GET {base}/token` for a short-lived bearer token, `GET
//! {base}/get-session` for the current session (with cookie-cache bypass
//! when forcing a refresh), and `POST {base}/sign-out`. The refresh
//! credential itself lives in an HttpOnly cookie managed by the shared
//! cookie store; this adapter never sees it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use taskdeck_application::ports::{SessionStore, SessionStoreError};
use taskdeck_domain::{AccessToken, AuthSession, UserProfile};

/// Timeout for auth service calls.
const AUTH_TIMEOUT_MS: u64 = 10_000;

/// Token endpoint response: `{"token": "..."}`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Session endpoint envelope: `{"user": {...}, "session": {...}}` or
/// a JSON `null` when signed out.
#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    user: UserProfile,
    #[serde(default)]
    session: Option<SessionDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDetails {
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl SessionEnvelope {
    fn into_session(self) -> AuthSession {
        AuthSession {
            user: self.user,
            expires_at: self.session.and_then(|details| details.expires_at),
        }
    }
}

/// Session store speaking to the auth service over HTTP.
pub struct AuthServiceSessionStore {
    base_url: String,
    client: Arc<Client>,
}

impl AuthServiceSessionStore {
    /// Creates a store for the auth service at `base_url` (e.g.
    /// `http://localhost:3000/api/auth`), sharing the given client so
    /// session cookies round-trip with API traffic.
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: Arc<Client>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_session(&self, force_refresh: bool) -> Result<Option<AuthSession>, SessionStoreError> {
        let mut request = self
            .client
            .get(self.endpoint("/get-session"))
            .timeout(Duration::from_millis(AUTH_TIMEOUT_MS));
        if force_refresh {
            request = request.query(&[("disableCookieCache", "true")]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SessionStoreError::Network(e.to_string()))?;

        if response.status().as_u16() == 401 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SessionStoreError::Protocol(format!(
                "session endpoint answered {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SessionStoreError::Network(e.to_string()))?;

        // The service answers a bare `null` when no session exists.
        let envelope: Option<SessionEnvelope> = serde_json::from_str(&body)
            .map_err(|e| SessionStoreError::Protocol(format!("unparseable session body: {e}")))?;

        Ok(envelope.map(SessionEnvelope::into_session))
    }
}

#[async_trait]
impl SessionStore for AuthServiceSessionStore {
    async fn access_token(&self) -> Result<Option<AccessToken>, SessionStoreError> {
        let response = self
            .client
            .get(self.endpoint("/token"))
            .timeout(Duration::from_millis(AUTH_TIMEOUT_MS))
            .send()
            .await
            .map_err(|e| SessionStoreError::Network(e.to_string()))?;

        // Any non-success answer means no token is currently issuable;
        // the dispatcher treats that as a signed-out state.
        if !response.status().is_success() {
            return Ok(None);
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionStoreError::Protocol(format!("unparseable token body: {e}")))?;

        Ok(Some(AccessToken::new(parsed.token)))
    }

    async fn refresh_session(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        self.get_session(true).await
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        self.get_session(false).await
    }

    async fn sign_out(&self) -> Result<(), SessionStoreError> {
        let response = self
            .client
            .post(self.endpoint("/sign-out"))
            .timeout(Duration::from_millis(AUTH_TIMEOUT_MS))
            .send()
            .await
            .map_err(|e| SessionStoreError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SessionStoreError::Protocol(format!(
                "sign-out endpoint answered {}",
                response.status()
            )))
        }
    }
}
