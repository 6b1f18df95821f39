//! Session and credential types
//!
//! The access token is an opaque short-lived credential obtained on demand
//! from the session store. The dispatcher never caches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer credential proving identity to the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Tokens are credentials; keep them out of debug output. Truncation is
// per character, since an opaque token need not split at a byte index.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview = if self.0.chars().count() > 12 {
            let head: String = self.0.chars().take(8).collect();
            format!("{head}...")
        } else {
            "<short>".to_string()
        };
        write!(f, "AccessToken({preview})")
    }
}

/// Profile of the authenticated user, as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable user identifier used in API paths.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// A refreshable session held by the external auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// The signed-in user.
    pub user: UserProfile,
    /// Session expiry, when the auth service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Returns true if the session is known to be expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(expires_at: Option<DateTime<Utc>>) -> AuthSession {
        AuthSession {
            user: UserProfile {
                id: "user-1".to_string(),
                email: "a@example.com".to_string(),
                name: "Ada".to_string(),
            },
            expires_at,
        }
    }

    #[test]
    fn test_authorization_header() {
        let token = AccessToken::new("abc123");
        assert_eq!(token.authorization_header(), "Bearer abc123");
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::new("supersecretvalue1234");
        let debug = format!("{token:?}");
        assert!(!debug.contains("supersecretvalue1234"));
        assert!(debug.starts_with("AccessToken("));
    }

    #[test]
    fn test_debug_handles_multibyte_tokens() {
        let token = AccessToken::new("€€€€€€€€€€€€€€");
        let debug = format!("{token:?}");
        assert_eq!(debug, "AccessToken(€€€€€€€€...)");

        let short = AccessToken::new("€€€€€€€€€€");
        assert_eq!(format!("{short:?}"), "AccessToken(<short>)");
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        assert!(!session(None).is_expired(now));
        assert!(!session(Some(now + chrono::Duration::hours(1))).is_expired(now));
        assert!(session(Some(now - chrono::Duration::seconds(1))).is_expired(now));
    }

    #[test]
    fn test_session_wire_shape() {
        let json = r#"{"user":{"id":"u1","email":"a@b.c","name":"Ada"},"expiresAt":null}"#;
        let parsed: AuthSession = serde_json::from_str(json).expect("valid session JSON");
        assert_eq!(parsed.user.id, "u1");
        assert_eq!(parsed.expires_at, None);
    }
}
