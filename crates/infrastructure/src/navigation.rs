//! Login-redirect handling for terminal session expiry.
//!
//! Building the redirect URL is separate from constructing the expiry
//! error; the dispatcher raises the error, and this observer performs the
//! navigation side effect exactly once per expiry.

use std::sync::Arc;

use taskdeck_application::ports::ExpiryObserver;
use url::Url;

/// Builds the login URL carrying the expiry flag and message.
///
/// # Errors
/// Returns a [`url::ParseError`] when `login_base` is not a valid URL.
pub fn login_redirect_url(login_base: &str, message: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(login_base)?;
    url.query_pairs_mut()
        .append_pair("expired", "true")
        .append_pair("message", message);
    Ok(url)
}

/// Expiry observer that hands the login URL to a navigation sink.
///
/// The sink abstracts over whatever "navigate" means for the host: a
/// browser shell, a TUI screen switch, or (in the CLI) printing the URL.
pub struct LoginRedirect {
    login_base: String,
    sink: Arc<dyn Fn(Url) + Send + Sync>,
}

impl LoginRedirect {
    /// Creates an observer redirecting to `login_base` (e.g.
    /// `http://localhost:3000/login`).
    #[must_use]
    pub fn new(login_base: impl Into<String>, sink: Arc<dyn Fn(Url) + Send + Sync>) -> Self {
        Self {
            login_base: login_base.into(),
            sink,
        }
    }
}

impl ExpiryObserver for LoginRedirect {
    fn session_expired(&self, reason: &str) {
        match login_redirect_url(&self.login_base, reason) {
            Ok(url) => {
                tracing::info!(%url, "session expired, redirecting to login");
                (self.sink)(url);
            }
            Err(err) => {
                tracing::error!("invalid login URL {:?}: {err}", self.login_base);
            }
        }
    }
}
