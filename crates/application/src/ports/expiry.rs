//! Expiry observer port
//!
//! Terminal session expiry is both a signal and an action: the dispatcher
//! returns a typed error, and the composing layer decides whether and how
//! to navigate. This port carries the action half so the core stays
//! testable without a browser-like environment.

/// Port notified exactly once per terminal session expiry, before the
/// corresponding error is returned to the caller.
pub trait ExpiryObserver: Send + Sync {
    /// Reports that the session expired, with a display-ready reason.
    fn session_expired(&self, reason: &str);
}

/// Observer that ignores expiry events. Default when no navigation is
/// wired in (e.g. tests, headless tools).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExpiryObserver;

impl ExpiryObserver for NoopExpiryObserver {
    fn session_expired(&self, _reason: &str) {}
}
