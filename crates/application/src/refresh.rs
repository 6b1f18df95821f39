//! Single-flight session refresh
//!
//! At most one refresh runs process-wide at any instant. Every caller that
//! hits a 401 while a refresh is underway awaits the same outcome instead
//! of starting a second one. The gate goes `idle -> in-flight -> idle` and
//! is reset exactly once per cycle, on success and failure alike.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, broadcast};

use crate::ports::SessionStore;

/// Coordinates refresh attempts across concurrent requests.
///
/// The coordinator is an explicit, injectable object rather than ambient
/// global state, so multiple independent sessions can coexist in one
/// process (one coordinator each).
pub struct RefreshCoordinator<S> {
    sessions: Arc<S>,
    gate: Arc<Gate>,
}

/// In-flight marker: `Some` holds the channel carrying the pending outcome.
struct Gate {
    in_flight: Mutex<Option<broadcast::Sender<bool>>>,
}

impl<S> RefreshCoordinator<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    /// Creates an idle coordinator over the given session store.
    #[must_use]
    pub fn new(sessions: Arc<S>) -> Self {
        Self {
            sessions,
            gate: Arc::new(Gate {
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Refreshes the session, or awaits the refresh already underway.
    ///
    /// Returns true when the auth service reports a live session
    /// afterwards. The underlying refresh runs on its own task, so the
    /// gate is released even if every awaiting request is dropped
    /// mid-flight.
    pub async fn refresh(&self) -> bool {
        let mut outcome_rx = {
            let mut slot = self.gate.in_flight.lock().await;
            if let Some(pending) = slot.as_ref() {
                pending.subscribe()
            } else {
                let (tx, rx) = broadcast::channel(1);
                *slot = Some(tx.clone());
                let sessions = Arc::clone(&self.sessions);
                let gate = Arc::clone(&self.gate);
                tokio::spawn(async move {
                    let outcome = refresh_once(sessions.as_ref()).await;
                    // Reset to idle before publishing, so a caller arriving
                    // after this cycle starts a fresh refresh instead of
                    // observing a stale outcome.
                    gate.in_flight.lock().await.take();
                    let _ = tx.send(outcome);
                });
                rx
            }
        };
        outcome_rx.recv().await.unwrap_or(false)
    }
}

async fn refresh_once<S: SessionStore>(sessions: &S) -> bool {
    match sessions.refresh_session().await {
        Ok(Some(session)) if !session.is_expired(Utc::now()) => true,
        Ok(_) => false,
        Err(err) => {
            tracing::warn!("session refresh failed: {err}");
            false
        }
    }
}
