//! Scenario tests for the authenticated dispatch flow: single-flight
//! refresh, bounded retries, the error taxonomy, and optimistic rollback.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;
use tokio::sync::Semaphore;
use uuid::Uuid;

use taskdeck_application::ports::{
    ExpiryObserver, HttpTransport, SessionStore, SessionStoreError, Sleeper, TransportError,
};
use taskdeck_application::{Dispatcher, TaskBoard, TaskClient, toggle_optimistic};
use taskdeck_domain::{
    AccessToken, ApiError, ApiRequest, ApiResponse, AuthSession, PreparedRequest, Task,
    UserProfile,
};

// ---------------------------------------------------------------------------
// Mock ports
// ---------------------------------------------------------------------------

/// Transport that serves a scripted sequence of outcomes.
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    calls: Arc<AtomicUsize>,
}

fn scripted(
    responses: Vec<Result<ApiResponse, TransportError>>,
) -> (ScriptedTransport, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        ScriptedTransport {
            responses: Mutex::new(responses.into()),
            calls: Arc::clone(&calls),
        },
        calls,
    )
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, _request: &PreparedRequest) -> Result<ApiResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("transport script exhausted"))
    }
}

/// Session store with a fixed token and configurable refresh behavior.
struct MockSessions {
    token: Option<AccessToken>,
    refresh_ok: bool,
    refresh_calls: AtomicUsize,
    /// When present, refresh blocks until a permit is released.
    hold_refresh: Option<Semaphore>,
}

impl MockSessions {
    fn signed_in() -> Self {
        Self {
            token: Some(AccessToken::new("token-1")),
            refresh_ok: true,
            refresh_calls: AtomicUsize::new(0),
            hold_refresh: None,
        }
    }

    fn signed_out() -> Self {
        Self {
            token: None,
            ..Self::signed_in()
        }
    }

    fn refresh_failing() -> Self {
        Self {
            refresh_ok: false,
            ..Self::signed_in()
        }
    }

    fn holding_refresh() -> Self {
        Self {
            hold_refresh: Some(Semaphore::new(0)),
            ..Self::signed_in()
        }
    }

    fn session() -> AuthSession {
        AuthSession {
            user: UserProfile {
                id: "user-1".to_string(),
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
            },
            expires_at: None,
        }
    }
}

#[async_trait]
impl SessionStore for MockSessions {
    async fn access_token(&self) -> Result<Option<AccessToken>, SessionStoreError> {
        Ok(self.token.clone())
    }

    async fn refresh_session(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.hold_refresh {
            let permit = gate.acquire().await.expect("gate open");
            permit.forget();
        }
        Ok(self.refresh_ok.then(Self::session))
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        Ok(self.token.as_ref().map(|_| Self::session()))
    }

    async fn sign_out(&self) -> Result<(), SessionStoreError> {
        Ok(())
    }
}

/// Sleeper that records requested delays and returns immediately.
struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

fn recording_sleeper() -> (RecordingSleeper, Arc<Mutex<Vec<Duration>>>) {
    let slept = Arc::new(Mutex::new(Vec::new()));
    (
        RecordingSleeper {
            slept: Arc::clone(&slept),
        },
        slept,
    )
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Observer that records expiry reasons.
#[derive(Default)]
struct RecordingObserver {
    reasons: Mutex<Vec<String>>,
}

impl ExpiryObserver for RecordingObserver {
    fn session_expired(&self, reason: &str) {
        self.reasons.lock().unwrap().push(reason.to_string());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn connection_refused() -> Result<ApiResponse, TransportError> {
    Err(TransportError::ConnectionFailed("connection refused".to_string()))
}

fn status(code: u16, body: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(code, body))
}

fn task_json(task: &Task) -> String {
    serde_json::to_string(task).expect("serializable task")
}

fn sample_task(is_completed: bool) -> Task {
    let now = Utc::now();
    Task {
        id: Uuid::now_v7(),
        user_id: "user-1".to_string(),
        title: "write the report".to_string(),
        is_completed,
        created_at: now,
        updated_at: now,
    }
}

fn dispatcher_with(
    responses: Vec<Result<ApiResponse, TransportError>>,
    sessions: MockSessions,
) -> (
    Dispatcher<ScriptedTransport, MockSessions, RecordingSleeper>,
    Arc<MockSessions>,
    Arc<AtomicUsize>,
    Arc<Mutex<Vec<Duration>>>,
    Arc<RecordingObserver>,
) {
    let (transport, calls) = scripted(responses);
    let (sleeper, slept) = recording_sleeper();
    let sessions = Arc::new(sessions);
    let observer = Arc::new(RecordingObserver::default());
    let dispatcher = Dispatcher::new("http://localhost:8000", transport, Arc::clone(&sessions), sleeper)
        .with_expiry_observer(Arc::clone(&observer) as Arc<dyn ExpiryObserver>);
    (dispatcher, sessions, calls, slept, observer)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_401_refreshes_and_retries_once() {
    let (dispatcher, sessions, calls, _slept, observer) = dispatcher_with(
        vec![status(401, ""), status(200, r#"{"ok":true}"#)],
        MockSessions::signed_in(),
    );

    let value = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect("second attempt succeeds")
        .expect("body present");

    assert_eq!(value, serde_json::json!({"ok": true}));
    assert_eq!(sessions.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(observer.reasons.lock().unwrap().is_empty());
}

#[tokio::test]
async fn no_token_fails_before_any_network_call() {
    let (dispatcher, _sessions, calls, _slept, observer) =
        dispatcher_with(vec![], MockSessions::signed_out());

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("no token means no session");

    assert!(err.is_session_expired());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        observer.reasons.lock().unwrap().as_slice(),
        ["Not authenticated. Please sign in."]
    );
}

#[tokio::test]
async fn second_consecutive_401_is_terminal() {
    let (dispatcher, sessions, calls, _slept, observer) = dispatcher_with(
        vec![status(401, ""), status(401, "")],
        MockSessions::signed_in(),
    );

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("still unauthorized after refresh");

    assert!(err.is_session_expired());
    // One refresh, one retry, no third dispatch and no second refresh.
    assert_eq!(sessions.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(observer.reasons.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_refresh_is_terminal_without_retry() {
    let (dispatcher, sessions, calls, _slept, _observer) = dispatcher_with(
        vec![status(401, "")],
        MockSessions::refresh_failing(),
    );

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("refresh failed");

    assert!(err.is_session_expired());
    assert_eq!(sessions.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn network_retries_follow_backoff_then_give_up() {
    let (dispatcher, _sessions, calls, slept, _observer) = dispatcher_with(
        vec![
            connection_refused(),
            connection_refused(),
            connection_refused(),
            connection_refused(),
        ],
        MockSessions::signed_in(),
    );

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("network never recovers");

    assert!(matches!(err, ApiError::Connectivity(_)));
    assert!(!err.is_session_expired());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        slept.lock().unwrap().as_slice(),
        [
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
        ]
    );
}

#[tokio::test]
async fn non_retryable_transport_errors_are_not_connectivity() {
    // The server answered (or the URL never named one); neither retrying
    // nor a connectivity diagnosis is appropriate.
    for failure in [
        TransportError::InvalidUrl("::".to_string()),
        TransportError::Body("connection reset mid-body".to_string()),
    ] {
        let (dispatcher, _sessions, calls, slept, _observer) =
            dispatcher_with(vec![Err(failure)], MockSessions::signed_in());

        let err = dispatcher
            .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
            .await
            .expect_err("transport failure");

        assert!(matches!(err, ApiError::Request { status: 0, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(slept.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn network_blip_recovers_without_touching_auth() {
    let (dispatcher, sessions, calls, slept, _observer) = dispatcher_with(
        vec![connection_refused(), status(200, r#"{"ok":true}"#)],
        MockSessions::signed_in(),
    );

    let value = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect("retry succeeds");

    assert!(value.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(slept.lock().unwrap().as_slice(), [Duration::from_millis(1000)]);
    assert_eq!(sessions.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn network_failure_after_auth_retry_never_refreshes_again() {
    // 401 -> refresh -> retry hits a network error -> backoff retry 401s
    // again: the request already used its one auth retry.
    let (dispatcher, sessions, calls, slept, _observer) = dispatcher_with(
        vec![status(401, ""), connection_refused(), status(401, "")],
        MockSessions::signed_in(),
    );

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("second 401 is terminal");

    assert!(err.is_session_expired());
    assert_eq!(sessions.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(slept.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
    const CALLERS: usize = 4;

    let mut responses = Vec::new();
    for _ in 0..CALLERS {
        responses.push(status(401, ""));
    }
    for _ in 0..CALLERS {
        responses.push(status(200, "{}"));
    }

    let (dispatcher, sessions, calls, _slept, _observer) =
        dispatcher_with(responses, MockSessions::holding_refresh());
    let dispatcher = Arc::new(dispatcher);

    let mut handles = Vec::new();
    for _ in 0..CALLERS {
        let dispatcher = Arc::clone(&dispatcher);
        handles.push(tokio::spawn(async move {
            dispatcher
                .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
                .await
        }));
    }

    // Let every caller take its 401 and queue behind the refresh gate.
    tokio::task::yield_now().await;
    sessions
        .hold_refresh
        .as_ref()
        .expect("holding store")
        .add_permits(1);

    for handle in handles {
        assert!(handle.await.expect("task completes").is_ok());
    }

    assert_eq!(sessions.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), CALLERS * 2);
}

#[tokio::test]
async fn delete_returns_empty_without_parsing() {
    let (dispatcher, _sessions, calls, _slept, _observer) =
        dispatcher_with(vec![status(204, "")], MockSessions::signed_in());
    let client = TaskClient::new(dispatcher);

    client
        .delete_task(Uuid::now_v7())
        .await
        .expect("204 is success");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn validation_error_surfaces_first_violation() {
    let (dispatcher, _sessions, _calls, _slept, _observer) = dispatcher_with(
        vec![status(422, r#"{"detail":[{"msg":"title too long"}]}"#)],
        MockSessions::signed_in(),
    );

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("validation failure");

    assert_eq!(
        err,
        ApiError::Validation {
            message: "title too long".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_error_body_degrades_to_raw_text() {
    let (dispatcher, _sessions, _calls, _slept, _observer) = dispatcher_with(
        vec![status(502, "upstream exploded {")],
        MockSessions::signed_in(),
    );

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("gateway failure");

    assert_eq!(
        err,
        ApiError::Request {
            status: 502,
            message: "upstream exploded {".to_string()
        }
    );
}

#[tokio::test]
async fn structured_error_body_is_extracted() {
    let (dispatcher, _sessions, _calls, _slept, _observer) = dispatcher_with(
        vec![status(409, r#"{"detail":"task already exists"}"#)],
        MockSessions::signed_in(),
    );

    let err = dispatcher
        .dispatch::<serde_json::Value>(&ApiRequest::get("/api/user-1/tasks"))
        .await
        .expect_err("conflict");

    assert_eq!(
        err,
        ApiError::Request {
            status: 409,
            message: "task already exists".to_string()
        }
    );
}

#[tokio::test]
async fn forbidden_toggle_rolls_back_and_does_not_redirect() {
    let task = sample_task(false);
    let task_id = task.id;

    let (dispatcher, _sessions, _calls, _slept, observer) =
        dispatcher_with(vec![status(403, "")], MockSessions::signed_in());
    let client = TaskClient::new(dispatcher);

    let mut board = TaskBoard::new();
    board.insert_first(task);

    let err = toggle_optimistic(&client, &mut board, task_id)
        .await
        .expect_err("server rejects the toggle");

    assert_eq!(err, ApiError::Permission);
    assert!(!board.get(task_id).expect("task kept").is_completed);
    assert!(observer.reasons.lock().unwrap().is_empty());
}

#[tokio::test]
async fn toggle_applies_server_truth_on_success() {
    let task = sample_task(false);
    let task_id = task.id;
    let mut confirmed = task.clone();
    confirmed.is_completed = true;
    confirmed.title = "write the report (edited server-side)".to_string();

    let (dispatcher, _sessions, _calls, _slept, _observer) = dispatcher_with(
        vec![status(200, &task_json(&confirmed))],
        MockSessions::signed_in(),
    );
    let client = TaskClient::new(dispatcher);

    let mut board = TaskBoard::new();
    board.insert_first(task);

    let updated = toggle_optimistic(&client, &mut board, task_id)
        .await
        .expect("toggle succeeds");

    assert!(updated.is_completed);
    assert_eq!(board.get(task_id).expect("task kept"), &confirmed);
}
