//! Taskdeck Application - Dispatcher, refresh coordination, task operations
//!
//! The application layer owns the token-refresh-aware request dispatcher
//! and everything around it: the single-flight refresh coordinator, the
//! session-expiry signal, typed task operations, and the optimistic
//! task-list state. External systems are reached exclusively through the
//! ports in [`ports`].

pub mod board;
pub mod dispatcher;
pub mod ports;
pub mod refresh;
pub mod tasks;

pub use board::{TaskBoard, rename_optimistic, toggle_optimistic};
pub use dispatcher::{BASE_DELAY_MS, Dispatcher, MAX_NETWORK_RETRIES, backoff_delay};
pub use refresh::RefreshCoordinator;
pub use tasks::TaskClient;
