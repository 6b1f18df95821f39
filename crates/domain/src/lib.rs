//! Taskdeck Domain - Core client types
//!
//! This crate defines the domain model for the Taskdeck API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod task;

pub use error::{ApiError, ApiResult, DomainError, DomainResult};
pub use request::{ApiRequest, HttpMethod, PreparedRequest};
pub use response::ApiResponse;
pub use session::{AccessToken, AuthSession, UserProfile};
pub use task::{Task, TaskCreate, TaskListResponse, TaskUpdate};
