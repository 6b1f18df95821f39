//! Task entity and wire payloads
//!
//! The backend speaks JSON with camelCase field names. Creation and update
//! payloads enforce the backend's title bounds locally so obviously invalid
//! input never reaches the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Maximum task title length accepted by the backend.
pub const TITLE_MAX_LEN: usize = 500;

/// A single task owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: Uuid,
    /// Owner of the task (auth service user id).
    pub user_id: String,
    /// Task description text.
    pub title: String,
    /// Completion status.
    pub is_completed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreate {
    /// Task description text (1 to [`TITLE_MAX_LEN`] characters).
    pub title: String,
}

impl TaskCreate {
    /// Creates a validated task-creation payload.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidTitle`] if the title is empty,
    /// whitespace-only, or longer than [`TITLE_MAX_LEN`] characters.
    pub fn new(title: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self { title })
    }
}

/// Payload for updating an existing task. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    /// Updated task description, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Updated completion status, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl TaskUpdate {
    /// Creates an update that only changes the title.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidTitle`] if the title is out of bounds.
    pub fn title(title: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self {
            title: Some(title),
            is_completed: None,
        })
    }

    /// Creates an update that only changes the completion status.
    #[must_use]
    pub const fn completion(is_completed: bool) -> Self {
        Self {
            title: None,
            is_completed: Some(is_completed),
        }
    }

    /// Returns true if the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_completed.is_none()
    }
}

/// Response body for the task list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    /// Tasks belonging to the authenticated user.
    pub tasks: Vec<Task>,
    /// Total number of tasks returned.
    pub count: usize,
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvalidTitle("title must not be empty".to_string()));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(DomainError::InvalidTitle(format!(
            "title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}
