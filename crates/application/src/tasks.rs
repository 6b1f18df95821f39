//! Task operations
//!
//! Typed wrappers over the dispatcher for the task backend's endpoints.
//! The user id comes from the current session; every operation raises the
//! session-expiry signal when no session is available.

use serde::de::DeserializeOwned;
use taskdeck_domain::{ApiError, ApiRequest, ApiResult, Task, TaskCreate, TaskListResponse, TaskUpdate};
use uuid::Uuid;

use crate::dispatcher::{Dispatcher, NOT_AUTHENTICATED_MESSAGE};
use crate::ports::{HttpTransport, SessionStore, Sleeper};

/// Client for the per-user task endpoints.
pub struct TaskClient<T, S, P> {
    dispatcher: Dispatcher<T, S, P>,
}

impl<T, S, P> TaskClient<T, S, P>
where
    T: HttpTransport,
    S: SessionStore + Send + Sync + 'static,
    P: Sleeper,
{
    /// Creates a task client over the given dispatcher.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher<T, S, P>) -> Self {
        Self { dispatcher }
    }

    /// Lists all tasks for the authenticated user.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on any dispatch failure.
    pub async fn list_tasks(&self) -> ApiResult<TaskListResponse> {
        let user_id = self.user_id().await?;
        self.fetch(&ApiRequest::get(format!("/api/{user_id}/tasks"))).await
    }

    /// Creates a new task.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on any dispatch failure; invalid titles are
    /// rejected by the server with a validation error.
    pub async fn create_task(&self, task: &TaskCreate) -> ApiResult<Task> {
        let user_id = self.user_id().await?;
        let body = serde_json::to_value(task)
            .map_err(|err| ApiError::Request {
                status: 0,
                message: format!("unserializable request body: {err}"),
            })?;
        self.fetch(&ApiRequest::post(format!("/api/{user_id}/tasks"), body)).await
    }

    /// Updates an existing task.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on any dispatch failure.
    pub async fn update_task(&self, task_id: Uuid, update: &TaskUpdate) -> ApiResult<Task> {
        let user_id = self.user_id().await?;
        let body = serde_json::to_value(update)
            .map_err(|err| ApiError::Request {
                status: 0,
                message: format!("unserializable request body: {err}"),
            })?;
        self.fetch(&ApiRequest::put(format!("/api/{user_id}/tasks/{task_id}"), body))
            .await
    }

    /// Deletes a task. The backend answers 204 with no body.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on any dispatch failure.
    pub async fn delete_task(&self, task_id: Uuid) -> ApiResult<()> {
        let user_id = self.user_id().await?;
        self.dispatcher
            .dispatch::<serde_json::Value>(&ApiRequest::delete(format!(
                "/api/{user_id}/tasks/{task_id}"
            )))
            .await?;
        Ok(())
    }

    /// Toggles a task's completion status.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on any dispatch failure.
    pub async fn toggle_task(&self, task_id: Uuid) -> ApiResult<Task> {
        let user_id = self.user_id().await?;
        self.fetch(&ApiRequest::patch(format!("/api/{user_id}/tasks/{task_id}/complete")))
            .await
    }

    /// Resolves the authenticated user's id from the session store.
    async fn user_id(&self) -> ApiResult<String> {
        match self.dispatcher.sessions().current_session().await {
            Ok(Some(session)) => Ok(session.user.id),
            Ok(None) => Err(self.dispatcher.expire(NOT_AUTHENTICATED_MESSAGE)),
            Err(err) => {
                tracing::warn!("session lookup failed: {err}");
                Err(self.dispatcher.expire(NOT_AUTHENTICATED_MESSAGE))
            }
        }
    }

    /// Dispatches a request whose success body is required.
    async fn fetch<D: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<D> {
        self.dispatcher.dispatch(request).await?.ok_or(ApiError::Request {
            status: 204,
            message: "expected a response body".to_string(),
        })
    }
}
