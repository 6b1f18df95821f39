//! Optimistic task-list state
//!
//! Mirrors the task list a caller renders: mutations are applied locally
//! before the server confirms, reconciled with the server's task on
//! success, and reverted to the pre-mutation value on failure. Session
//! expiry needs no rollback-triggered navigation here; the dispatcher's
//! expiry observer has already fired by the time the error propagates.

use taskdeck_domain::{ApiResult, Task, TaskListResponse, TaskUpdate};
use uuid::Uuid;

use crate::ports::{HttpTransport, SessionStore, Sleeper};
use crate::tasks::TaskClient;

/// In-memory view of the authenticated user's tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    /// Creates an empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Replaces the board contents with a server listing.
    pub fn load(&mut self, list: TaskListResponse) {
        self.tasks = list.tasks;
    }

    /// Returns the tasks in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, task_id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Inserts a newly created task at the front of the list.
    pub fn insert_first(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    /// Replaces a task with the server's version. Returns false if the
    /// task is no longer on the board.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => {
                *existing = task;
                true
            }
            None => false,
        }
    }

    /// Removes a task from the board.
    pub fn remove(&mut self, task_id: Uuid) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == task_id)?;
        Some(self.tasks.remove(index))
    }

    /// Flips a task's completion locally, returning the previous value.
    pub fn toggle(&mut self, task_id: Uuid) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == task_id)?;
        let previous = task.is_completed;
        task.is_completed = !previous;
        Some(previous)
    }

    /// Sets a task's completion to an explicit value, returning the
    /// previous one.
    pub fn set_completed(&mut self, task_id: Uuid, is_completed: bool) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == task_id)?;
        let previous = task.is_completed;
        task.is_completed = is_completed;
        Some(previous)
    }

    /// Sets a task's title locally, returning the previous one.
    pub fn set_title(&mut self, task_id: Uuid, title: impl Into<String>) -> Option<String> {
        let task = self.tasks.iter_mut().find(|task| task.id == task_id)?;
        Some(std::mem::replace(&mut task.title, title.into()))
    }
}

/// Toggles a task optimistically, reverting the board on failure.
///
/// # Errors
/// Propagates the dispatch failure after the board has been restored to
/// its pre-toggle state. Returns [`taskdeck_domain::ApiError::NotFound`]
/// if the task is not on the board.
pub async fn toggle_optimistic<T, S, P>(
    client: &TaskClient<T, S, P>,
    board: &mut TaskBoard,
    task_id: Uuid,
) -> ApiResult<Task>
where
    T: HttpTransport,
    S: SessionStore + Send + Sync + 'static,
    P: Sleeper,
{
    let Some(previous) = board.toggle(task_id) else {
        return Err(taskdeck_domain::ApiError::NotFound);
    };

    match client.toggle_task(task_id).await {
        Ok(task) => {
            board.replace(task.clone());
            Ok(task)
        }
        Err(err) => {
            board.set_completed(task_id, previous);
            Err(err)
        }
    }
}

/// Renames a task optimistically, reverting the board on failure.
///
/// # Errors
/// Propagates the dispatch failure after the previous title has been
/// restored. Returns [`taskdeck_domain::ApiError::NotFound`] if the task
/// is not on the board.
pub async fn rename_optimistic<T, S, P>(
    client: &TaskClient<T, S, P>,
    board: &mut TaskBoard,
    task_id: Uuid,
    title: impl Into<String> + Send,
) -> ApiResult<Task>
where
    T: HttpTransport,
    S: SessionStore + Send + Sync + 'static,
    P: Sleeper,
{
    let title = title.into();
    let Some(previous) = board.set_title(task_id, title.clone()) else {
        return Err(taskdeck_domain::ApiError::NotFound);
    };

    let update = match TaskUpdate::title(title) {
        Ok(update) => update,
        Err(err) => {
            board.set_title(task_id, previous);
            return Err(taskdeck_domain::ApiError::Validation {
                message: err.to_string(),
            });
        }
    };

    match client.update_task(task_id, &update).await {
        Ok(task) => {
            board.replace(task.clone());
            Ok(task)
        }
        Err(err) => {
            board.set_title(task_id, previous);
            Err(err)
        }
    }
}
