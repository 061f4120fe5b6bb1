//! Repository port for owner-scoped task persistence and atomic commits.

use crate::progress::domain::{User, UserId, XpChange};
use crate::task::domain::{
    DailyRecordSummary, DailyTaskRecord, DateRange, DeadlineWindow, Task, TaskId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task write carried by a [`TaskCommit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskWrite {
    /// Insert a new task.
    Insert(Task),
    /// Replace a stored task whose revision equals this task's revision.
    Update(Task),
}

impl TaskWrite {
    /// Returns the task being written.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::Insert(task) | Self::Update(task) => task,
        }
    }
}

/// Unit of work applied atomically by [`TaskRepository::commit`].
///
/// Either every part is applied or none is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommit {
    /// Task insert or revision-checked update.
    pub task: TaskWrite,
    /// Revision-checked XP/level update for the owner.
    pub progress: Option<XpChange>,
    /// Daily record to create if absent; an existing record is left as is.
    pub daily_record: Option<DailyTaskRecord>,
}

impl TaskCommit {
    /// Creates a commit that only writes the task.
    #[must_use]
    pub const fn task_only(task: TaskWrite) -> Self {
        Self {
            task,
            progress: None,
            daily_record: None,
        }
    }

    /// Attaches an XP change.
    #[must_use]
    pub fn with_progress(mut self, change: XpChange) -> Self {
        self.progress = Some(change);
        self
    }

    /// Attaches a daily record upsert.
    #[must_use]
    pub fn with_daily_record(mut self, record: DailyTaskRecord) -> Self {
        self.daily_record = Some(record);
        self
    }
}

/// State persisted by a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTask {
    /// Stored task, including its new revision.
    pub task: Task,
    /// Stored user when the commit carried an XP change.
    pub user: Option<User>,
}

/// Task persistence contract.
///
/// Every read and delete is scoped to the owning user.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Applies a task write, optional daily record upsert and optional XP
    /// change as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Conflict`] when the stored task or user
    /// revision no longer matches, [`TaskRepositoryError::DuplicateTask`] on
    /// an insert of an existing ID, [`TaskRepositoryError::NotFound`] when an
    /// updated task is gone, and [`TaskRepositoryError::UserNotFound`] when
    /// the XP change targets a missing user.
    async fn commit(&self, commit: TaskCommit) -> TaskRepositoryResult<CommittedTask>;

    /// Finds a task by identifier if it belongs to `owner`.
    async fn find_for_owner(&self, id: TaskId, owner: UserId)
    -> TaskRepositoryResult<Option<Task>>;

    /// Lists tasks of `owner` inside `window`, ordered by deadline then
    /// creation time.
    async fn list_for_owner(
        &self,
        owner: UserId,
        window: DeadlineWindow,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Deletes a task with its subtasks if it belongs to `owner`.
    ///
    /// Returns `false` when no such task exists.
    async fn delete_for_owner(&self, id: TaskId, owner: UserId) -> TaskRepositoryResult<bool>;

    /// Returns `owner`'s daily records within `range`, ordered by date, each
    /// with its completed tasks.
    async fn daily_records(
        &self,
        owner: UserId,
        range: DateRange,
    ) -> TaskRepositoryResult<Vec<DailyRecordSummary>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The user targeted by an XP change was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A concurrent writer changed the task or user first.
    #[error("concurrent modification detected for {entity} {id}")]
    Conflict {
        /// Kind of record that changed.
        entity: &'static str,
        /// Identifier of the record that changed.
        id: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Conflict on a task row.
    #[must_use]
    pub fn task_conflict(id: TaskId) -> Self {
        Self::Conflict {
            entity: "task",
            id: id.to_string(),
        }
    }

    /// Conflict on a user row.
    #[must_use]
    pub fn user_conflict(id: UserId) -> Self {
        Self::Conflict {
            entity: "user",
            id: id.to_string(),
        }
    }

    /// Returns `true` when retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<diesel::result::Error> for TaskRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
