//! Service layer coordinating task state changes with XP and level updates.
//!
//! Every write follows the same cycle: read the task and the owner, compute
//! the new task state and any XP change, then hand both to
//! [`TaskRepository::commit`] as one unit. A revision conflict re-runs the
//! whole cycle against fresh state, up to the configured attempt limit.

use crate::config::AppConfig;
use crate::progress::{
    domain::{
        LevelCatalog, ProgressDomainError, User, UserId, XpChange, XpReason, XpRules, deduct_xp,
        grant_xp,
    },
    ports::{LevelRepository, ProgressRepositoryError, UserRepository},
};
use crate::task::{
    domain::{
        DailyRecordSummary, DailyTaskRecord, DateRange, DeadlineOutcome, DeadlineWindow, Priority,
        PriorityUpdate, Subtask, SubtaskEdit, SubtaskId, SubtaskName, Task, TaskDomainError,
        TaskDraft, TaskEdit, TaskId, TaskName, TaskStatus,
    },
    ports::{TaskCommit, TaskRepository, TaskRepositoryError, TaskWrite},
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Default number of read-compute-commit attempts per operation.
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    name: String,
    note: Option<String>,
    categories: Vec<String>,
    priority: Priority,
    deadline: DateTime<Utc>,
    subtasks: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required name and deadline.
    #[must_use]
    pub fn new(name: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            note: None,
            categories: Vec::new(),
            priority: Priority::default(),
            deadline,
            subtasks: Vec::new(),
        }
    }

    /// Sets the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Sets the category labels.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = String>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Sets the priority flags.
    #[must_use]
    pub const fn with_priority(mut self, important: bool, urgent: bool) -> Self {
        self.priority = Priority::new(important, urgent);
        self
    }

    /// Appends an unchecked subtask.
    #[must_use]
    pub fn with_subtask(mut self, name: impl Into<String>) -> Self {
        self.subtasks.push(name.into());
        self
    }

    fn into_draft(self) -> Result<TaskDraft, TaskDomainError> {
        let subtasks = self
            .subtasks
            .into_iter()
            .map(|name| SubtaskName::new(name).map(|valid| Subtask::new(valid, false)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TaskDraft {
            name: TaskName::new(self.name)?,
            note: self.note,
            categories: self.categories.into_iter().collect(),
            priority: self.priority,
            deadline: self.deadline,
            subtasks,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SubtaskUpsert {
    id: Option<SubtaskId>,
    name: String,
    is_completed: Option<bool>,
}

/// Request payload for a partial task update.
///
/// Only the fields that are set change. A request that sets nothing is
/// rejected with [`TaskDomainError::EmptyEdit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    name: Option<String>,
    note: Option<String>,
    categories: Option<Vec<String>>,
    important: Option<bool>,
    urgent: Option<bool>,
    deadline: Option<DateTime<Utc>>,
    subtasks: Vec<SubtaskUpsert>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the task.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Replaces the category labels.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = String>) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    /// Sets the importance flag.
    #[must_use]
    pub const fn with_important(mut self, important: bool) -> Self {
        self.important = Some(important);
        self
    }

    /// Sets the urgency flag.
    #[must_use]
    pub const fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = Some(urgent);
        self
    }

    /// Moves the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Appends a new unchecked subtask.
    #[must_use]
    pub fn with_new_subtask(mut self, name: impl Into<String>) -> Self {
        self.subtasks.push(SubtaskUpsert {
            id: None,
            name: name.into(),
            is_completed: None,
        });
        self
    }

    /// Updates an existing subtask, or appends it when `id` is unknown.
    #[must_use]
    pub fn with_subtask_update(
        mut self,
        id: SubtaskId,
        name: impl Into<String>,
        is_completed: Option<bool>,
    ) -> Self {
        self.subtasks.push(SubtaskUpsert {
            id: Some(id),
            name: name.into(),
            is_completed,
        });
        self
    }

    /// Returns `true` when the request changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadline.is_none() && self.edit_is_empty()
    }

    fn edit_is_empty(&self) -> bool {
        self.name.is_none()
            && self.note.is_none()
            && self.categories.is_none()
            && self.important.is_none()
            && self.urgent.is_none()
            && self.subtasks.is_empty()
    }

    fn into_edit(self) -> Result<TaskEdit, TaskDomainError> {
        let name = self.name.map(TaskName::new).transpose()?;
        let subtasks = self
            .subtasks
            .into_iter()
            .map(|upsert| {
                Ok(SubtaskEdit {
                    id: upsert.id,
                    name: SubtaskName::new(upsert.name)?,
                    is_completed: upsert.is_completed,
                })
            })
            .collect::<Result<Vec<_>, TaskDomainError>>()?;

        Ok(TaskEdit {
            name,
            note: self.note,
            categories: self
                .categories
                .map(|labels| labels.into_iter().collect::<BTreeSet<_>>()),
            priority: PriorityUpdate {
                important: self.important,
                urgent: self.urgent,
            },
            subtasks,
        })
    }
}

/// Result of completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletion {
    /// The completed task.
    pub task: Task,
    /// The owner after the completion reward.
    pub user: User,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Task validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The level catalog could not be built.
    #[error(transparent)]
    Progress(#[from] ProgressDomainError),
    /// Level or user lookup failed.
    #[error(transparent)]
    ProgressRepository(#[from] ProgressRepositoryError),
    /// Task persistence failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// No task with this identifier belongs to the caller.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The owning user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    /// The task was completed before.
    #[error("task {0} is already completed")]
    AlreadyCompleted(TaskId),
}

impl TaskLifecycleError {
    /// Returns `true` when the failure is a lost optimistic-concurrency race.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(err) if err.is_conflict())
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<T, L, U, C>
where
    T: TaskRepository,
    L: LevelRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    levels: Arc<L>,
    users: Arc<U>,
    clock: Arc<C>,
    rules: XpRules,
    max_commit_attempts: u32,
}

impl<T, L, U, C> TaskLifecycleService<T, L, U, C>
where
    T: TaskRepository,
    L: LevelRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with default XP rules and retry limit.
    #[must_use]
    pub fn new(tasks: Arc<T>, levels: Arc<L>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            levels,
            users,
            clock,
            rules: XpRules::default(),
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
        }
    }

    /// Replaces the XP reward and penalty amounts.
    #[must_use]
    pub const fn with_rules(mut self, rules: XpRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets how many times a conflicting commit is attempted; at least one.
    #[must_use]
    pub fn with_max_commit_attempts(mut self, attempts: u32) -> Self {
        self.max_commit_attempts = attempts.max(1);
        self
    }

    /// Applies the XP rules and attempt limit from `config`.
    #[must_use]
    pub fn configured(self, config: &AppConfig) -> Self {
        self.with_rules(config.xp_rules)
            .with_max_commit_attempts(config.max_commit_attempts)
    }

    /// Returns the XP rules in effect.
    #[must_use]
    pub const fn rules(&self) -> XpRules {
        self.rules
    }

    /// Creates a task for `owner`.
    ///
    /// A task whose deadline is already past starts overdue, and the owner
    /// loses the overdue penalty in the same commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for invalid names,
    /// [`TaskLifecycleError::UserNotFound`] for an unknown owner, or a
    /// repository error when persistence fails.
    pub async fn create_task(
        &self,
        owner: UserId,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let draft = request.into_draft()?;
        self.with_retry("create_task", || self.try_create(owner, &draft))
            .await
    }

    async fn try_create(&self, owner: UserId, draft: &TaskDraft) -> TaskLifecycleResult<Task> {
        let (catalog, user) = self.load_progress(owner).await?;
        let task = Task::create(owner, draft.clone(), &*self.clock);

        let mut commit = TaskCommit::task_only(TaskWrite::Insert(task));
        let penalty = (commit.task.task().status() == TaskStatus::Overdue).then(|| {
            deduct_xp(
                &catalog,
                &user,
                self.rules.overdue_penalty,
                XpReason::Overdue,
                self.clock.utc(),
            )
        });
        if let Some(change) = penalty.clone() {
            commit = commit.with_progress(change);
        }

        let committed = self.tasks.commit(commit).await?;
        tracing::info!(
            task_id = %committed.task.id(),
            user_id = %owner,
            status = committed.task.status().as_str(),
            "created task"
        );
        if let Some(change) = penalty.as_ref() {
            log_xp_change(change);
        }
        Ok(committed.task)
    }

    /// Applies a partial update to a task owned by `owner`.
    ///
    /// A new deadline recomputes the open status; moving from not done to
    /// overdue costs the overdue penalty in the same commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] with
    /// [`TaskDomainError::EmptyEdit`] when the request sets nothing,
    /// [`TaskLifecycleError::TaskNotFound`] when the task is missing, or a
    /// repository error when persistence fails.
    pub async fn update_task(
        &self,
        owner: UserId,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        if request.is_empty() {
            return Err(TaskDomainError::EmptyEdit.into());
        }
        let deadline = request.deadline;
        let edit = request.into_edit()?;
        self.with_retry("update_task", || self.try_update(owner, id, &edit, deadline))
            .await
    }

    async fn try_update(
        &self,
        owner: UserId,
        id: TaskId,
        edit: &TaskEdit,
        deadline: Option<DateTime<Utc>>,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_owned(owner, id).await?;
        if !edit.is_empty() {
            task.apply_edit(edit.clone(), &*self.clock);
        }
        let outcome = deadline.map(|new_deadline| task.reschedule(new_deadline, &*self.clock));

        let mut commit = TaskCommit::task_only(TaskWrite::Update(task));
        let penalty = if outcome == Some(DeadlineOutcome::BecameOverdue) {
            Some(self.overdue_penalty(owner).await?)
        } else {
            None
        };
        if let Some(change) = penalty.clone() {
            commit = commit.with_progress(change);
        }

        let committed = self.tasks.commit(commit).await?;
        tracing::info!(
            task_id = %id,
            user_id = %owner,
            status = committed.task.status().as_str(),
            deadline_outcome = ?outcome,
            "updated task"
        );
        if let Some(change) = penalty.as_ref() {
            log_xp_change(change);
        }
        Ok(committed.task)
    }

    /// Completes a task owned by `owner` and awards the completion reward.
    ///
    /// The task, the daily record for today (UTC) and the owner's XP and
    /// level are committed together.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::AlreadyCompleted`] for a completed task,
    /// [`TaskLifecycleError::TaskNotFound`] when the task is missing,
    /// [`TaskLifecycleError::UserNotFound`] for an unknown owner, or a
    /// repository error when persistence fails.
    pub async fn complete_task(
        &self,
        owner: UserId,
        id: TaskId,
    ) -> TaskLifecycleResult<TaskCompletion> {
        self.with_retry("complete_task", || self.try_complete(owner, id))
            .await
    }

    async fn try_complete(
        &self,
        owner: UserId,
        id: TaskId,
    ) -> TaskLifecycleResult<TaskCompletion> {
        let mut task = self.find_owned(owner, id).await?;
        let date = task.complete(&*self.clock).map_err(|err| match err {
            TaskDomainError::AlreadyCompleted(task_id) => {
                TaskLifecycleError::AlreadyCompleted(task_id)
            }
            other => other.into(),
        })?;

        let (catalog, user) = self.load_progress(owner).await?;
        let now = self.clock.utc();
        let change = grant_xp(
            &catalog,
            &user,
            self.rules.completion_reward,
            XpReason::TaskCompleted,
            now,
        );
        let commit = TaskCommit::task_only(TaskWrite::Update(task))
            .with_progress(change.clone())
            .with_daily_record(DailyTaskRecord::new(owner, date, now));

        let committed = self.tasks.commit(commit).await?;
        let rewarded = committed
            .user
            .ok_or(TaskLifecycleError::UserNotFound(owner))?;
        tracing::info!(task_id = %id, user_id = %owner, %date, "completed task");
        log_xp_change(&change);
        Ok(TaskCompletion {
            task: committed.task,
            user: rewarded,
        })
    }

    /// Changes the importance and urgency flags of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] with
    /// [`TaskDomainError::EmptyPriorityUpdate`] when neither flag is set,
    /// [`TaskLifecycleError::TaskNotFound`] when the task is missing, or a
    /// repository error when persistence fails.
    pub async fn update_priority(
        &self,
        owner: UserId,
        id: TaskId,
        update: PriorityUpdate,
    ) -> TaskLifecycleResult<Task> {
        if update.is_empty() {
            return Err(TaskDomainError::EmptyPriorityUpdate.into());
        }
        self.with_retry("update_priority", || async move {
            let mut task = self.find_owned(owner, id).await?;
            task.set_priority(update, &*self.clock)?;
            let committed = self
                .tasks
                .commit(TaskCommit::task_only(TaskWrite::Update(task)))
                .await?;
            Ok(committed.task)
        })
        .await
    }

    /// Returns a task owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task is missing
    /// or owned by someone else.
    pub async fn get_task(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<Task> {
        self.find_owned(owner, id).await
    }

    /// Lists `owner`'s tasks inside `window`, ordered by deadline then
    /// creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn list_tasks(
        &self,
        owner: UserId,
        window: DeadlineWindow,
    ) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.tasks.list_for_owner(owner, window).await?)
    }

    /// Deletes a task owned by `owner` together with its subtasks.
    ///
    /// XP already granted or deducted for the task is kept.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task is missing.
    pub async fn delete_task(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<()> {
        if !self.tasks.delete_for_owner(id, owner).await? {
            return Err(TaskLifecycleError::TaskNotFound(id));
        }
        tracing::info!(task_id = %id, user_id = %owner, "deleted task");
        Ok(())
    }

    /// Returns `owner`'s daily records between `from` and `to` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] with
    /// [`TaskDomainError::InvalidDateRange`] when `from` is after `to`.
    pub async fn daily_records(
        &self,
        owner: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaskLifecycleResult<Vec<DailyRecordSummary>> {
        let range = DateRange::new(from, to)?;
        Ok(self.tasks.daily_records(owner, range).await?)
    }

    async fn with_retry<F, Fut, R>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> TaskLifecycleResult<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TaskLifecycleResult<R>>,
    {
        let mut attempts = 1;
        loop {
            match attempt().await {
                Err(err) if err.is_retryable() && attempts < self.max_commit_attempts => {
                    tracing::warn!(
                        operation,
                        attempt = attempts,
                        error = %err,
                        "commit conflict; retrying"
                    );
                    attempts += 1;
                }
                result => return result,
            }
        }
    }

    async fn find_owned(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_for_owner(id, owner)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(id))
    }

    async fn load_progress(&self, owner: UserId) -> TaskLifecycleResult<(LevelCatalog, User)> {
        let user = self
            .users
            .find_by_id(owner)
            .await?
            .ok_or(TaskLifecycleError::UserNotFound(owner))?;
        let catalog = LevelCatalog::new(self.levels.list_ordered().await?)?;
        Ok((catalog, user))
    }

    async fn overdue_penalty(&self, owner: UserId) -> TaskLifecycleResult<XpChange> {
        let (catalog, user) = self.load_progress(owner).await?;
        Ok(deduct_xp(
            &catalog,
            &user,
            self.rules.overdue_penalty,
            XpReason::Overdue,
            self.clock.utc(),
        ))
    }
}

fn log_xp_change(change: &XpChange) {
    tracing::info!(
        user_id = %change.user_id(),
        reason = change.reason().as_str(),
        previous_xp = change.previous_xp().value(),
        xp = change.xp().value(),
        "applied xp change"
    );
    if change.level_changed() {
        tracing::info!(
            user_id = %change.user_id(),
            previous_level_id = %change.previous_level_id(),
            level_id = %change.level_id(),
            "level changed"
        );
    }
}
