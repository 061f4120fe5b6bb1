//! Task aggregate root, subtasks and edit value objects.

use super::{SubtaskId, SubtaskName, TaskDomainError, TaskId, TaskName, TaskStatus};
use crate::progress::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Importance and urgency flags, set independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Priority {
    /// Task is important.
    pub important: bool,
    /// Task is urgent.
    pub urgent: bool,
}

impl Priority {
    /// Creates a priority from both flags.
    #[must_use]
    pub const fn new(important: bool, urgent: bool) -> Self {
        Self { important, urgent }
    }
}

/// Partial priority change; unset flags keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityUpdate {
    /// New importance flag, if changing.
    pub important: Option<bool>,
    /// New urgency flag, if changing.
    pub urgent: Option<bool>,
}

impl PriorityUpdate {
    /// Returns `true` when neither flag is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.important.is_none() && self.urgent.is_none()
    }
}

/// Checklist item belonging to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    name: SubtaskName,
    is_completed: bool,
}

impl Subtask {
    /// Creates a subtask with a fresh identifier.
    #[must_use]
    pub fn new(name: SubtaskName, is_completed: bool) -> Self {
        Self::from_parts(SubtaskId::new(), name, is_completed)
    }

    /// Reconstructs a subtask from persisted parts.
    #[must_use]
    pub const fn from_parts(id: SubtaskId, name: SubtaskName, is_completed: bool) -> Self {
        Self {
            id,
            name,
            is_completed,
        }
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the subtask name.
    #[must_use]
    pub const fn name(&self) -> &SubtaskName {
        &self.name
    }

    /// Returns whether the subtask is checked off.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }
}

/// Subtask upsert carried by a task edit.
///
/// An entry whose `id` matches an existing subtask updates it; any other
/// entry appends a new subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskEdit {
    /// Existing subtask to update, if any.
    pub id: Option<SubtaskId>,
    /// New subtask name.
    pub name: SubtaskName,
    /// New completion flag; `None` keeps the current flag or defaults to
    /// `false` for new subtasks.
    pub is_completed: Option<bool>,
}

/// Validated fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task name.
    pub name: TaskName,
    /// Free-form note.
    pub note: Option<String>,
    /// Category labels.
    pub categories: BTreeSet<String>,
    /// Priority flags.
    pub priority: Priority,
    /// Deadline.
    pub deadline: DateTime<Utc>,
    /// Initial subtasks in order.
    pub subtasks: Vec<Subtask>,
}

/// Partial edit of a task's descriptive fields.
///
/// Deadline changes go through [`Task::reschedule`] because they may change
/// the task status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// New name, if changing.
    pub name: Option<TaskName>,
    /// New note, if changing.
    pub note: Option<String>,
    /// Replacement category set, if changing.
    pub categories: Option<BTreeSet<String>>,
    /// Priority changes.
    pub priority: PriorityUpdate,
    /// Subtask upserts.
    pub subtasks: Vec<SubtaskEdit>,
}

impl TaskEdit {
    /// Returns `true` when the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.note.is_none()
            && self.categories.is_none()
            && self.priority.is_empty()
            && self.subtasks.is_empty()
    }
}

/// Result of moving a task's deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineOutcome {
    /// The task is completed; its status is not recomputed.
    Frozen,
    /// The status implied by the new deadline equals the stored status.
    Unchanged,
    /// The task moved from not done to overdue.
    BecameOverdue,
    /// The task moved from overdue back to not done.
    BackOnTrack,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: UserId,
    name: TaskName,
    note: Option<String>,
    categories: BTreeSet<String>,
    priority: Priority,
    deadline: DateTime<Utc>,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    subtasks: Vec<Subtask>,
    daily_record: Option<NaiveDate>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning user.
    pub owner: UserId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted note.
    pub note: Option<String>,
    /// Persisted categories.
    pub categories: BTreeSet<String>,
    /// Persisted priority flags.
    pub priority: Priority,
    /// Persisted deadline.
    pub deadline: DateTime<Utc>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted subtasks in order.
    pub subtasks: Vec<Subtask>,
    /// Persisted daily record date, if completed.
    pub daily_record: Option<NaiveDate>,
    /// Persisted optimistic-concurrency revision.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task for `owner`, deciding its status from the deadline.
    ///
    /// The task starts overdue when the deadline is at or before now.
    #[must_use]
    pub fn create(owner: UserId, draft: TaskDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let TaskDraft {
            name,
            note,
            categories,
            priority,
            deadline,
            subtasks,
        } = draft;

        Self {
            id: TaskId::new(),
            owner,
            name,
            note,
            categories,
            priority,
            deadline,
            status: TaskStatus::for_deadline(deadline, timestamp),
            completed_at: None,
            subtasks,
            daily_record: None,
            revision: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            name: data.name,
            note: data.note,
            categories: data.categories,
            priority: data.priority,
            deadline: data.deadline,
            status: data.status,
            completed_at: data.completed_at,
            subtasks: data.subtasks,
            daily_record: data.daily_record,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the category labels.
    #[must_use]
    pub const fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Returns the priority flags.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns when the task was completed, if it was.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the subtasks in order.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Returns the date of the daily record this task counts towards.
    #[must_use]
    pub const fn daily_record(&self) -> Option<NaiveDate> {
        self.daily_record
    }

    /// Returns the optimistic-concurrency revision.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the task with its revision advanced by one.
    ///
    /// Repositories call this when an update passes the revision check.
    #[must_use]
    pub fn into_next_revision(mut self) -> Self {
        self.revision = self.revision.saturating_add(1);
        self
    }

    /// Applies a partial edit of descriptive fields and subtasks.
    pub fn apply_edit(&mut self, edit: TaskEdit, clock: &impl Clock) {
        let TaskEdit {
            name,
            note,
            categories,
            priority,
            subtasks,
        } = edit;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_note) = note {
            self.note = Some(new_note);
        }
        if let Some(new_categories) = categories {
            self.categories = new_categories;
        }
        self.apply_priority(priority);
        for subtask_edit in subtasks {
            self.upsert_subtask(subtask_edit);
        }
        self.touch(clock);
    }

    /// Changes the importance and urgency flags.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyPriorityUpdate`] when neither flag is
    /// supplied.
    pub fn set_priority(
        &mut self,
        update: PriorityUpdate,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if update.is_empty() {
            return Err(TaskDomainError::EmptyPriorityUpdate);
        }
        self.apply_priority(update);
        self.touch(clock);
        Ok(())
    }

    /// Moves the deadline and recomputes the open status against now.
    ///
    /// Completed tasks keep their status.
    pub fn reschedule(&mut self, deadline: DateTime<Utc>, clock: &impl Clock) -> DeadlineOutcome {
        let now = clock.utc();
        self.deadline = deadline;
        self.updated_at = now;

        if self.status.is_terminal() {
            return DeadlineOutcome::Frozen;
        }

        let target = TaskStatus::for_deadline(deadline, now);
        if target == self.status {
            return DeadlineOutcome::Unchanged;
        }

        self.status = target;
        match target {
            TaskStatus::Overdue => DeadlineOutcome::BecameOverdue,
            TaskStatus::NotDone | TaskStatus::Completed => DeadlineOutcome::BackOnTrack,
        }
    }

    /// Marks the task completed and links it to today's daily record.
    ///
    /// Returns the UTC calendar date of the daily record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyCompleted`] when the task is
    /// already completed.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<NaiveDate, TaskDomainError> {
        if self.status == TaskStatus::Completed {
            return Err(TaskDomainError::AlreadyCompleted(self.id));
        }
        self.transition_to(TaskStatus::Completed)?;

        let now = clock.utc();
        let today = now.date_naive();
        self.completed_at = Some(now);
        self.daily_record = Some(today);
        self.updated_at = now;
        Ok(today)
    }

    fn transition_to(&mut self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    fn apply_priority(&mut self, update: PriorityUpdate) {
        if let Some(important) = update.important {
            self.priority.important = important;
        }
        if let Some(urgent) = update.urgent {
            self.priority.urgent = urgent;
        }
    }

    fn upsert_subtask(&mut self, edit: SubtaskEdit) {
        let existing = edit
            .id
            .and_then(|id| self.subtasks.iter_mut().find(|subtask| subtask.id == id));
        match existing {
            Some(subtask) => {
                subtask.name = edit.name;
                if let Some(is_completed) = edit.is_completed {
                    subtask.is_completed = is_completed;
                }
            }
            None => self.subtasks.push(Subtask::new(
                edit.name,
                edit.is_completed.unwrap_or_default(),
            )),
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
