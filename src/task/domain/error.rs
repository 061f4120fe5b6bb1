//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The task name exceeds the maximum length.
    #[error("task name must not exceed {max} characters, got {actual}")]
    TaskNameTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },

    /// A subtask name is empty after trimming.
    #[error("subtask name must not be empty")]
    EmptySubtaskName,

    /// An update request carried no fields.
    #[error("no task fields provided for update")]
    EmptyEdit,

    /// A priority update carried neither flag.
    #[error("at least one of is_important or is_urgent must be provided")]
    EmptyPriorityUpdate,

    /// A date range ends before it starts.
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange {
        /// Requested range start.
        from: String,
        /// Requested range end.
        to: String,
    },

    /// The task has already been completed.
    #[error("task {0} is already completed")]
    AlreadyCompleted(TaskId),

    /// The requested status transition is not permitted.
    #[error("task {task_id} cannot move from {} to {}", from.as_str(), to.as_str())]
    InvalidStatusTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
