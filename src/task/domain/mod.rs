//! Domain model for tasks, subtasks and daily completion records.
//!
//! Status changes go through the explicit transition table on
//! [`TaskStatus`]; nothing leaves [`TaskStatus::Completed`].

mod daily_record;
mod error;
mod ids;
mod status;
mod task;

pub use daily_record::{DailyRecordSummary, DailyTaskRecord, DateRange, DeadlineWindow};
pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{SubtaskId, SubtaskName, TaskId, TaskName};
pub use status::TaskStatus;
pub use task::{
    DeadlineOutcome, PersistedTaskData, Priority, PriorityUpdate, Subtask, SubtaskEdit, Task,
    TaskDraft, TaskEdit,
};
