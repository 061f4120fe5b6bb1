//! Application services coordinating task state with XP and levels.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, DEFAULT_MAX_COMMIT_ATTEMPTS, TaskCompletion, TaskLifecycleError,
    TaskLifecycleResult, TaskLifecycleService, UpdateTaskRequest,
};
