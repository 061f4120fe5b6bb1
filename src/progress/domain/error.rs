//! Error types for progress domain validation.

use thiserror::Error;

/// Errors returned while constructing progress domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgressDomainError {
    /// The level catalog contains no levels.
    #[error("level catalog must contain at least one level")]
    EmptyLevelCatalog,

    /// Two levels share the same XP threshold.
    #[error("duplicate level threshold: {0} xp")]
    DuplicateLevelThreshold(u64),

    /// The level name is empty after trimming.
    #[error("level name must not be empty")]
    EmptyLevelName,

    /// The user display name is empty after trimming.
    #[error("user display name must not be empty")]
    EmptyDisplayName,
}
