//! Repository ports for the level catalog and user accounts.

use crate::progress::domain::{Level, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for progress repository operations.
pub type ProgressRepositoryResult<T> = Result<T, ProgressRepositoryError>;

/// Outcome of seeding the level catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The catalog was empty and the given number of levels was inserted.
    Seeded(usize),
    /// The catalog already held the given number of levels; nothing changed.
    AlreadyPresent(usize),
}

/// Level catalog persistence contract.
#[async_trait]
pub trait LevelRepository: Send + Sync {
    /// Returns every level ordered by ascending XP threshold.
    async fn list_ordered(&self) -> ProgressRepositoryResult<Vec<Level>>;

    /// Inserts `levels` only when the catalog is currently empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressRepositoryError::Persistence`] when the store fails.
    async fn seed(&self, levels: &[Level]) -> ProgressRepositoryResult<SeedOutcome>;
}

/// User account persistence contract.
///
/// XP and level updates are not part of this port: they are committed
/// together with task changes through the task repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a newly enrolled user.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressRepositoryError::DuplicateUser`] when the user ID
    /// already exists.
    async fn store(&self, user: &User) -> ProgressRepositoryResult<()>;

    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_by_id(&self, id: UserId) -> ProgressRepositoryResult<Option<User>>;
}

/// Errors returned by progress repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProgressRepositoryError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProgressRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for ProgressRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
