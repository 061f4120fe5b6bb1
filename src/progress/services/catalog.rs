//! Service layer for catalog seeding, catalog loading and user enrollment.

use crate::progress::{
    domain::{LevelCatalog, ProgressDomainError, User, UserId, default_levels},
    ports::{LevelRepository, ProgressRepositoryError, SeedOutcome, UserRepository},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for progress operations.
#[derive(Debug, Error)]
pub enum ProgressServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProgressDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProgressRepositoryError),
}

/// Result type for progress service operations.
pub type ProgressServiceResult<T> = Result<T, ProgressServiceError>;

/// Level catalog and user enrollment service.
#[derive(Clone)]
pub struct ProgressService<L, U, C>
where
    L: LevelRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    levels: Arc<L>,
    users: Arc<U>,
    clock: Arc<C>,
}

impl<L, U, C> ProgressService<L, U, C>
where
    L: LevelRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new progress service.
    #[must_use]
    pub const fn new(levels: Arc<L>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            levels,
            users,
            clock,
        }
    }

    /// Seeds the default level catalog when the store holds no levels.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressServiceError::Repository`] when the store fails.
    pub async fn seed_default_catalog(&self) -> ProgressServiceResult<SeedOutcome> {
        let levels = default_levels()?;
        let outcome = self.levels.seed(&levels).await?;
        match outcome {
            SeedOutcome::Seeded(count) => tracing::info!(count, "seeded level catalog"),
            SeedOutcome::AlreadyPresent(count) => {
                tracing::info!(count, "level catalog already present; skipping seed");
            }
        }
        Ok(outcome)
    }

    /// Loads the level catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressServiceError::Domain`] with
    /// [`ProgressDomainError::EmptyLevelCatalog`] when no levels are seeded.
    pub async fn load_catalog(&self) -> ProgressServiceResult<LevelCatalog> {
        let levels = self.levels.list_ordered().await?;
        Ok(LevelCatalog::new(levels)?)
    }

    /// Creates a user holding zero XP at the catalog's lowest level.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressServiceError`] when the name is invalid, the
    /// catalog is empty, or the store rejects the user.
    pub async fn enroll_user(
        &self,
        display_name: impl Into<String> + Send,
    ) -> ProgressServiceResult<User> {
        let catalog = self.load_catalog().await?;
        let user = User::enroll(display_name, &catalog, &*self.clock)?;
        self.users.store(&user).await?;
        tracing::info!(user_id = %user.id(), level_id = %user.level_id(), "enrolled user");
        Ok(user)
    }

    /// Finds a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressServiceError::Repository`] when lookup fails.
    pub async fn find_user(&self, id: UserId) -> ProgressServiceResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }
}
