//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskquest::progress::{
    adapters::memory::InMemoryProgressStore,
    domain::{LevelCatalog, User},
    services::ProgressService,
};
use taskquest::task::{adapters::memory::InMemoryTaskRepository, services::TaskLifecycleService};

/// Lifecycle service over in-memory stores.
pub type MemoryTaskService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryProgressStore,
    InMemoryProgressStore,
    DefaultClock,
>;

/// Progress service over the in-memory store.
pub type MemoryProgressService =
    ProgressService<InMemoryProgressStore, InMemoryProgressStore, DefaultClock>;

/// Services sharing one seeded in-memory store.
pub struct MemoryApp {
    pub store: InMemoryProgressStore,
    pub task_repository: InMemoryTaskRepository,
    pub progress: MemoryProgressService,
    pub tasks: MemoryTaskService,
}

impl MemoryApp {
    /// Builds another lifecycle service over the same stores.
    #[must_use]
    pub fn task_service(&self) -> MemoryTaskService {
        TaskLifecycleService::new(
            Arc::new(self.task_repository.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(DefaultClock),
        )
    }

    /// Seeds the default catalog and enrolls a user.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding or enrollment fails.
    pub async fn enrolled_user(&self, name: &str) -> Result<(LevelCatalog, User), eyre::Report> {
        self.progress.seed_default_catalog().await?;
        let catalog = self.progress.load_catalog().await?;
        let user = self.progress.enroll_user(name).await?;
        Ok((catalog, user))
    }

    /// Reloads a user from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing.
    pub async fn reload(&self, user: &User) -> Result<User, eyre::Report> {
        self.progress
            .find_user(user.id())
            .await?
            .ok_or_else(|| eyre::eyre!("user {} missing from store", user.id()))
    }
}

/// Provides services over a fresh in-memory store.
#[fixture]
pub fn app() -> MemoryApp {
    let store = InMemoryProgressStore::new();
    let task_repository = InMemoryTaskRepository::new(store.clone());
    let clock = Arc::new(DefaultClock);
    MemoryApp {
        progress: ProgressService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::clone(&clock),
        ),
        tasks: TaskLifecycleService::new(
            Arc::new(task_repository.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            clock,
        ),
        store,
        task_repository,
    }
}
