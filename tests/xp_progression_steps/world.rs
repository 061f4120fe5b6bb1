//! Shared world state for XP progression BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskquest::progress::{
    adapters::memory::InMemoryProgressStore,
    domain::{LevelCatalog, LevelId, User, XpRules},
};
use taskquest::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskLifecycleError, TaskLifecycleService},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryProgressStore,
    InMemoryProgressStore,
    DefaultClock,
>;

/// Scenario world for XP progression behaviour tests.
pub struct XpWorld {
    pub store: InMemoryProgressStore,
    pub tasks: InMemoryTaskRepository,
    pub rules: XpRules,
    pub catalog: Option<LevelCatalog>,
    pub user: Option<User>,
    pub last_task: Option<Task>,
    pub last_completion: Option<Result<User, TaskLifecycleError>>,
    /// Level held after each successful completion, in order.
    pub completion_levels: Vec<LevelId>,
}

impl XpWorld {
    /// Creates a world with empty stores and default XP rules.
    #[must_use]
    pub fn new() -> Self {
        let store = InMemoryProgressStore::new();
        let tasks = InMemoryTaskRepository::new(store.clone());
        Self {
            store,
            tasks,
            rules: XpRules::default(),
            catalog: None,
            user: None,
            last_task: None,
            last_completion: None,
            completion_levels: Vec::new(),
        }
    }

    /// Builds a lifecycle service over the world's stores.
    #[must_use]
    pub fn service(&self) -> TestTaskService {
        TaskLifecycleService::new(
            Arc::new(self.tasks.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(DefaultClock),
        )
        .with_rules(self.rules)
    }

    /// Returns the scenario user.
    ///
    /// # Errors
    ///
    /// Returns an error when no user has been created yet.
    pub fn user(&self) -> Result<&User, eyre::Report> {
        self.user
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing user in scenario world"))
    }

    /// Returns the loaded level catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog has not been seeded.
    pub fn catalog(&self) -> Result<&LevelCatalog, eyre::Report> {
        self.catalog
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing level catalog in scenario world"))
    }
}

impl Default for XpWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> XpWorld {
    XpWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
