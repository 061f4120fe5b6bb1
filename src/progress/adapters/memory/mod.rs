//! In-memory store for levels and users.
//!
//! The task in-memory repository shares this store so that task writes and
//! XP changes commit under a single lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::progress::{
    domain::{Level, User, UserId},
    ports::{
        LevelRepository, ProgressRepositoryError, ProgressRepositoryResult, SeedOutcome,
        UserRepository,
    },
};

/// Thread-safe in-memory level and user store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressStore {
    state: Arc<RwLock<ProgressState>>,
}

#[derive(Debug, Default)]
pub(crate) struct ProgressState {
    pub(crate) levels: Vec<Level>,
    pub(crate) users: HashMap<UserId, User>,
}

impl InMemoryProgressStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `levels`.
    #[must_use]
    pub fn with_levels(levels: impl IntoIterator<Item = Level>) -> Self {
        let mut sorted: Vec<Level> = levels.into_iter().collect();
        sorted.sort_by_key(Level::xp_required);
        Self {
            state: Arc::new(RwLock::new(ProgressState {
                levels: sorted,
                users: HashMap::new(),
            })),
        }
    }

    pub(crate) fn read_state(&self) -> Result<RwLockReadGuard<'_, ProgressState>, String> {
        self.state.read().map_err(|err| err.to_string())
    }

    pub(crate) fn write_state(&self) -> Result<RwLockWriteGuard<'_, ProgressState>, String> {
        self.state.write().map_err(|err| err.to_string())
    }
}

fn poisoned(message: String) -> ProgressRepositoryError {
    ProgressRepositoryError::persistence(std::io::Error::other(message))
}

#[async_trait]
impl LevelRepository for InMemoryProgressStore {
    async fn list_ordered(&self) -> ProgressRepositoryResult<Vec<Level>> {
        let state = self.read_state().map_err(poisoned)?;
        Ok(state.levels.clone())
    }

    async fn seed(&self, levels: &[Level]) -> ProgressRepositoryResult<SeedOutcome> {
        let mut state = self.write_state().map_err(poisoned)?;
        if !state.levels.is_empty() {
            return Ok(SeedOutcome::AlreadyPresent(state.levels.len()));
        }
        state.levels = levels.to_vec();
        state.levels.sort_by_key(Level::xp_required);
        Ok(SeedOutcome::Seeded(state.levels.len()))
    }
}

#[async_trait]
impl UserRepository for InMemoryProgressStore {
    async fn store(&self, user: &User) -> ProgressRepositoryResult<()> {
        let mut state = self.write_state().map_err(poisoned)?;
        if state.users.contains_key(&user.id()) {
            return Err(ProgressRepositoryError::DuplicateUser(user.id()));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> ProgressRepositoryResult<Option<User>> {
        let state = self.read_state().map_err(poisoned)?;
        Ok(state.users.get(&id).cloned())
    }
}
