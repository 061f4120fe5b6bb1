//! User aggregate carrying XP and level membership.

use super::{LevelCatalog, LevelId, ProgressDomainError, UserId, Xp, XpChange};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// User account as seen by the progress domain.
///
/// `xp` and `level_id` change only through an [`XpChange`] computed by the
/// ledger. `revision` increments on every persisted XP change and guards
/// concurrent read-modify-write cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    display_name: String,
    xp: Xp,
    level_id: LevelId,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted display name.
    pub display_name: String,
    /// Persisted XP counter.
    pub xp: Xp,
    /// Persisted level membership.
    pub level_id: LevelId,
    /// Persisted optimistic-concurrency revision.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user at zero XP holding the catalog's lowest level.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressDomainError::EmptyDisplayName`] when the name is
    /// empty after trimming.
    pub fn enroll(
        display_name: impl Into<String>,
        catalog: &LevelCatalog,
        clock: &impl Clock,
    ) -> Result<Self, ProgressDomainError> {
        let raw = display_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProgressDomainError::EmptyDisplayName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: UserId::new(),
            display_name: trimmed.to_owned(),
            xp: Xp::ZERO,
            level_id: catalog.lowest().id(),
            revision: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            display_name: data.display_name,
            xp: data.xp,
            level_id: data.level_id,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the current XP.
    #[must_use]
    pub const fn xp(&self) -> Xp {
        self.xp
    }

    /// Returns the current level identifier.
    #[must_use]
    pub const fn level_id(&self) -> LevelId {
        self.level_id
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

    /// Applies a committed XP change and advances the revision.
    ///
    /// Called by repositories once the change has passed the revision check.
    pub fn apply_change(&mut self, change: &XpChange) {
        self.xp = change.xp();
        self.level_id = change.level_id();
        self.revision = change.expected_revision().saturating_add(1);
        self.updated_at = change.changed_at();
    }
}
