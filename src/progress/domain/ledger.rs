//! XP ledger rules: how XP grants and deductions move level membership.
//!
//! Grants and deductions are deliberately asymmetric. A grant checks only
//! the level immediately above the user's current level, so a single large
//! grant promotes at most one level. A deduction re-resolves the level from
//! the full catalog and may drop several levels at once.

use super::{LevelCatalog, LevelId, User, UserId, Xp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// XP awarded for completing a task.
pub const DEFAULT_COMPLETION_REWARD: Xp = Xp::new(10);

/// XP deducted when a task becomes overdue.
pub const DEFAULT_OVERDUE_PENALTY: Xp = Xp::new(5);

/// Configurable XP amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpRules {
    /// XP granted per completed task.
    pub completion_reward: Xp,
    /// XP deducted when a task is created overdue or edited into overdue.
    pub overdue_penalty: Xp,
}

impl Default for XpRules {
    fn default() -> Self {
        Self {
            completion_reward: DEFAULT_COMPLETION_REWARD,
            overdue_penalty: DEFAULT_OVERDUE_PENALTY,
        }
    }
}

/// Why an XP change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpReason {
    /// A task was completed.
    TaskCompleted,
    /// A task was created overdue or moved from not done to overdue.
    Overdue,
}

impl XpReason {
    /// Returns the canonical label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCompleted => "task_completed",
            Self::Overdue => "overdue",
        }
    }
}

/// Pending XP/level update for one user, computed from a user snapshot.
///
/// Carries the revision it was computed against so the store can reject it
/// if the user changed in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpChange {
    user_id: UserId,
    expected_revision: u64,
    reason: XpReason,
    previous_xp: Xp,
    xp: Xp,
    previous_level_id: LevelId,
    level_id: LevelId,
    changed_at: DateTime<Utc>,
}

impl XpChange {
    /// Returns the affected user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the user revision this change was computed against.
    #[must_use]
    pub const fn expected_revision(&self) -> u64 {
        self.expected_revision
    }

    /// Returns the reason for the change.
    #[must_use]
    pub const fn reason(&self) -> XpReason {
        self.reason
    }

    /// Returns the XP before the change.
    #[must_use]
    pub const fn previous_xp(&self) -> Xp {
        self.previous_xp
    }

    /// Returns the XP after the change.
    #[must_use]
    pub const fn xp(&self) -> Xp {
        self.xp
    }

    /// Returns the level before the change.
    #[must_use]
    pub const fn previous_level_id(&self) -> LevelId {
        self.previous_level_id
    }

    /// Returns the level after the change.
    #[must_use]
    pub const fn level_id(&self) -> LevelId {
        self.level_id
    }

    /// Returns when the change was computed.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    /// Returns `true` when the level membership changes.
    #[must_use]
    pub fn level_changed(&self) -> bool {
        self.previous_level_id != self.level_id
    }
}

/// Grants XP with incremental, single-step promotion.
///
/// Only the level directly above the user's current level is considered.
/// A user whose stored level is missing from the catalog is treated as
/// holding the lowest level.
#[must_use]
pub fn grant_xp(
    catalog: &LevelCatalog,
    user: &User,
    amount: Xp,
    reason: XpReason,
    now: DateTime<Utc>,
) -> XpChange {
    let xp = user.xp().saturating_add(amount);
    let current = catalog
        .find(user.level_id())
        .unwrap_or_else(|| catalog.lowest());
    let level_id = match catalog.first_above(current.xp_required()) {
        Some(next) if xp >= next.xp_required() => next.id(),
        _ => current.id(),
    };

    XpChange {
        user_id: user.id(),
        expected_revision: user.revision(),
        reason,
        previous_xp: user.xp(),
        xp,
        previous_level_id: user.level_id(),
        level_id,
        changed_at: now,
    }
}

/// Deducts XP, flooring at zero, and fully re-resolves the level.
#[must_use]
pub fn deduct_xp(
    catalog: &LevelCatalog,
    user: &User,
    amount: Xp,
    reason: XpReason,
    now: DateTime<Utc>,
) -> XpChange {
    let xp = user.xp().saturating_sub(amount);
    let level_id = catalog.resolve(xp).id();

    XpChange {
        user_id: user.id(),
        expected_revision: user.revision(),
        reason,
        previous_xp: user.xp(),
        xp,
        previous_level_id: user.level_id(),
        level_id,
        changed_at: now,
    }
}
