//! Levels and the ordered level catalog.
//!
//! The catalog is reference data seeded once per deployment. Level
//! resolution is a pure function over the catalog: a user's level is the
//! greatest lower bound of their XP among the catalog thresholds.

use super::{LevelId, ProgressDomainError, Xp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated, non-empty level name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelName(String);

impl LevelName {
    /// Creates a validated level name.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressDomainError::EmptyLevelName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ProgressDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProgressDomainError::EmptyLevelName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the level name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named tier reached once a user holds at least `xp_required` XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    id: LevelId,
    name: LevelName,
    xp_required: Xp,
}

impl Level {
    /// Creates a level with a fresh identifier.
    #[must_use]
    pub fn new(name: LevelName, xp_required: Xp) -> Self {
        Self::from_parts(LevelId::new(), name, xp_required)
    }

    /// Reconstructs a level from persisted parts.
    #[must_use]
    pub const fn from_parts(id: LevelId, name: LevelName, xp_required: Xp) -> Self {
        Self {
            id,
            name,
            xp_required,
        }
    }

    /// Returns the level identifier.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Returns the level name.
    #[must_use]
    pub const fn name(&self) -> &LevelName {
        &self.name
    }

    /// Returns the XP threshold for this level.
    #[must_use]
    pub const fn xp_required(&self) -> Xp {
        self.xp_required
    }
}

/// Returns the default catalog seeded into a fresh deployment.
///
/// # Errors
///
/// Never fails in practice; the signature keeps name validation explicit.
pub fn default_levels() -> Result<Vec<Level>, ProgressDomainError> {
    [
        ("Newbie", 0),
        ("Beginner", 100),
        ("Intermediate", 500),
        ("Advanced", 1000),
        ("Expert", 2000),
        ("Master", 5000),
    ]
    .into_iter()
    .map(|(name, xp)| Ok(Level::new(LevelName::new(name)?, Xp::new(xp))))
    .collect()
}

/// Level catalog totally ordered by XP threshold.
///
/// A catalog always holds at least one level, so resolution never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    lowest: Level,
    higher: Vec<Level>,
}

impl LevelCatalog {
    /// Builds a catalog from levels in any order.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressDomainError::EmptyLevelCatalog`] when no levels are
    /// supplied, or [`ProgressDomainError::DuplicateLevelThreshold`] when two
    /// levels share a threshold.
    pub fn new(levels: impl IntoIterator<Item = Level>) -> Result<Self, ProgressDomainError> {
        let mut sorted: Vec<Level> = levels.into_iter().collect();
        sorted.sort_by_key(Level::xp_required);

        for pair in sorted.windows(2) {
            if let [left, right] = pair
                && left.xp_required() == right.xp_required()
            {
                return Err(ProgressDomainError::DuplicateLevelThreshold(
                    left.xp_required().value(),
                ));
            }
        }

        let mut iter = sorted.into_iter();
        let lowest = iter.next().ok_or(ProgressDomainError::EmptyLevelCatalog)?;
        if lowest.xp_required() > Xp::ZERO {
            tracing::warn!(
                level = %lowest.name(),
                xp_required = lowest.xp_required().value(),
                "level catalog has no zero-threshold level; low XP users resolve to the lowest level"
            );
        }

        Ok(Self {
            lowest,
            higher: iter.collect(),
        })
    }

    /// Returns the minimum-threshold level.
    #[must_use]
    pub const fn lowest(&self) -> &Level {
        &self.lowest
    }

    /// Iterates levels in ascending threshold order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Level> {
        std::iter::once(&self.lowest).chain(self.higher.iter())
    }

    /// Returns the number of levels in the catalog.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.higher.len() + 1
    }

    /// Always `false`: a catalog holds at least one level.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Finds a level by identifier.
    #[must_use]
    pub fn find(&self, id: LevelId) -> Option<&Level> {
        self.iter().find(|level| level.id() == id)
    }

    /// Returns the first level whose threshold is strictly above `xp`.
    #[must_use]
    pub fn first_above(&self, xp: Xp) -> Option<&Level> {
        self.iter().find(|level| level.xp_required() > xp)
    }

    /// Returns the highest level whose threshold is at or below `xp`.
    #[must_use]
    pub fn first_at_or_below(&self, xp: Xp) -> Option<&Level> {
        self.iter().rev().find(|level| level.xp_required() <= xp)
    }

    /// Resolves the level a user holding `xp` belongs to.
    ///
    /// Falls back to the lowest level when `xp` is below every threshold.
    #[must_use]
    pub fn resolve(&self, xp: Xp) -> &Level {
        self.first_at_or_below(xp).unwrap_or(&self.lowest)
    }
}
