//! Domain model for levels, users and XP accounting.
//!
//! All XP and level rules are pure functions over a [`LevelCatalog`] and a
//! [`User`] snapshot; persistence happens elsewhere.

mod error;
mod ids;
mod ledger;
mod level;
mod user;

pub use error::ProgressDomainError;
pub use ids::{LevelId, UserId, Xp};
pub use ledger::{
    DEFAULT_COMPLETION_REWARD, DEFAULT_OVERDUE_PENALTY, XpChange, XpReason, XpRules, deduct_xp,
    grant_xp,
};
pub use level::{Level, LevelCatalog, LevelName, default_levels};
pub use user::{PersistedUserData, User};
