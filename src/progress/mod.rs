//! Level catalog, users and XP accounting.
//!
//! The level resolver lives in [`domain::LevelCatalog::resolve`]; XP grant
//! and deduction rules live in [`domain::grant_xp`] and
//! [`domain::deduct_xp`]. XP changes are persisted by the task context as
//! part of task commits.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
