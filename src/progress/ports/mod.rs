//! Port contracts for level catalog and user persistence.

pub mod repository;

pub use repository::{
    LevelRepository, ProgressRepositoryError, ProgressRepositoryResult, SeedOutcome,
    UserRepository,
};
