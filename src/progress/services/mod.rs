//! Application services for the level catalog and user enrollment.

mod catalog;

pub use catalog::{ProgressService, ProgressServiceError, ProgressServiceResult};
