//! Step definitions for XP progression scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
