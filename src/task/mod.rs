//! Task lifecycle and the XP/task state coordinator.
//!
//! Tasks move between not done, overdue and completed. Creating a task with
//! a past deadline or moving a deadline into the past costs XP; completing a
//! task earns XP and counts towards the owner's daily record. Every change to
//! a task and to its owner's XP is committed as one unit. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
