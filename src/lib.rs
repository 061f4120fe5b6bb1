//! Taskquest: task management with XP and level progression.
//!
//! Users complete tasks to earn XP and climb an ordered level catalog;
//! tasks that fall overdue cost XP. Task changes and the XP they cause are
//! committed together so a user's XP, level and task history never drift
//! apart.
//!
//! # Architecture
//!
//! Taskquest follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of ports
//!
//! # Modules
//!
//! - [`progress`]: Level catalog, users and XP ledger rules
//! - [`task`]: Tasks, daily records and the XP/task state coordinator
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod progress;
pub mod task;
pub mod telemetry;

#[cfg(test)]
mod test_support;
