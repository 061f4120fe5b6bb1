//! Adapter implementations for progress ports.

pub mod memory;
pub mod postgres;
