//! Core services
//!
//! Logging macros and the platform-agnostic trait abstractions used by the
//! control logic.

pub mod logging;
pub mod traits;
