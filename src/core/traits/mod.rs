//! Core traits for platform-agnostic control logic.
//!
//! This module provides trait abstractions that decouple the control logic
//! from its time provider, so every timing-dependent component (turn
//! actuator, debouncer, autopilot debounce) can be driven deterministically
//! on host with [`MockTime`].

pub mod time;

pub use time::TimeSource;

#[cfg(feature = "embassy")]
pub use time::EmbassyTime;

pub use time::MockTime;
