#![cfg_attr(not(test), no_std)]

//! troll_helm - Relay-actuated trolling motor autopilot control core
//!
//! This library turns raw sensor signals (GPS fixes, a compass bearing, an RF
//! remote) into timed relay activations that steer and propel a small vessel,
//! while dead-reckoning the actuator position open-loop from elapsed relay-on
//! time (the rig has no angle feedback sensor).
//!
//! # Design Principles
//!
//! - Control logic is pure and synchronous; platform services (time, relays,
//!   sensors) are injected via traits and mocked on host.
//! - Sensor and parse failures never abort the control loop; they degrade to
//!   safe sentinels (zero fix, no classified button, mode-change refusal).
//! - Shared actuator state is owned exclusively by the control loop; workers
//!   communicate only over one-way channels.
//!
//! # Modules
//!
//! - [`platform`]: Relay abstraction and mock implementation
//! - [`core`]: Logging macros and the `TimeSource` abstraction
//! - [`config`]: Startup configuration struct (no ambient globals)
//! - [`devices`]: GPS sentence decoder, bearing and RF register traits
//! - [`remote`]: Button catalog, signal classifier, press/release debouncer
//! - [`actuators`]: Turn and speed actuator state machines, relay drivers
//! - [`autopilot`]: Heading-lock / anchor-lock engine and coarse correction
//! - [`status`]: Outbound status updates and indicator interface
//! - [`controller`]: Per-tick orchestration of all of the above
//! - [`tasks`]: Async worker loops (feature `embassy`)

pub mod actuators;
pub mod autopilot;
pub mod config;
pub mod controller;
pub mod core;
pub mod devices;
pub mod platform;
pub mod remote;
pub mod status;

#[cfg(feature = "embassy")]
pub mod tasks;
