//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod relay;

pub use relay::RelayChannel;
