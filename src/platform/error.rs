//! Platform error types
//!
//! This module defines error types for platform operations. Relay faults are
//! only observable at claim time; once a channel is claimed, switching it is
//! assumed to succeed at the hardware level.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// Relay operation failed
    Relay(RelayError),
    /// Platform initialization failed
    InitializationFailed,
    /// Resource not available
    ResourceUnavailable,
}

/// Relay-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayError {
    /// Requested channel does not exist on the board
    InvalidChannel,
    /// Channel already claimed by another driver
    ChannelInUse,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Relay(e) => write!(f, "relay error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "platform initialization failed"),
            PlatformError::ResourceUnavailable => write!(f, "resource not available"),
        }
    }
}
