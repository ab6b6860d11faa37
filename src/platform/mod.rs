//! Platform abstraction layer
//!
//! Hardware access for the relay board is isolated behind the
//! [`traits::RelayChannel`] trait so the actuator logic never touches a pin
//! directly. Board-specific implementations live in firmware; the mock
//! implementation here is what host tests drive.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{PlatformError, RelayError, Result};
pub use traits::RelayChannel;
