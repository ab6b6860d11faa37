//! Relay channel interface trait
//!
//! The rig's relay board is active-low: the coil energizes when the driving
//! pin is pulled low. Implementations hide that inversion; callers only ever
//! speak in terms of energized/released.

use crate::platform::Result;

/// One channel of the relay board.
///
/// # Safety Invariants
///
/// - Exactly one owner per channel instance
/// - A channel must be released (coil off) when its owner is dropped or the
///   worker holding it shuts down
pub trait RelayChannel {
    /// Energize the relay coil (contact closes).
    fn energize(&mut self) -> Result<()>;

    /// Release the relay coil (contact opens).
    fn release(&mut self) -> Result<()>;

    /// Drive the coil from a boolean: `true` energizes.
    fn set(&mut self, on: bool) -> Result<()> {
        if on {
            self.energize()
        } else {
            self.release()
        }
    }

    /// Current coil state.
    fn is_energized(&self) -> bool;
}
