//! Mock relay implementation for testing

use crate::platform::{traits::RelayChannel, Result};

/// Mock relay channel
///
/// Tracks coil state and counts transitions for test verification.
#[derive(Debug, Default)]
pub struct MockRelay {
    energized: bool,
    /// Number of release→energize transitions observed.
    pub energize_count: u32,
    /// Number of energize→release transitions observed.
    pub release_count: u32,
}

impl MockRelay {
    /// Create a new mock relay with the coil released.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelayChannel for MockRelay {
    fn energize(&mut self) -> Result<()> {
        if !self.energized {
            self.energize_count += 1;
        }
        self.energized = true;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.energized {
            self.release_count += 1;
        }
        self.energized = false;
        Ok(())
    }

    fn is_energized(&self) -> bool {
        self.energized
    }
}
