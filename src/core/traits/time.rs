//! Time abstraction for timing-dependent control logic.
//!
//! All control code consumes time as `u64` microseconds since boot through
//! the [`TimeSource`] trait, never through a wall clock directly. Firmware
//! supplies [`EmbassyTime`]; host tests supply [`MockTime`] and advance it
//! explicitly.

use core::cell::Cell;

/// Microseconds per second, for the f64 second durations used by the turn
/// dead-reckoning math.
pub const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Platform-agnostic monotonic time source.
pub trait TimeSource: Clone {
    /// Current time in milliseconds since system start.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Elapsed microseconds since a reference point.
    ///
    /// Saturates to zero when the reference lies in the future, so callers
    /// may use deadlines (such as an expected completion time) as the
    /// reference without wrapping.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Convert a microsecond duration to f64 seconds.
pub fn us_to_secs(us: u64) -> f64 {
    us as f64 / MICROS_PER_SEC
}

/// Convert f64 seconds to a microsecond duration, saturating at zero for
/// negative inputs.
pub fn secs_to_us(secs: f64) -> u64 {
    if secs <= 0.0 {
        0
    } else {
        (secs * MICROS_PER_SEC) as u64
    }
}

// ============================================================================
// Embassy Implementation
// ============================================================================

/// Time source backed by the Embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

#[cfg(feature = "embassy")]
impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source with explicit time advancement.
///
/// # Example
///
/// ```
/// use troll_helm::core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_us(), 0);
///
/// time.advance(1000); // Advance 1ms
/// assert_eq!(time.now_ms(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used in single-threaded test contexts where Cell
// is safe; it is never handed to firmware tasks.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Sets the current time to an absolute microsecond value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by `us` microseconds.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Advances the current time by f64 seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(secs_to_us(secs));
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
