//! RF receiver register trait
//!
//! The 433 MHz receiver only ever reports "signal observed": it latches the
//! last decoded code, pulse width, and protocol, plus a timestamp. A changed
//! timestamp is the sole indication of a new observation; the debouncer in
//! [`crate::remote::debounce`] reconstructs press/release semantics from
//! that.

/// One latched observation from the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfSnapshot {
    /// Decoded code word
    pub code: u32,
    /// Measured pulse width in microseconds
    pub pulse_width: u16,
    /// Detected encoding protocol
    pub protocol: u8,
    /// Receiver timestamp of the observation; `None` until the first decode
    pub timestamp: Option<u64>,
}

impl RfSnapshot {
    /// Register contents before any signal has been decoded.
    pub const EMPTY: RfSnapshot = RfSnapshot {
        code: 0,
        pulse_width: 0,
        protocol: 0,
        timestamp: None,
    };
}

/// Polled access to the receiver's latch register.
pub trait RfRegister {
    fn snapshot(&mut self) -> RfSnapshot;
}

/// Scriptable register for host tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug)]
pub struct MockRfRegister {
    latched: RfSnapshot,
    next_timestamp: u64,
}

#[cfg(any(test, feature = "mock"))]
impl Default for MockRfRegister {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockRfRegister {
    pub fn new() -> Self {
        Self {
            latched: RfSnapshot::EMPTY,
            next_timestamp: 1,
        }
    }

    /// Latch a new observation, advancing the register timestamp.
    pub fn observe(&mut self, code: u32, pulse_width: u16, protocol: u8) {
        self.latched = RfSnapshot {
            code,
            pulse_width,
            protocol,
            timestamp: Some(self.next_timestamp),
        };
        self.next_timestamp += 1;
    }
}

#[cfg(any(test, feature = "mock"))]
impl RfRegister for MockRfRegister {
    fn snapshot(&mut self) -> RfSnapshot {
        self.latched
    }
}
