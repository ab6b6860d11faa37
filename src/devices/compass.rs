//! Bearing sensor trait
//!
//! The compass is an external collaborator; the rig degrades gracefully when
//! it is absent (heading lock becomes unavailable for the session, nothing
//! else changes).

/// Provides the current magnetic bearing.
pub trait BearingSource {
    /// Current bearing in degrees, 0-360, or `None` when the sensor is
    /// absent or not yet delivering readings.
    fn bearing(&mut self) -> Option<f64>;
}

/// Fixed or scripted bearing for host tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MockBearing {
    pub reading: Option<f64>,
}

#[cfg(any(test, feature = "mock"))]
impl BearingSource for MockBearing {
    fn bearing(&mut self) -> Option<f64> {
        self.reading
    }
}
