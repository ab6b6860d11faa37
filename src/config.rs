//! Startup configuration
//!
//! One [`HelmConfig`] is constructed at bring-up and passed by reference into
//! each component. There are no ambient globals; every tunable the original
//! rig exposed as a module constant lives here.

/// Autopilot rig configuration.
///
/// Defaults match the values proven on the reference rig; `max_turn_time_secs`
/// in particular was tuned by trial against the physical motor's lock-to-lock
/// travel and should be re-measured for a different motor.
#[derive(Debug, Clone, Copy)]
pub struct HelmConfig {
    /// Maximum time the motor can be turned one direction from center, in
    /// seconds. Travel limit for all targeted turns.
    pub max_turn_time_secs: f64,
    /// Base interval between autopilot-issued corrections, in seconds.
    /// Scaled up at lower speeds (a slower vessel needs longer before a turn
    /// takes effect).
    pub turn_debounce_secs: f64,
    /// Silence on the RF register after which a held button is synthesized as
    /// released, in milliseconds.
    pub release_timeout_ms: u64,
    /// Remote-signal worker poll period, in milliseconds.
    pub rx_poll_ms: u64,
    /// Control loop tick period, in milliseconds.
    pub control_tick_ms: u64,
    /// Hold duration on Go that engages heading lock, in milliseconds.
    pub heading_lock_hold_ms: u64,
    /// Hold duration on Go that stops the motor and engages anchor lock, in
    /// milliseconds.
    pub anchor_lock_hold_ms: u64,
    /// Hold duration on Stop that clears both locks and idles the motor, in
    /// milliseconds.
    pub unlock_hold_ms: u64,
    /// Hold duration on Stop that recalibrates the turn heading to center, in
    /// milliseconds.
    pub reset_heading_hold_ms: u64,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            max_turn_time_secs: 3.5,
            turn_debounce_secs: 1.5,
            release_timeout_ms: 350,
            rx_poll_ms: 10,
            control_tick_ms: 250,
            heading_lock_hold_ms: 2_000,
            anchor_lock_hold_ms: 5_000,
            unlock_hold_ms: 2_000,
            reset_heading_hold_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_rig() {
        let cfg = HelmConfig::default();
        assert!((cfg.max_turn_time_secs - 3.5).abs() < f64::EPSILON);
        assert!((cfg.turn_debounce_secs - 1.5).abs() < f64::EPSILON);
        assert_eq!(cfg.release_timeout_ms, 350);
        assert_eq!(cfg.control_tick_ms, 250);
    }
}
