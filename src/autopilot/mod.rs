//! Autopilot engine
//!
//! Maintains the lock mode and computes the coarse steering correction. With
//! heading lock engaged the correction is recomputed every tick from the
//! compass; with anchor lock it is recomputed only at lock time (zero), so
//! the motor does not hunt while anchored without an active navigation
//! source. Corrections are turned into targeted turns through
//! [`apply_correction`](AutopilotEngine::apply_correction), rate-limited by a
//! speed-scaled debounce.

use libm::fabs;

use crate::actuators::turn::{DirectionDriver, TurnActuator};
use crate::core::traits::time::{secs_to_us, us_to_secs};
use crate::devices::gps::GpsFix;
use crate::status::{publish, ModeStatus, StatusChannel, StatusUpdate};

/// Exactly one mode is active at a time; entering a lock clears the other
/// and zeroes any pending correction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AutopilotMode {
    #[default]
    Free,
    /// Hold the bearing captured at lock time, in degrees
    HeadingLock(f64),
    /// Hold the position captured at lock time
    AnchorLock(GpsFix),
}

/// Heading-lock / anchor-lock engine.
pub struct AutopilotEngine<'a> {
    status: &'a StatusChannel,
    turn_debounce_secs: f64,
    bearing: Option<f64>,
    fix: GpsFix,
    mode: AutopilotMode,
    coarse_correction: f64,
    /// Debounce reference: expected completion time of the last issued
    /// correction turn. None until the first correction.
    last_turn_sent_at_us: Option<u64>,
}

impl<'a> AutopilotEngine<'a> {
    pub fn new(status: &'a StatusChannel, turn_debounce_secs: f64) -> Self {
        Self {
            status,
            turn_debounce_secs,
            bearing: None,
            fix: GpsFix::ZERO,
            mode: AutopilotMode::Free,
            coarse_correction: 0.0,
            last_turn_sent_at_us: None,
        }
    }

    pub fn mode(&self) -> AutopilotMode {
        self.mode
    }

    /// Signed degrees between desired and current heading. Positive steers
    /// right.
    pub fn correction(&self) -> f64 {
        self.coarse_correction
    }

    pub fn last_fix(&self) -> GpsFix {
        self.fix
    }

    pub fn bearing(&self) -> Option<f64> {
        self.bearing
    }

    /// Ingest this tick's sensor readings.
    ///
    /// The bearing is only updated when the compass delivered one; the fix
    /// always overwrites, so a tick with no decoded sentence stores the zero
    /// fix and anchor lock can only engage on fresh position data.
    ///
    /// Under heading lock the correction is target − bearing with +360
    /// folded in below −180. A raw difference above +180 is left as is; see
    /// the test documenting the asymmetry.
    pub fn tick(&mut self, bearing: Option<f64>, fix: GpsFix) {
        if bearing.is_some() {
            self.bearing = bearing;
        }
        self.fix = fix;

        if let AutopilotMode::HeadingLock(target) = self.mode {
            if let Some(current) = self.bearing {
                let mut correction = target - current;
                if correction < -180.0 {
                    correction += 360.0;
                }
                self.coarse_correction = correction;
                crate::log_debug!("Coarse correction {} for heading {}", correction, current);
            }
        }
    }

    /// Engage or release heading lock.
    ///
    /// Engaging locks onto the current bearing and requires a live compass;
    /// without one the request is refused with a failed Mode status and the
    /// mode is left unchanged. Either transition clears any anchor lock and
    /// zeroes the pending correction.
    pub fn set_heading_lock(&mut self, enable: bool) {
        if enable && self.bearing.is_none() {
            crate::log_warn!("Cannot set heading lock without heading sensor");
            publish(
                self.status,
                StatusUpdate::Mode {
                    mode: ModeStatus::HeadingLock,
                    failed: true,
                },
            );
            return;
        }

        self.coarse_correction = 0.0;
        match (enable, self.bearing) {
            (true, Some(bearing)) => {
                crate::log_info!("Setting heading lock to {}", bearing);
                self.mode = AutopilotMode::HeadingLock(bearing);
                publish(
                    self.status,
                    StatusUpdate::Mode {
                        mode: ModeStatus::HeadingLock,
                        failed: false,
                    },
                );
            }
            _ => {
                crate::log_info!("Clearing heading lock");
                self.mode = AutopilotMode::Free;
                publish(
                    self.status,
                    StatusUpdate::Mode {
                        mode: ModeStatus::Ready,
                        failed: false,
                    },
                );
            }
        }
    }

    /// Engage or release anchor lock.
    ///
    /// Engaging locks onto the last fix and requires it to be valid
    /// (altitude not required); a stale or absent fix refuses the request
    /// with a failed Mode status. Either transition clears any heading lock
    /// and zeroes the pending correction.
    pub fn set_anchor_lock(&mut self, enable: bool) {
        if enable && !self.fix.is_valid(true) {
            crate::log_warn!("Cannot set anchor lock with invalid GPS data");
            publish(
                self.status,
                StatusUpdate::Mode {
                    mode: ModeStatus::AnchorLock,
                    failed: true,
                },
            );
            return;
        }

        self.coarse_correction = 0.0;
        if enable {
            crate::log_info!("Setting anchor lock");
            self.mode = AutopilotMode::AnchorLock(self.fix);
            publish(
                self.status,
                StatusUpdate::Mode {
                    mode: ModeStatus::AnchorLock,
                    failed: false,
                },
            );
        } else {
            crate::log_info!("Clearing anchor lock");
            self.mode = AutopilotMode::Free;
            publish(
                self.status,
                StatusUpdate::Mode {
                    mode: ModeStatus::Ready,
                    failed: false,
                },
            );
        }
    }

    /// Turn the pending correction into a targeted turn, if one is due.
    ///
    /// No-op when there is no correction, no way (speed 0), or the
    /// speed-scaled debounce has not elapsed: debounce is the base interval
    /// divided by `current_speed / max_speed`, so a slower vessel waits
    /// proportionally longer for a turn's effect to manifest. The debounce
    /// reference is set to `now + turn duration`, so the window only starts
    /// once the commanded turn is expected to have finished.
    pub fn apply_correction<D: DirectionDriver>(
        &mut self,
        turn: &mut TurnActuator<'_, D>,
        current_speed: u8,
        max_speed: u8,
        now_us: u64,
    ) {
        if self.coarse_correction == 0.0 {
            return;
        }
        if current_speed == 0 {
            crate::log_debug!("Ignoring coarse correction: no speed");
            return;
        }

        let factor = f64::from(current_speed) / f64::from(max_speed);
        let debounce = self.turn_debounce_secs / factor;
        if let Some(last) = self.last_turn_sent_at_us {
            let since = us_to_secs(now_us.saturating_sub(last));
            if since < debounce {
                crate::log_debug!("Ignoring coarse correction: debounce not met");
                return;
            }
        }

        let magnitude = fabs(self.coarse_correction);
        let max_turn = turn.max_turn_time();
        let duration = if magnitude > 90.0 {
            max_turn
        } else if magnitude > 45.0 {
            max_turn * 0.75
        } else if magnitude > 22.5 {
            max_turn * 0.5
        } else if magnitude > 11.25 {
            max_turn * 0.25
        } else if magnitude > 5.75 {
            max_turn * 0.125
        } else {
            // Small corrections are left to the next tick's recomputation
            return;
        };

        crate::log_info!(
            "Applying {} sec turn for coarse correction of {}",
            duration,
            self.coarse_correction
        );
        if self.coarse_correction < 0.0 {
            turn.turn_left(Some(turn.turn_time_heading() - duration), now_us);
        } else {
            turn.turn_right(Some(turn.turn_time_heading() + duration), now_us);
        }
        self.last_turn_sent_at_us = Some(now_us + secs_to_us(duration));
    }
}
