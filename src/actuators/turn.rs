//! Turn actuator state machine
//!
//! There is no angle sensor on the turn axis. The actuator dead-reckons the
//! motor head's offset from center as `turn_time_heading`: the signed sum of
//! relay-on seconds, left turns subtracting and right turns adding. That
//! estimate is the rig's only notion of "where the motor points", so travel
//! limits, targeted turns, and operator recalibration all operate on it.
//!
//! A *targeted* turn carries the `turn_time_heading` value at which it should
//! stop; `check_turn` is called every control tick to project the estimate
//! forward and stop the hardware at the target or at the travel limit,
//! whichever comes first. A manual turn (no target) runs until the operator
//! releases the button.

use libm::fabs;

use crate::core::traits::time::us_to_secs;
use crate::status::{publish, StatusChannel, StatusUpdate, TurnStatus};

/// Commands the direction relays. Binary outputs, assumed synchronous and
/// always succeeding at the hardware level.
pub trait DirectionDriver {
    fn turn_left(&mut self);
    fn turn_right(&mut self);
    fn stop(&mut self);
}

/// Which way the motor head is currently being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnDirection {
    #[default]
    Idle,
    Left,
    Right,
}

/// Open-loop turn actuator.
///
/// State invariant: `direction != Idle` implies `turn_started_at` is set.
/// `turn_time_heading` is only ever mutated here, and only reset by explicit
/// operator recalibration.
pub struct TurnActuator<'a, D: DirectionDriver> {
    driver: D,
    status: &'a StatusChannel,
    max_turn_time: f64,
    direction: TurnDirection,
    turn_time_heading: f64,
    turn_started_at: Option<u64>,
    turn_target: Option<f64>,
}

impl<'a, D: DirectionDriver> TurnActuator<'a, D> {
    pub fn new(driver: D, status: &'a StatusChannel, max_turn_time_secs: f64) -> Self {
        Self {
            driver,
            status,
            max_turn_time: max_turn_time_secs,
            direction: TurnDirection::Idle,
            turn_time_heading: 0.0,
            turn_started_at: None,
            turn_target: None,
        }
    }

    /// Dead-reckoned offset from center, in signed seconds of relay-on time.
    pub fn turn_time_heading(&self) -> f64 {
        self.turn_time_heading
    }

    /// Travel limit, in seconds of relay-on time from center.
    pub fn max_turn_time(&self) -> f64 {
        self.max_turn_time
    }

    pub fn direction(&self) -> TurnDirection {
        self.direction
    }

    pub fn target(&self) -> Option<f64> {
        self.turn_target
    }

    /// Start turning left, optionally until `turn_time_heading` reaches
    /// `target`.
    ///
    /// An active right turn is stopped first (its elapsed time folded into
    /// the estimate); an active left turn makes this a no-op. A targeted
    /// request already past the travel limit is refused with a Maxed status
    /// and no hardware command.
    pub fn turn_left(&mut self, target: Option<f64>, now_us: u64) {
        if self.direction == TurnDirection::Right {
            self.stop_turn(now_us);
        }

        self.turn_target = target;

        if self.direction == TurnDirection::Left {
            crate::log_debug!("Already turning left");
        } else if target.is_some() && fabs(self.turn_time_heading) > self.max_turn_time {
            crate::log_info!("Max left turn reached for automated turns");
            publish(self.status, StatusUpdate::Turn(TurnStatus::Maxed));
        } else {
            crate::log_info!("Left turn started");
            self.direction = TurnDirection::Left;
            self.turn_started_at = Some(now_us);
            publish(self.status, StatusUpdate::Turn(TurnStatus::Started));
            self.driver.turn_left();
        }
    }

    /// Start turning right; mirror of [`Self::turn_left`].
    ///
    /// The limit pre-check tests the raw (unsigned-by-omission) estimate
    /// rather than its magnitude, unlike the left side. Kept as the original
    /// behaves; see the regression test covering the asymmetry.
    pub fn turn_right(&mut self, target: Option<f64>, now_us: u64) {
        if self.direction == TurnDirection::Left {
            self.stop_turn(now_us);
        }

        self.turn_target = target;

        if self.direction == TurnDirection::Right {
            crate::log_debug!("Already turning right");
        } else if target.is_some() && self.turn_time_heading > self.max_turn_time {
            crate::log_info!("Max right turn reached for automated turns");
            publish(self.status, StatusUpdate::Turn(TurnStatus::Maxed));
        } else {
            crate::log_info!("Right turn started");
            self.direction = TurnDirection::Right;
            self.turn_started_at = Some(now_us);
            publish(self.status, StatusUpdate::Turn(TurnStatus::Started));
            self.driver.turn_right();
        }
    }

    /// Project the estimate forward and stop a targeted turn at its target
    /// or at the travel limit. Called every control tick.
    pub fn check_turn(&mut self, now_us: u64) {
        let Some(target) = self.turn_target else {
            return;
        };
        let elapsed = us_to_secs(now_us.saturating_sub(self.turn_started_at.unwrap_or(now_us)));
        match self.direction {
            TurnDirection::Left => {
                let projected = self.turn_time_heading - elapsed;
                if fabs(projected) > self.max_turn_time {
                    crate::log_info!("Stopping left turn: limit reached");
                    self.stop_turn(now_us);
                    publish(self.status, StatusUpdate::Turn(TurnStatus::Maxed));
                } else if projected <= target {
                    crate::log_info!("Stopping left turn: target reached");
                    self.stop_turn(now_us);
                }
            }
            TurnDirection::Right => {
                let projected = self.turn_time_heading + elapsed;
                if projected > self.max_turn_time {
                    crate::log_info!("Stopping right turn: limit reached");
                    self.stop_turn(now_us);
                    publish(self.status, StatusUpdate::Turn(TurnStatus::Maxed));
                } else if projected >= target {
                    crate::log_info!("Stopping right turn: target reached");
                    self.stop_turn(now_us);
                }
            }
            TurnDirection::Idle => {}
        }
    }

    /// Stop turning: neutral the relays, fold the elapsed relay-on time into
    /// the estimate (clamped to the travel limit), clear target state.
    pub fn stop_turn(&mut self, now_us: u64) {
        self.driver.stop();
        if let Some(started) = self.turn_started_at {
            let elapsed = us_to_secs(now_us.saturating_sub(started));
            match self.direction {
                TurnDirection::Left => self.turn_time_heading -= elapsed,
                TurnDirection::Right => self.turn_time_heading += elapsed,
                TurnDirection::Idle => {}
            }
            self.turn_time_heading = self
                .turn_time_heading
                .clamp(-self.max_turn_time, self.max_turn_time);
        }
        self.turn_target = None;
        self.direction = TurnDirection::Idle;
        self.turn_started_at = None;
        publish(self.status, StatusUpdate::Turn(TurnStatus::Stopped));
    }

    /// Operator recalibration: declare the motor head physically centered.
    pub fn reset_turn_heading(&mut self) {
        crate::log_info!("Resetting turn heading to 0");
        self.turn_time_heading = 0.0;
        publish(self.status, StatusUpdate::Turn(TurnStatus::Reset));
    }
}
