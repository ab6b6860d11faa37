//! Speed actuator
//!
//! The motor's speed coil is fed through a resistor ladder selected by four
//! relays; each discrete level 1-15 maps to a 4-bit pattern over those
//! relays (level 1 = all off = maximum resistance, 15 = all on). A master relay
//! gates power to the motor; the stored level survives a stop so the next
//! bump resumes from where the operator left off.

use crate::status::{publish, StatusChannel, StatusUpdate};

/// Lowest speed level.
pub const MIN_SPEED: u8 = 1;
/// Highest speed level.
pub const MAX_SPEED: u8 = 15;

/// Resistor relay pattern per level. Index is `level - 1`; entry order is
/// relays R1 through R4.
const SPEED_PATTERNS: [[bool; 4]; 15] = [
    [false, false, false, false], // 1
    [true, false, false, false],  // 2
    [false, true, false, false],  // 3
    [true, true, false, false],   // 4
    [true, false, true, false],   // 5
    [false, true, true, false],   // 6
    [true, true, true, false],    // 7
    [false, false, false, true],  // 8
    [true, false, false, true],   // 9
    [false, true, false, true],   // 10
    [true, true, false, true],    // 11
    [false, false, true, true],   // 12
    [true, false, true, true],    // 13
    [false, true, true, true],    // 14
    [true, true, true, true],     // 15
];

/// Commands the speed relays: one master plus four resistor-select outputs.
pub trait SpeedRelayDriver {
    fn set_master(&mut self, on: bool);
    /// `index` is 0-based over R1..R4.
    fn set_resistor(&mut self, index: usize, on: bool);
}

/// Discrete speed actuator.
pub struct SpeedActuator<'a, D: SpeedRelayDriver> {
    driver: D,
    status: &'a StatusChannel,
    level: u8,
    master_on: bool,
}

impl<'a, D: SpeedRelayDriver> SpeedActuator<'a, D> {
    pub fn new(driver: D, status: &'a StatusChannel) -> Self {
        Self {
            driver,
            status,
            level: MIN_SPEED,
            master_on: false,
        }
    }

    /// Stored level, regardless of whether the motor is powered.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Effective speed: the stored level when the master relay is on, else 0.
    pub fn current_speed(&self) -> u8 {
        if self.master_on {
            self.level
        } else {
            0
        }
    }

    pub fn is_on(&self) -> bool {
        self.master_on
    }

    /// Apply the relay pattern for `level`; out-of-range levels are logged
    /// and ignored. `turn_on` additionally closes the master relay (it never
    /// opens it).
    pub fn set(&mut self, level: u8, turn_on: bool) {
        if !(MIN_SPEED..=MAX_SPEED).contains(&level) {
            crate::log_warn!("Invalid speed setting: {}", level);
            return;
        }
        crate::log_info!("Setting speed to {}", level);
        let pattern = SPEED_PATTERNS[(level - 1) as usize];
        for (index, on) in pattern.iter().enumerate() {
            self.driver.set_resistor(index, *on);
        }
        self.level = level;
        if turn_on {
            self.driver.set_master(true);
            self.master_on = true;
        }
        publish(
            self.status,
            StatusUpdate::Speed {
                level: self.level,
                motor_on: self.master_on,
            },
        );
    }

    /// Step the level by `delta` (clamped to the valid range) and power the
    /// motor.
    pub fn bump(&mut self, delta: i8) {
        let bumped = (self.level as i16 + delta as i16)
            .clamp(MIN_SPEED as i16, MAX_SPEED as i16) as u8;
        self.set(bumped, true);
    }

    /// Open the master relay. The stored level is kept for the next resume.
    pub fn stop(&mut self) {
        self.driver.set_master(false);
        self.master_on = false;
        publish(
            self.status,
            StatusUpdate::Speed {
                level: self.level,
                motor_on: false,
            },
        );
    }
}
