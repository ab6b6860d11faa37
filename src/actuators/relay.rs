//! Relay-backed driver implementations
//!
//! Maps the abstract direction/speed driver capabilities onto the rig's
//! relay board. Channel claiming happens at bring-up (a claim failure there
//! is fatal; an actuator without working relays cannot enforce travel
//! limits); after that, switching is assumed to succeed and any reported
//! fault is only logged.
//!
//! Direction wiring: the turn motor's two polarity wires sit between the
//! power relay's and ground relay's NO/NC contacts, so both relays released
//! routes current one way (left) and both energized routes it the other way
//! (right). The master relay is always opened before the polarity relays
//! change and re-closed after, so the motor never sees a half-switched
//! bridge.

use crate::actuators::speed::SpeedRelayDriver;
use crate::actuators::turn::DirectionDriver;
use crate::platform::RelayChannel;

fn drive<R: RelayChannel>(relay: &mut R, on: bool) {
    if relay.set(on).is_err() {
        crate::log_warn!("Relay command failed");
    }
}

/// Direction driver over master/power/ground relays.
pub struct RelayDirectionDriver<R: RelayChannel> {
    master: R,
    power: R,
    ground: R,
}

impl<R: RelayChannel> RelayDirectionDriver<R> {
    /// Takes ownership of three claimed channels, leaving them released.
    pub fn new(mut master: R, mut power: R, mut ground: R) -> Self {
        drive(&mut master, false);
        drive(&mut power, false);
        drive(&mut ground, false);
        Self {
            master,
            power,
            ground,
        }
    }
}

impl<R: RelayChannel> DirectionDriver for RelayDirectionDriver<R> {
    fn turn_left(&mut self) {
        drive(&mut self.master, false);

        drive(&mut self.power, false);
        drive(&mut self.ground, false);

        drive(&mut self.master, true);
    }

    fn turn_right(&mut self) {
        drive(&mut self.master, false);

        drive(&mut self.power, true);
        drive(&mut self.ground, true);

        drive(&mut self.master, true);
    }

    fn stop(&mut self) {
        drive(&mut self.master, false);
        drive(&mut self.power, false);
        drive(&mut self.ground, false);
    }
}

/// Speed driver over the master relay and the four resistor-select relays.
pub struct RelaySpeedDriver<R: RelayChannel> {
    master: R,
    resistors: [R; 4],
}

impl<R: RelayChannel> RelaySpeedDriver<R> {
    pub fn new(mut master: R, mut resistors: [R; 4]) -> Self {
        drive(&mut master, false);
        for relay in resistors.iter_mut() {
            drive(relay, false);
        }
        Self { master, resistors }
    }
}

impl<R: RelayChannel> SpeedRelayDriver for RelaySpeedDriver<R> {
    fn set_master(&mut self, on: bool) {
        drive(&mut self.master, on);
    }

    fn set_resistor(&mut self, index: usize, on: bool) {
        if let Some(relay) = self.resistors.get_mut(index) {
            drive(relay, on);
        } else {
            crate::log_warn!("No resistor relay at index {}", index);
        }
    }
}
