//! Press/release reconstruction from a continuous signal stream
//!
//! The receiver never reports "signal stopped", only "signal observed", so a
//! held button shows up as a rapid series of identical observations and a
//! release shows up as silence. [`ButtonDebouncer`] turns that stream into
//! discrete Down/Up events: one Down per press no matter how long it is held,
//! and a synthesized Up once the register has been silent past the release
//! timeout (or immediately when a different button takes over).

use heapless::Vec;

use crate::devices::rf::RfSnapshot;
use crate::remote::{ButtonId, RemoteCatalog};

/// Edge of a button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    Down,
    Up,
}

/// A discrete press or release, consumed once by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: ButtonId,
    pub edge: ButtonEdge,
    /// Control-core timestamp of the poll that produced the event, in µs.
    pub at_us: u64,
}

/// At most Up(previous) + Down(new) per poll.
pub type PollEvents = Vec<ButtonEvent, 2>;

/// Reconstructs press/release semantics from polled register snapshots.
pub struct ButtonDebouncer {
    catalog: RemoteCatalog,
    release_timeout_us: u64,
    last_timestamp: Option<u64>,
    active: Option<ButtonId>,
    active_since_us: u64,
}

impl ButtonDebouncer {
    pub fn new(catalog: RemoteCatalog, release_timeout_us: u64) -> Self {
        Self {
            catalog,
            release_timeout_us,
            last_timestamp: None,
            active: None,
            active_since_us: 0,
        }
    }

    /// The button currently considered held, if any.
    pub fn active_button(&self) -> Option<ButtonId> {
        self.active
    }

    /// Process one register snapshot.
    ///
    /// Events are returned in press order: when one button interrupts
    /// another, the Up for the previous button precedes the Down for the new
    /// one.
    pub fn poll(&mut self, snapshot: RfSnapshot, now_us: u64) -> PollEvents {
        let mut events = PollEvents::new();

        // Only a changed register timestamp is a new observation.
        let observed = match snapshot.timestamp {
            Some(ts) if self.last_timestamp != Some(ts) => {
                self.last_timestamp = Some(ts);
                self.catalog
                    .classify(snapshot.code, snapshot.pulse_width, snapshot.protocol)
            }
            _ => None,
        };

        match (self.active, observed) {
            (Some(active), Some(button)) if button != active => {
                crate::log_info!("Button up (new button press)");
                push(&mut events, active, ButtonEdge::Up, now_us);
                crate::log_info!("Button down");
                push(&mut events, button, ButtonEdge::Down, now_us);
                self.active = Some(button);
                self.active_since_us = now_us;
            }
            (Some(active), observed) => {
                if observed == Some(active) {
                    self.active_since_us = now_us;
                }
                if now_us.saturating_sub(self.active_since_us) > self.release_timeout_us {
                    crate::log_info!("Button up");
                    push(&mut events, active, ButtonEdge::Up, now_us);
                    self.active = None;
                }
            }
            (None, Some(button)) => {
                crate::log_info!("Button down");
                push(&mut events, button, ButtonEdge::Down, now_us);
                self.active = Some(button);
                self.active_since_us = now_us;
            }
            (None, None) => {}
        }

        events
    }
}

fn push(events: &mut PollEvents, button: ButtonId, edge: ButtonEdge, at_us: u64) {
    // Capacity 2 covers the worst case (Up + Down); a push can never fail.
    let _ = events.push(ButtonEvent { button, edge, at_us });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::rf::{MockRfRegister, RfRegister};
    use crate::remote::four_button_remote;

    const TIMEOUT_US: u64 = 350_000;

    fn debouncer() -> ButtonDebouncer {
        ButtonDebouncer::new(four_button_remote(), TIMEOUT_US)
    }

    #[test]
    fn test_sustained_signal_is_one_down_one_up() {
        let mut reg = MockRfRegister::new();
        let mut deb = debouncer();
        let mut now = 0u64;

        // Held Go: a new observation every 10ms for 200ms
        let mut downs = 0;
        let mut ups = 0;
        for _ in 0..20 {
            reg.observe(101100, 358, 1);
            for ev in deb.poll(reg.snapshot(), now) {
                match ev.edge {
                    ButtonEdge::Down => downs += 1,
                    ButtonEdge::Up => ups += 1,
                }
            }
            now += 10_000;
        }
        assert_eq!(downs, 1);
        assert_eq!(ups, 0);
        assert_eq!(deb.active_button(), Some(ButtonId::Go));

        // Silence until just past the release timeout
        let mut released = Vec::<ButtonEvent, 4>::new();
        while now < 200_000 + TIMEOUT_US + 20_000 {
            released.extend(deb.poll(reg.snapshot(), now));
            now += 10_000;
        }
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].edge, ButtonEdge::Up);
        assert_eq!(released[0].button, ButtonId::Go);
        assert_eq!(deb.active_button(), None);
    }

    #[test]
    fn test_unchanged_timestamp_is_not_a_new_observation() {
        let mut reg = MockRfRegister::new();
        let mut deb = debouncer();

        reg.observe(101100, 358, 1);
        assert_eq!(deb.poll(reg.snapshot(), 0).len(), 1);

        // Same latched register, stale timestamp: the hold is not refreshed,
        // so the release timeout eventually fires.
        assert!(deb.poll(reg.snapshot(), 10_000).is_empty());
        let events = deb.poll(reg.snapshot(), TIMEOUT_US + 10_001);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].edge, ButtonEdge::Up);
    }

    #[test]
    fn test_button_switch_emits_up_then_down_in_order() {
        let mut reg = MockRfRegister::new();
        let mut deb = debouncer();

        reg.observe(101101, 358, 1); // Left
        deb.poll(reg.snapshot(), 0);

        reg.observe(101102, 358, 1); // Right interrupts
        let events = deb.poll(reg.snapshot(), 50_000);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ButtonEvent { button: ButtonId::Left, edge: ButtonEdge::Up, at_us: 50_000 });
        assert_eq!(events[1], ButtonEvent { button: ButtonId::Right, edge: ButtonEdge::Down, at_us: 50_000 });
        assert_eq!(deb.active_button(), Some(ButtonId::Right));
    }

    #[test]
    fn test_unclassified_noise_does_not_press_anything() {
        let mut reg = MockRfRegister::new();
        let mut deb = debouncer();

        reg.observe(424242, 358, 1);
        assert!(deb.poll(reg.snapshot(), 0).is_empty());
        assert_eq!(deb.active_button(), None);
    }

    #[test]
    fn test_reobservation_refreshes_hold() {
        let mut reg = MockRfRegister::new();
        let mut deb = debouncer();

        reg.observe(16736120, 358, 1); // Stop
        deb.poll(reg.snapshot(), 0);

        // Re-observed at 300ms: hold refreshed, so no release at 500ms
        reg.observe(16736120, 358, 1);
        assert!(deb.poll(reg.snapshot(), 300_000).is_empty());
        assert!(deb.poll(reg.snapshot(), 500_000).is_empty());

        // But silence past 300ms + timeout releases
        let events = deb.poll(reg.snapshot(), 300_000 + TIMEOUT_US + 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].edge, ButtonEdge::Up);
    }
}
