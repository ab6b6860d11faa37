//! Async workers for the Embassy executor
//!
//! Three cooperating loops: a fast remote-receiver poller, the control loop,
//! and a status renderer. They communicate only through channels, so each
//! worker is a plain generic async function that an application wraps in its
//! own `#[embassy_executor::task]`.
//!
//! Shutdown is cooperative: each worker takes its own [`StopSignal`] and
//! races it against its ticker or queue, so a stop request is observed
//! within one poll interval. The control worker owns the actuators and
//! neutrals them (relays released, motor master open) before returning.
//!
//! # Example (conceptual)
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn remote_task(rf: Rx470Register, events: &'static EventChannel, stop: &'static StopSignal) {
//!     let config = HelmConfig::default();
//!     let debouncer = ButtonDebouncer::new(
//!         four_button_remote(),
//!         config.release_timeout_ms * 1_000,
//!     );
//!     run_remote_task(rf, EmbassyTime, debouncer, events, config.rx_poll_ms, stop).await;
//! }
//! ```

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};

use crate::actuators::speed::SpeedRelayDriver;
use crate::actuators::turn::DirectionDriver;
use crate::controller::Controller;
use crate::core::traits::time::TimeSource;
use crate::devices::compass::BearingSource;
use crate::devices::gps::{self, GpsFix, SentenceSource};
use crate::devices::rf::RfRegister;
use crate::remote::debounce::{ButtonDebouncer, ButtonEvent};
use crate::status::{StatusChannel, StatusIndicator};

/// A couple of control ticks worth of button edges.
pub const EVENT_QUEUE_DEPTH: usize = 8;

pub type EventChannel = Channel<CriticalSectionRawMutex, ButtonEvent, EVENT_QUEUE_DEPTH>;

/// One-shot shutdown request. `Signal::wait` consumes the value, so each
/// worker must be handed its own instance.
pub type StopSignal = Signal<CriticalSectionRawMutex, ()>;

/// Poll the RF receiver register and feed debounced button edges into
/// `events`.
///
/// Runs at `poll_ms` (fast, so short presses between control ticks are not
/// lost). A full event queue drops the edge; the control loop was falling
/// behind anyway. Returns when `stop` is signaled.
pub async fn run_remote_task<R, T>(
    mut rf: R,
    time: T,
    mut debouncer: ButtonDebouncer,
    events: &EventChannel,
    poll_ms: u64,
    stop: &StopSignal,
) where
    R: RfRegister,
    T: TimeSource,
{
    let mut ticker = Ticker::every(Duration::from_millis(poll_ms));
    loop {
        match select(ticker.next(), stop.wait()).await {
            Either::First(()) => {
                let snapshot = rf.snapshot();
                for event in debouncer.poll(snapshot, time.now_us()) {
                    if events.try_send(event).is_err() {
                        crate::log_warn!("Button event queue full, dropping edge");
                    }
                }
            }
            Either::Second(()) => {
                crate::log_info!("Remote worker stopping");
                return;
            }
        }
    }
}

/// Drain the status channel and render each update on the indicator.
///
/// Returns when `stop` is signaled; updates still queued at that point are
/// left unrendered.
pub async fn run_status_task<I>(status: &StatusChannel, mut indicator: I, stop: &StopSignal)
where
    I: StatusIndicator,
{
    loop {
        match select(status.receive(), stop.wait()).await {
            Either::First(update) => indicator.render(&update),
            Either::Second(()) => {
                crate::log_info!("Status worker stopping");
                return;
            }
        }
    }
}

/// The control loop: once per tick read the sensors, take at most one
/// button edge off the queue and advance the controller.
///
/// At most one NMEA sentence is decoded per tick; a tick without a decoded
/// sentence hands the controller the zero fix, which keeps anchor lock
/// honest about data freshness.
///
/// Returns when `stop` is signaled, after neutraling the actuators so the
/// relays are not left energized past shutdown.
pub async fn run_control_task<D, S, B, G, T>(
    mut controller: Controller<'_, D, S>,
    mut compass: B,
    mut nmea: G,
    events: &EventChannel,
    time: T,
    tick_ms: u64,
    stop: &StopSignal,
) where
    D: DirectionDriver,
    S: SpeedRelayDriver,
    B: BearingSource,
    G: SentenceSource,
    T: TimeSource,
{
    let mut ticker = Ticker::every(Duration::from_millis(tick_ms));
    loop {
        match select(ticker.next(), stop.wait()).await {
            Either::First(()) => {
                let bearing = compass.bearing();
                let fix = match nmea.read_line() {
                    Some(line) => gps::decode(&line),
                    None => GpsFix::ZERO,
                };
                let event = events.try_receive().ok();

                controller.tick(time.now_us(), bearing, fix, event);
            }
            Either::Second(()) => {
                crate::log_info!("Control worker stopping");
                controller.stop_all(time.now_us());
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::test_support::leak_channel;
    use crate::status::{StatusUpdate, TurnStatus};
    use core::cell::RefCell;

    #[derive(Default)]
    struct RecordingIndicator {
        rendered: RefCell<Vec<StatusUpdate>>,
    }

    impl StatusIndicator for &RecordingIndicator {
        fn render(&mut self, update: &StatusUpdate) {
            self.rendered.borrow_mut().push(*update);
        }
    }

    // The ticker-driven workers need a running time driver, so only the
    // status worker's stop path is exercised on host; the same select shape
    // guards all three loops.
    #[test]
    fn test_status_worker_renders_then_exits_on_stop() {
        let status = leak_channel();
        let stop = StopSignal::new();
        let indicator = RecordingIndicator::default();

        status
            .try_send(StatusUpdate::Turn(TurnStatus::Started))
            .unwrap();
        stop.signal(());

        // Terminates only if the worker honors the stop request; the pending
        // update is still rendered first because the queue is polled before
        // the signal.
        embassy_futures::block_on(run_status_task(status, &indicator, &stop));

        assert_eq!(
            *indicator.rendered.borrow(),
            vec![StatusUpdate::Turn(TurnStatus::Started)]
        );
        assert!(!stop.signaled());
    }
}
