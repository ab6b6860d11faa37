//! Outbound status updates
//!
//! Every state change the operator can perceive is published as a
//! [`StatusUpdate`] on a one-way channel. The indicator worker drains the
//! channel and renders updates on whatever hardware the rig carries (the
//! reference rig uses three LEDs); rendering is entirely the consumer's
//! concern. Producers never block: a full channel drops the update.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Depth of the status channel. Updates beyond this while the indicator
/// worker is stalled are dropped.
pub const STATUS_QUEUE_DEPTH: usize = 16;

/// Channel carrying status updates from the control loop to the indicator
/// worker.
pub type StatusChannel = Channel<CriticalSectionRawMutex, StatusUpdate, STATUS_QUEUE_DEPTH>;

/// Autopilot mode reported to the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeStatus {
    /// Free running, no lock engaged
    Ready,
    /// Holding a fixed bearing
    HeadingLock,
    /// Holding a fixed position
    AnchorLock,
}

/// Turn actuator activity reported to the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnStatus {
    /// A turn started
    Started,
    /// The active turn stopped
    Stopped,
    /// A targeted turn was refused or cut short at the travel limit
    Maxed,
    /// The dead-reckoned heading was recalibrated to center
    Reset,
}

/// One outbound notification.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusUpdate {
    /// Autopilot mode changed, or a mode change was refused (`failed`)
    Mode { mode: ModeStatus, failed: bool },
    /// Turn actuator activity
    Turn(TurnStatus),
    /// Speed level or motor master relay changed
    Speed { level: u8, motor_on: bool },
}

/// Renders status updates on indicator hardware.
///
/// Out-of-scope collaborator: the control core only guarantees it a
/// non-blocking stream of updates.
pub trait StatusIndicator {
    fn render(&mut self, update: &StatusUpdate);
}

/// Publish an update without blocking; drops when the channel is full.
pub fn publish(channel: &StatusChannel, update: StatusUpdate) {
    if channel.try_send(update).is_err() {
        crate::log_debug!("Status channel full, dropping update");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Leak a fresh channel so each test gets an independent 'static one.
    pub fn leak_channel() -> &'static StatusChannel {
        Box::leak(Box::new(StatusChannel::new()))
    }

    /// Drain every pending update into a Vec.
    pub fn drain(channel: &StatusChannel) -> Vec<StatusUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = channel.try_receive() {
            out.push(update);
        }
        out
    }
}
