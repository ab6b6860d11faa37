//! RF remote button catalog and signal classifier
//!
//! Remotes are data, not types: each supported remote model is a static table
//! of [`RemoteButton`] entries, and adding a model means adding a table. The
//! classifier maps a raw (code, pulse width, protocol) triple onto one of the
//! four logical buttons, independent of timing; press/release semantics live
//! in [`debounce`].

pub mod debounce;

pub use debounce::{ButtonDebouncer, ButtonEdge, ButtonEvent};

/// Logical function of a remote button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Go,
    Stop,
    Left,
    Right,
}

/// One physical button on a remote model.
#[derive(Debug, Clone, Copy)]
pub struct RemoteButton {
    pub id: ButtonId,
    /// Code word the button transmits
    pub code: u32,
    /// Encoding protocol the button transmits with
    pub protocol: u8,
    /// Accepted pulse width range in microseconds
    pub pulse_min: u16,
    pub pulse_max: u16,
}

impl RemoteButton {
    /// Catalog entry with the tolerances shared by every remote seen so far:
    /// protocol 1, pulse width 300-400.
    pub const fn standard(id: ButtonId, code: u32) -> Self {
        Self {
            id,
            code,
            protocol: 1,
            pulse_min: 300,
            pulse_max: 400,
        }
    }
}

/// A remote model: its button table plus classification policy.
#[derive(Debug, Clone, Copy)]
pub struct RemoteCatalog {
    pub name: &'static str,
    pub buttons: &'static [RemoteButton],
    /// When false (the default for the hardware in the field, whose receiver
    /// frequently misdetects the protocol), a code-and-pulse match alone is
    /// accepted.
    pub enforce_protocol: bool,
}

impl RemoteCatalog {
    /// Map a raw observation onto a button.
    ///
    /// A code match with the pulse width out of the button's tolerance is
    /// rejected even though the code matched; scanning continues in case
    /// another entry shares the code with a different tolerance.
    pub fn classify(&self, code: u32, pulse_width: u16, protocol: u8) -> Option<ButtonId> {
        for button in self.buttons {
            if button.code != code {
                continue;
            }
            if pulse_width < button.pulse_min || pulse_width > button.pulse_max {
                crate::log_debug!(
                    "Pulse width {} out of range [{} - {}]",
                    pulse_width,
                    button.pulse_min,
                    button.pulse_max
                );
            } else if button.protocol == protocol {
                return Some(button.id);
            } else {
                crate::log_debug!("Protocol mismatch {} for code {}", protocol, code);
                if !self.enforce_protocol {
                    return Some(button.id);
                }
            }
        }
        None
    }
}

/// The 4-button universal remote the reference rig ships with.
///
/// Factory default assigns the same code to two buttons; the remote must be
/// reprogrammed so Go, Left, and Right transmit distinct codes.
pub const fn four_button_remote() -> RemoteCatalog {
    const BUTTONS: [RemoteButton; 4] = [
        RemoteButton::standard(ButtonId::Go, 101100),
        RemoteButton::standard(ButtonId::Stop, 16736120),
        RemoteButton::standard(ButtonId::Left, 101101),
        RemoteButton::standard(ButtonId::Right, 101102),
    ];
    RemoteCatalog {
        name: "4_button_universal",
        buttons: &BUTTONS,
        enforce_protocol: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_matches_code_and_pulse() {
        let catalog = four_button_remote();
        assert_eq!(catalog.classify(101100, 358, 1), Some(ButtonId::Go));
        assert_eq!(catalog.classify(16736120, 300, 1), Some(ButtonId::Stop));
        assert_eq!(catalog.classify(999, 358, 1), None);
    }

    #[test]
    fn test_classify_rejects_pulse_out_of_range_despite_code_match() {
        let catalog = four_button_remote();
        assert_eq!(catalog.classify(101100, 299, 1), None);
        assert_eq!(catalog.classify(101100, 401, 1), None);
    }

    #[test]
    fn test_protocol_mismatch_accepted_when_not_enforced() {
        let catalog = four_button_remote();
        assert!(!catalog.enforce_protocol);
        assert_eq!(catalog.classify(101101, 358, 7), Some(ButtonId::Left));
    }

    #[test]
    fn test_protocol_mismatch_rejected_when_enforced() {
        let mut catalog = four_button_remote();
        catalog.enforce_protocol = true;
        assert_eq!(catalog.classify(101101, 358, 7), None);
        assert_eq!(catalog.classify(101101, 358, 1), Some(ButtonId::Left));
    }
}
