//! Sensor-facing interfaces
//!
//! The decoder in `gps` is the only module here with algorithmic content; the
//! compass and RF receiver are external collaborators reached through traits.
//!
//! ## Modules
//!
//! - `gps`: position fix type and NMEA sentence decoder
//! - `compass`: bearing sensor trait
//! - `rf`: RF receiver register trait

pub mod compass;
pub mod gps;
pub mod rf;
