//! Turn and speed actuators
//!
//! Both actuators drive the motor head through relays and report every state
//! change on the status channel. The turn actuator is the only component
//! that knows where the motor head is pointing, and it only knows it by
//! integrating relay-on time.
//!
//! ## Modules
//!
//! - `turn`: open-loop turn position tracking, timed/targeted turns, limits
//! - `speed`: discrete speed level to 4-bit resistor relay pattern
//! - `relay`: relay-backed implementations of the driver traits

pub mod relay;
pub mod speed;
pub mod turn;

pub use speed::{SpeedActuator, SpeedRelayDriver};
pub use turn::{DirectionDriver, TurnActuator, TurnDirection};
