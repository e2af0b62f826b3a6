//! Station state machine and outbound events
//!
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::{Notification, SequencerError, SequencerEvent};
pub use machine::{State, Trigger};
