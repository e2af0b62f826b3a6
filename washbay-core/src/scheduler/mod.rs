//! Stage scheduler
//!
//! Stage tables describe what each station does and when; sequencers walk
//! one station through its table; the controller drives every station
//! from a single control loop.

pub mod controller;
pub mod sequencer;
pub mod stage;

#[cfg(test)]
mod testing;

pub use controller::{Command, Notifications, SequencerController};
pub use sequencer::StationSequencer;
pub use stage::{Stage, StageTable, MAX_STAGES, MAX_STAGE_COMMANDS, MAX_TABLE_ACTUATORS};
