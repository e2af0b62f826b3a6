//! Outbound notifications
//!
//! Every transition a sequencer makes, and every request it refuses, is
//! reported as a [`Notification`] so the host can surface it.

use crate::config::StationId;
use crate::traits::ActuatorError;

/// Reasons a request is refused or a run is aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerError {
    /// No station with this id is configured
    UnknownStation,
    /// Start requested while the station is already running
    AlreadyRunning,
    /// Actuator rejected a command; the station was forced idle
    ActuatorFault(ActuatorError),
}

impl From<ActuatorError> for SequencerError {
    fn from(e: ActuatorError) -> Self {
        SequencerError::ActuatorFault(e)
    }
}

/// What happened to a station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerEvent {
    /// Stage 0 applied
    Started,
    /// Moved on to the stage at this index
    StageAdvanced(u8),
    /// Last stage elapsed; every actuator idled
    Finished,
    /// Stopped on request; every actuator idled
    Cancelled,
    /// Request refused; nothing changed
    Rejected(SequencerError),
    /// Actuator fault mid-run; station halted and idled
    Faulted(ActuatorError),
}

impl SequencerEvent {
    /// Check if this event reports a problem
    pub fn is_error(&self) -> bool {
        matches!(self, SequencerEvent::Rejected(_) | SequencerEvent::Faulted(_))
    }

    /// Check if the station is idle after this event
    pub fn ends_run(&self) -> bool {
        matches!(
            self,
            SequencerEvent::Finished | SequencerEvent::Cancelled | SequencerEvent::Faulted(_)
        )
    }
}

/// Event tagged with the station it concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification {
    /// Station the event concerns
    pub station: StationId,
    /// What happened
    pub event: SequencerEvent,
}

impl Notification {
    /// Create a notification
    pub const fn new(station: StationId, event: SequencerEvent) -> Self {
        Self { station, event }
    }

    /// Notification for a refused request
    pub const fn rejected(station: StationId, error: SequencerError) -> Self {
        Self::new(station, SequencerEvent::Rejected(error))
    }
}
