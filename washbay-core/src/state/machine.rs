//! Sequencer state machine
//!
//! The per-station state is a pure function of the previous state and a
//! trigger. Side effects (actuator writes, timestamps) live in the
//! sequencer; this module only decides where to go next.

/// Station sequencer states
///
/// Cancellation is transient: it always collapses straight to `Idle`, so
/// it is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not running; all of the station's actuators are off
    #[default]
    Idle,
    /// Executing the stage at `stage`
    Running {
        /// Index into the stage table
        stage: u8,
    },
}

/// Inputs that drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Start request
    Start,
    /// Current stage's duration has elapsed
    StageElapsed,
    /// Stop request
    Cancel,
    /// Actuator fault while applying a stage
    Fault,
}

impl State {
    /// Check if the station is running
    pub fn is_running(&self) -> bool {
        matches!(self, State::Running { .. })
    }

    /// Current stage index, if running
    pub fn stage(&self) -> Option<u8> {
        match self {
            State::Running { stage } => Some(*stage),
            State::Idle => None,
        }
    }

    /// Process a trigger and return the next state
    ///
    /// `stage_count` is the length of the station's table. `StageElapsed`
    /// advances by exactly one stage, never more.
    pub fn transition(self, trigger: Trigger, stage_count: usize) -> Self {
        use State::*;
        use Trigger::*;

        match (self, trigger) {
            (Idle, Start) => Running { stage: 0 },

            (Running { stage }, StageElapsed) => {
                let next = stage as usize + 1;
                if next < stage_count {
                    Running { stage: next as u8 }
                } else {
                    Idle
                }
            }

            (_, Cancel) | (_, Fault) => Idle,

            // Start while running is rejected by the caller; elapsed while
            // idle means nothing to do
            _ => self,
        }
    }
}
