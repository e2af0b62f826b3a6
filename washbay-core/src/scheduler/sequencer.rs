//! Station sequencer
//!
//! Drives one station through its stage table. The sequencer never waits:
//! `tick` compares the time spent in the current stage against its
//! duration and, once it has elapsed, applies the next stage. The host
//! calls `tick` on a short period and may call `cancel` at any moment.

use crate::config::{StationConfig, StationId};
use crate::scheduler::stage::StageTable;
use crate::state::{SequencerError, SequencerEvent, State, Trigger};
use crate::traits::{elapsed_ms, ActuatorBank, ActuatorCommand, ActuatorError};

/// State machine for a single station
///
/// Created once at startup and reused for every run. Whenever the state
/// is `Running { stage }`, `stage_started_ms` is set and `stage` indexes a
/// valid entry of the table.
#[derive(Debug, Clone)]
pub struct StationSequencer {
    /// Station identity
    id: StationId,
    /// Sequence, shared by every run
    table: StageTable,
    /// Current state
    state: State,
    /// Timestamp at which the current stage was applied
    stage_started_ms: Option<u32>,
}

impl StationSequencer {
    /// Create an idle sequencer for a station
    pub fn new(config: StationConfig) -> Self {
        Self {
            id: config.id,
            table: config.table,
            state: State::Idle,
            stage_started_ms: None,
        }
    }

    /// Station identity
    pub fn id(&self) -> StationId {
        self.id
    }

    /// Stage table this sequencer runs
    pub fn table(&self) -> &StageTable {
        &self.table
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Check if a run is in progress
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Index of the stage being executed
    pub fn current_stage(&self) -> Option<u8> {
        self.state.stage()
    }

    /// When the current stage was applied
    pub fn stage_started_ms(&self) -> Option<u32> {
        self.stage_started_ms
    }

    /// Start a run
    ///
    /// Only legal while idle. Stage 0 is applied before returning. If an
    /// actuator rejects a command the station is forced idle again and the
    /// fault is returned.
    pub fn start<B: ActuatorBank + ?Sized>(
        &mut self,
        now_ms: u32,
        bank: &mut B,
    ) -> Result<SequencerEvent, SequencerError> {
        if self.state.is_running() {
            return Err(SequencerError::AlreadyRunning);
        }

        self.state = self.state.transition(Trigger::Start, self.table.len());
        self.stage_started_ms = Some(now_ms);

        if let Err(e) = self.apply_stage(0, bank) {
            self.halt(bank);
            return Err(SequencerError::ActuatorFault(e));
        }

        Ok(SequencerEvent::Started)
    }

    /// Advance time
    ///
    /// Does nothing while idle or while the current stage has time left.
    /// Otherwise moves exactly one stage forward, even if `now_ms` is past
    /// the end of several stages; the next call catches up.
    pub fn tick<B: ActuatorBank + ?Sized>(
        &mut self,
        now_ms: u32,
        bank: &mut B,
    ) -> Option<SequencerEvent> {
        let stage = self.state.stage()?;
        let started = self.stage_started_ms?;
        let duration = self.table.get(stage as usize)?.duration_ms();

        if elapsed_ms(now_ms, started) < duration {
            return None;
        }

        match self.state.transition(Trigger::StageElapsed, self.table.len()) {
            State::Running { stage: next } => {
                self.state = State::Running { stage: next };
                self.stage_started_ms = Some(now_ms);

                match self.apply_stage(next as usize, bank) {
                    Ok(()) => Some(SequencerEvent::StageAdvanced(next)),
                    Err(e) => {
                        self.halt(bank);
                        Some(SequencerEvent::Faulted(e))
                    }
                }
            }
            State::Idle => {
                self.state = State::Idle;
                self.stage_started_ms = None;

                match self.idle_all(bank) {
                    Ok(()) => Some(SequencerEvent::Finished),
                    Err(e) => Some(SequencerEvent::Faulted(e)),
                }
            }
        }
    }

    /// Stop immediately
    ///
    /// Legal from any state. Every actuator named anywhere in the table is
    /// idled before this returns.
    pub fn cancel<B: ActuatorBank + ?Sized>(&mut self, bank: &mut B) -> SequencerEvent {
        self.state = self.state.transition(Trigger::Cancel, self.table.len());
        self.stage_started_ms = None;

        match self.idle_all(bank) {
            Ok(()) => SequencerEvent::Cancelled,
            Err(e) => SequencerEvent::Faulted(e),
        }
    }

    /// Time left in the current stage
    pub fn stage_remaining_ms(&self, now_ms: u32) -> Option<u32> {
        let stage = self.state.stage()?;
        let started = self.stage_started_ms?;
        let duration = self.table.get(stage as usize)?.duration_ms();
        Some(duration.saturating_sub(elapsed_ms(now_ms, started)))
    }

    /// Time left until the run finishes
    pub fn remaining_ms(&self, now_ms: u32) -> Option<u32> {
        let stage = self.state.stage()?;
        let current = self.stage_remaining_ms(now_ms)?;
        Some(current.saturating_add(self.table.duration_after_ms(stage as usize)))
    }

    /// Write every command of one stage
    fn apply_stage<B: ActuatorBank + ?Sized>(
        &self,
        index: usize,
        bank: &mut B,
    ) -> Result<(), ActuatorError> {
        if let Some(stage) = self.table.get(index) {
            for &(id, cmd) in stage.commands() {
                bank.command(id, cmd)?;
            }
        }
        Ok(())
    }

    /// Idle every actuator of the table
    ///
    /// Keeps going past failures so that one bad output cannot leave the
    /// others energized. Returns the first error seen.
    fn idle_all<B: ActuatorBank + ?Sized>(&self, bank: &mut B) -> Result<(), ActuatorError> {
        let mut result = Ok(());
        for &id in self.table.actuators() {
            if let Err(e) = bank.command(id, ActuatorCommand::idle()) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// Abort after a fault
    fn halt<B: ActuatorBank + ?Sized>(&mut self, bank: &mut B) {
        self.state = self.state.transition(Trigger::Fault, self.table.len());
        self.stage_started_ms = None;
        let _ = self.idle_all(bank);
    }
}
