//! Stages and stage tables
//!
//! A stage is the atomic unit of a station's sequence: a batch of actuator
//! commands applied together, held for a fixed duration. Actuators a stage
//! does not name keep whatever an earlier stage left them at.

use heapless::Vec;

use crate::config::ConfigError;
use crate::traits::{ActuatorCommand, ActuatorId, MAX_ELAPSED_MS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum stages per table
pub const MAX_STAGES: usize = 16;

/// Maximum actuator commands applied by one stage
pub const MAX_STAGE_COMMANDS: usize = 4;

/// Maximum distinct actuators referenced by one table
pub const MAX_TABLE_ACTUATORS: usize = 8;

/// A single timed stage
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "StageWire"))]
pub struct Stage {
    commands: Vec<(ActuatorId, ActuatorCommand), MAX_STAGE_COMMANDS>,
    duration_ms: u32,
}

impl Stage {
    /// Create a stage applying `commands` for `duration_ms`
    ///
    /// Each actuator may appear at most once.
    pub fn new(
        duration_ms: u32,
        commands: &[(ActuatorId, ActuatorCommand)],
    ) -> Result<Self, ConfigError> {
        let mut stage = Self {
            commands: Vec::new(),
            duration_ms,
        };
        for &(id, cmd) in commands {
            if stage.commands.iter().any(|(existing, _)| *existing == id) {
                return Err(ConfigError::DuplicateActuatorInStage(id));
            }
            stage
                .commands
                .push((id, cmd))
                .map_err(|_| ConfigError::TooManyCommands)?;
        }
        Ok(stage)
    }

    /// Single-actuator stage
    pub fn single(
        duration_ms: u32,
        actuator: ActuatorId,
        command: ActuatorCommand,
    ) -> Result<Self, ConfigError> {
        Self::new(duration_ms, &[(actuator, command)])
    }

    /// Pure wait: commands nothing, only holds time
    pub fn wait(duration_ms: u32) -> Self {
        Self {
            commands: Vec::new(),
            duration_ms,
        }
    }

    /// Commands applied when the stage begins
    pub fn commands(&self) -> &[(ActuatorId, ActuatorCommand)] {
        &self.commands
    }

    /// How long the stage is held
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Check if this stage names `actuator`
    pub fn names(&self, actuator: ActuatorId) -> bool {
        self.commands.iter().any(|(id, _)| *id == actuator)
    }
}

/// Ordered, non-empty, immutable sequence of stages
///
/// Only the stages go over the wire. Decoding rebuilds the table through
/// [`StageTable::new`], so a decoded table is validated like any other.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "StageTableWire"))]
pub struct StageTable {
    stages: Vec<Stage, MAX_STAGES>,
    /// Every actuator named anywhere in the table, in first-use order
    #[cfg_attr(feature = "serde", serde(skip))]
    actuators: Vec<ActuatorId, MAX_TABLE_ACTUATORS>,
}

impl StageTable {
    /// Build and validate a table
    ///
    /// Rejects empty or oversized tables, and stages whose duration is
    /// zero or longer than the clock can measure.
    pub fn new(stages: &[Stage]) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::EmptyStageTable);
        }
        if stages.len() > MAX_STAGES {
            return Err(ConfigError::TooManyStages);
        }

        let mut table = Self {
            stages: Vec::new(),
            actuators: Vec::new(),
        };

        for (index, stage) in stages.iter().enumerate() {
            // MAX_STAGES fits in a u8
            let position = index as u8;
            if stage.duration_ms == 0 {
                return Err(ConfigError::ZeroDuration { stage: position });
            }
            if stage.duration_ms > MAX_ELAPSED_MS {
                return Err(ConfigError::DurationTooLong { stage: position });
            }
            for &(id, _) in stage.commands() {
                if !table.actuators.contains(&id) {
                    table
                        .actuators
                        .push(id)
                        .map_err(|_| ConfigError::TooManyActuators)?;
                }
            }
            table
                .stages
                .push(stage.clone())
                .map_err(|_| ConfigError::TooManyStages)?;
        }

        Ok(table)
    }

    /// Number of stages (never zero)
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage at `index`
    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// All stages in order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Every actuator referenced anywhere in the table
    pub fn actuators(&self) -> &[ActuatorId] {
        &self.actuators
    }

    /// Sum of all stage durations
    pub fn total_duration_ms(&self) -> u32 {
        self.stages
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.duration_ms))
    }

    /// Sum of the durations of stages after `index`
    pub fn duration_after_ms(&self, index: usize) -> u32 {
        self.stages
            .iter()
            .skip(index + 1)
            .fold(0u32, |acc, s| acc.saturating_add(s.duration_ms))
    }
}

/// Wire form of a [`Stage`], checked on the way in
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct StageWire {
    commands: Vec<(ActuatorId, ActuatorCommand), MAX_STAGE_COMMANDS>,
    duration_ms: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<StageWire> for Stage {
    type Error = ConfigError;

    fn try_from(wire: StageWire) -> Result<Self, Self::Error> {
        Stage::new(wire.duration_ms, &wire.commands)
    }
}

/// Wire form of a [`StageTable`]: the stages alone
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct StageTableWire {
    stages: Vec<Stage, MAX_STAGES>,
}

#[cfg(feature = "serde")]
impl TryFrom<StageTableWire> for StageTable {
    type Error = ConfigError;

    fn try_from(wire: StageTableWire) -> Result<Self, Self::Error> {
        StageTable::new(&wire.stages)
    }
}
