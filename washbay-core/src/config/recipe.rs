//! Standard wash recipe
//!
//! Every station on the machine runs the same shape of sequence: pump
//! forward, start the washer, then reverse the pump to drain while the
//! washer keeps spinning. Only the wiring, speeds and timings differ, so
//! a station is described by a [`WashRecipe`] and expanded into a
//! [`StageTable`].

use super::ConfigError;
use crate::scheduler::stage::{Stage, StageTable};
use crate::traits::{ActuatorCommand, ActuatorId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default pump-only stage time
pub const PUMP_STAGE_MS: u32 = 5_000;

/// Default washer spin-up stage time
pub const WASH_STAGE_MS: u32 = 10_000;

/// Default pump speed (8-bit PWM)
pub const DEFAULT_PUMP_SPEED: u16 = 170;

/// Default washer speed (8-bit PWM)
pub const DEFAULT_WASHER_SPEED: u16 = 160;

/// Parameters of the standard three-stage wash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WashRecipe {
    /// Reversible pump (forward fills, reverse drains)
    pub pump: ActuatorId,
    /// Spin-washer motor
    pub washer: ActuatorId,
    /// Pump speed while filling
    pub pump_forward_speed: u16,
    /// Pump speed while draining
    pub pump_reverse_speed: u16,
    /// Washer speed
    pub washer_speed: u16,
    /// Fill time before the washer starts
    pub pump_stage_ms: u32,
    /// Washer spin time before draining
    pub wash_stage_ms: u32,
}

impl WashRecipe {
    /// Recipe with the default speeds and timings
    pub const fn new(pump: ActuatorId, washer: ActuatorId) -> Self {
        Self {
            pump,
            washer,
            pump_forward_speed: DEFAULT_PUMP_SPEED,
            pump_reverse_speed: DEFAULT_PUMP_SPEED,
            washer_speed: DEFAULT_WASHER_SPEED,
            pump_stage_ms: PUMP_STAGE_MS,
            wash_stage_ms: WASH_STAGE_MS,
        }
    }

    /// Override both pump speeds
    pub const fn with_pump_speed(mut self, speed: u16) -> Self {
        self.pump_forward_speed = speed;
        self.pump_reverse_speed = speed;
        self
    }

    /// Override the washer speed
    pub const fn with_washer_speed(mut self, speed: u16) -> Self {
        self.washer_speed = speed;
        self
    }

    /// Override the stage timings
    pub const fn with_timings(mut self, pump_stage_ms: u32, wash_stage_ms: u32) -> Self {
        self.pump_stage_ms = pump_stage_ms;
        self.wash_stage_ms = wash_stage_ms;
        self
    }

    /// Expand into a stage table
    ///
    /// 1. pump forward for `pump_stage_ms`
    /// 2. washer forward for `wash_stage_ms` (pump keeps filling)
    /// 3. pump reverse for `pump_stage_ms + wash_stage_ms` (washer keeps spinning)
    ///
    /// Both actuators are idled by the sequencer once the table ends.
    pub fn stage_table(&self) -> Result<StageTable, ConfigError> {
        if self.pump == self.washer {
            return Err(ConfigError::DuplicateActuatorInStage(self.pump));
        }

        let drain_ms = self.pump_stage_ms.saturating_add(self.wash_stage_ms);
        let stages = [
            Stage::single(
                self.pump_stage_ms,
                self.pump,
                ActuatorCommand::forward(self.pump_forward_speed),
            )?,
            Stage::single(
                self.wash_stage_ms,
                self.washer,
                ActuatorCommand::forward(self.washer_speed),
            )?,
            Stage::single(
                drain_ms,
                self.pump,
                ActuatorCommand::reverse(self.pump_reverse_speed),
            )?,
        ];

        StageTable::new(&stages)
    }
}
