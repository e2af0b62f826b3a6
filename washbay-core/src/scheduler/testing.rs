//! Test doubles shared by the scheduler tests

use heapless::Vec;

use crate::traits::{ActuatorBank, ActuatorCommand, ActuatorError, ActuatorId, MAX_INTENSITY};

pub const BANK_SIZE: usize = 8;

/// Actuator bank that remembers every write
pub struct RecordingBank {
    pub outputs: [ActuatorCommand; BANK_SIZE],
    pub log: Vec<(ActuatorId, ActuatorCommand), 128>,
    /// Writes to this actuator fail with `IntensityOutOfRange`
    pub faulty: Option<ActuatorId>,
}

impl RecordingBank {
    pub fn new() -> Self {
        Self {
            outputs: [ActuatorCommand::idle(); BANK_SIZE],
            log: Vec::new(),
            faulty: None,
        }
    }

    pub fn output(&self, id: ActuatorId) -> ActuatorCommand {
        self.outputs[id.index()]
    }

    pub fn writes(&self) -> usize {
        self.log.len()
    }

    /// Writes that were not idle commands
    pub fn active_writes(&self) -> usize {
        self.log.iter().filter(|(_, c)| !c.is_idle()).count()
    }
}

impl ActuatorBank for RecordingBank {
    fn command(&mut self, id: ActuatorId, cmd: ActuatorCommand) -> Result<(), ActuatorError> {
        if self.faulty == Some(id) && !cmd.is_idle() {
            return Err(ActuatorError::IntensityOutOfRange {
                requested: cmd.speed,
                max: MAX_INTENSITY,
            });
        }
        let slot = self
            .outputs
            .get_mut(id.index())
            .ok_or(ActuatorError::UnknownActuator(id))?;
        *slot = cmd;
        let _ = self.log.push((id, cmd));
        Ok(())
    }
}
