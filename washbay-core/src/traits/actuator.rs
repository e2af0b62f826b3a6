//! Actuator traits
//!
//! Every pump and washer motor on a station is a bidirectional,
//! speed-controlled actuator. The sequencer only ever writes commands to
//! them; it never reads their state back.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest speed value a stage may request (8-bit PWM range)
pub const MAX_INTENSITY: u16 = 255;

/// Actuator drive direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Forward rotation (pump draws in, washer spins)
    Forward,
    /// Reverse rotation (pump drains)
    Reverse,
    /// De-energized
    #[default]
    Idle,
}

/// Opaque handle to an actuator owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorId(pub u8);

impl ActuatorId {
    /// Index into a host actuator table
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A direction and speed pair written to one actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorCommand {
    /// Drive direction
    pub direction: Direction,
    /// Speed in `[0, MAX_INTENSITY]`, always 0 when idle
    pub speed: u16,
}

impl ActuatorCommand {
    /// Create a command. `Idle` forces the speed to 0.
    pub const fn new(direction: Direction, speed: u16) -> Self {
        match direction {
            Direction::Idle => Self::idle(),
            _ => Self { direction, speed },
        }
    }

    /// Run forward at `speed`
    pub const fn forward(speed: u16) -> Self {
        Self::new(Direction::Forward, speed)
    }

    /// Run in reverse at `speed`
    pub const fn reverse(speed: u16) -> Self {
        Self::new(Direction::Reverse, speed)
    }

    /// Stop the actuator
    pub const fn idle() -> Self {
        Self {
            direction: Direction::Idle,
            speed: 0,
        }
    }

    /// Check if this command leaves the actuator de-energized
    pub fn is_idle(&self) -> bool {
        self.direction == Direction::Idle || self.speed == 0
    }
}

/// Errors raised while commanding an actuator
///
/// These are programming-error class faults: the sequencer halts the
/// affected station when it sees one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// Requested speed exceeds the actuator's configured range
    IntensityOutOfRange {
        /// Speed that was asked for
        requested: u16,
        /// Largest speed the actuator accepts
        max: u16,
    },
    /// Handle does not resolve to an actuator
    UnknownActuator(ActuatorId),
    /// Underlying pin or PWM write failed
    Hardware,
}

/// A single bidirectional, speed-controlled actuator
///
/// Implementations write physical outputs. `set_command` must be
/// idempotent and must not block.
pub trait ActuatorPort {
    /// Apply a direction and speed
    ///
    /// Fails only if `cmd.speed` is outside `[0, max_intensity()]` or the
    /// hardware write itself fails.
    fn set_command(&mut self, cmd: ActuatorCommand) -> Result<(), ActuatorError>;

    /// Largest speed this actuator accepts
    fn max_intensity(&self) -> u16 {
        MAX_INTENSITY
    }

    /// Convenience for `set_command(ActuatorCommand::idle())`
    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.set_command(ActuatorCommand::idle())
    }
}

/// Host-owned collection of actuators addressed by [`ActuatorId`]
///
/// Sequencers hold handles only; the bank is lent to them for the
/// duration of each call.
pub trait ActuatorBank {
    /// Write a command to the actuator behind `id`
    fn command(&mut self, id: ActuatorId, cmd: ActuatorCommand) -> Result<(), ActuatorError>;
}

impl<P: ActuatorPort> ActuatorBank for [P] {
    fn command(&mut self, id: ActuatorId, cmd: ActuatorCommand) -> Result<(), ActuatorError> {
        self.get_mut(id.index())
            .ok_or(ActuatorError::UnknownActuator(id))?
            .set_command(cmd)
    }
}

impl<P: ActuatorPort, const N: usize> ActuatorBank for [P; N] {
    fn command(&mut self, id: ActuatorId, cmd: ActuatorCommand) -> Result<(), ActuatorError> {
        self.as_mut_slice().command(id, cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Port {
        last: ActuatorCommand,
        max: u16,
    }

    impl ActuatorPort for Port {
        fn set_command(&mut self, cmd: ActuatorCommand) -> Result<(), ActuatorError> {
            if cmd.speed > self.max {
                return Err(ActuatorError::IntensityOutOfRange {
                    requested: cmd.speed,
                    max: self.max,
                });
            }
            self.last = cmd;
            Ok(())
        }

        fn max_intensity(&self) -> u16 {
            self.max
        }
    }

    fn port() -> Port {
        Port {
            last: ActuatorCommand::idle(),
            max: MAX_INTENSITY,
        }
    }

    #[test]
    fn test_idle_forces_zero_speed() {
        let cmd = ActuatorCommand::new(Direction::Idle, 200);
        assert_eq!(cmd.direction, Direction::Idle);
        assert_eq!(cmd.speed, 0);
        assert!(cmd.is_idle());
    }

    #[test]
    fn test_forward_and_reverse_keep_speed() {
        assert_eq!(ActuatorCommand::forward(170).speed, 170);
        assert_eq!(ActuatorCommand::reverse(170).direction, Direction::Reverse);
        assert!(!ActuatorCommand::forward(1).is_idle());
        assert!(ActuatorCommand::forward(0).is_idle());
    }

    #[test]
    fn test_bank_routes_by_id() {
        let mut bank = [port(), port(), port()];
        bank.command(ActuatorId(1), ActuatorCommand::forward(160))
            .unwrap();

        assert_eq!(bank[0].last, ActuatorCommand::idle());
        assert_eq!(bank[1].last, ActuatorCommand::forward(160));
        assert_eq!(bank[2].last, ActuatorCommand::idle());
    }

    #[test]
    fn test_bank_unknown_id() {
        let mut bank = [port()];
        let result = bank.command(ActuatorId(4), ActuatorCommand::idle());
        assert_eq!(result, Err(ActuatorError::UnknownActuator(ActuatorId(4))));
    }

    #[test]
    fn test_stop_writes_idle() {
        let mut p = port();
        p.set_command(ActuatorCommand::reverse(90)).unwrap();
        p.stop().unwrap();
        assert_eq!(p.last, ActuatorCommand::idle());
    }

    #[test]
    fn test_out_of_range_is_reported() {
        let mut p = Port {
            last: ActuatorCommand::idle(),
            max: 100,
        };
        let result = p.set_command(ActuatorCommand::forward(101));
        assert_eq!(
            result,
            Err(ActuatorError::IntensityOutOfRange {
                requested: 101,
                max: 100
            })
        );
        assert_eq!(p.last, ActuatorCommand::idle());
    }
}
