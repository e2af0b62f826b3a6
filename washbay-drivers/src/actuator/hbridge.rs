//! H-bridge actuator driver
//!
//! Drives one reversible DC motor through a dual-input H-bridge
//! (L298N, TB6612 and friends) with a PWM enable line:
//!
//! | command | IN_A | IN_B | EN duty          |
//! |---------|------|------|------------------|
//! | Forward | high | low  | scaled speed     |
//! | Reverse | low  | high | scaled speed     |
//! | Idle    | low  | low  | 0                |
//!
//! Every write is applied immediately. There is no ramping: stage changes
//! are seconds apart and the pumps tolerate a hard start.
//!
//! # Usage
//!
//! ```ignore
//! let mut pump = HBridgeActuator::new(in1, in2, pwm_a, HBridgeConfig::default());
//! pump.init()?;
//! pump.set_command(ActuatorCommand::forward(170))?;
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use washbay_core::traits::{ActuatorCommand, ActuatorError, ActuatorPort, Direction, MAX_INTENSITY};

/// H-bridge driver configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HBridgeConfig {
    /// Largest accepted speed; maps to 100% duty
    pub max_intensity: u16,
    /// Minimum duty cycle percentage (below this the motor won't turn)
    pub min_duty: u8,
    /// Swap IN_A and IN_B (motor wired backwards)
    pub swap_direction: bool,
}

impl Default for HBridgeConfig {
    fn default() -> Self {
        Self {
            max_intensity: MAX_INTENSITY,
            min_duty: 0,
            swap_direction: false,
        }
    }
}

/// One H-bridge channel
pub struct HBridgeActuator<A, B, P> {
    in_a: A,
    in_b: B,
    pwm: P,
    config: HBridgeConfig,
    /// Last command that was fully applied
    last: ActuatorCommand,
}

impl<A, B, P> HBridgeActuator<A, B, P>
where
    A: OutputPin,
    B: OutputPin,
    P: SetDutyCycle,
{
    /// Create a new driver. Outputs are not touched until [`init`](Self::init).
    pub fn new(in_a: A, in_b: B, pwm: P, config: HBridgeConfig) -> Self {
        Self {
            in_a,
            in_b,
            pwm,
            config,
            last: ActuatorCommand::idle(),
        }
    }

    /// Force the bridge into the idle state
    pub fn init(&mut self) -> Result<(), ActuatorError> {
        self.coast()?;
        self.last = ActuatorCommand::idle();
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &HBridgeConfig {
        &self.config
    }

    /// Last command that was fully applied
    pub fn last_command(&self) -> ActuatorCommand {
        self.last
    }

    /// Scale a speed to a duty cycle
    ///
    /// Maps `1..=max_intensity` onto `min_duty..=100%` of the PWM range.
    fn scale_duty(&self, speed: u16) -> u16 {
        if speed == 0 || self.config.max_intensity == 0 {
            return 0;
        }

        let max_duty = self.pwm.max_duty_cycle() as u32;
        let min = max_duty * self.config.min_duty.min(100) as u32 / 100;
        let range = max_duty - min;
        let scaled = min + speed as u32 * range / self.config.max_intensity as u32;
        scaled.min(max_duty) as u16
    }

    /// Both inputs low, enable off
    fn coast(&mut self) -> Result<(), ActuatorError> {
        self.pwm.set_duty_cycle(0).map_err(|_| ActuatorError::Hardware)?;
        self.in_a.set_low().map_err(|_| ActuatorError::Hardware)?;
        self.in_b.set_low().map_err(|_| ActuatorError::Hardware)?;
        Ok(())
    }

    fn drive(&mut self, direction: Direction, duty: u16) -> Result<(), ActuatorError> {
        let forward = (direction == Direction::Forward) != self.config.swap_direction;

        // Never flip the bridge while it is energized
        if self.last.direction != direction && !self.last.is_idle() {
            self.pwm.set_duty_cycle(0).map_err(|_| ActuatorError::Hardware)?;
        }

        if forward {
            self.in_b.set_low().map_err(|_| ActuatorError::Hardware)?;
            self.in_a.set_high().map_err(|_| ActuatorError::Hardware)?;
        } else {
            self.in_a.set_low().map_err(|_| ActuatorError::Hardware)?;
            self.in_b.set_high().map_err(|_| ActuatorError::Hardware)?;
        }

        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::Hardware)
    }
}

impl<A, B, P> ActuatorPort for HBridgeActuator<A, B, P>
where
    A: OutputPin,
    B: OutputPin,
    P: SetDutyCycle,
{
    fn set_command(&mut self, cmd: ActuatorCommand) -> Result<(), ActuatorError> {
        if cmd.speed > self.config.max_intensity {
            return Err(ActuatorError::IntensityOutOfRange {
                requested: cmd.speed,
                max: self.config.max_intensity,
            });
        }

        let result = if cmd.is_idle() {
            self.coast()
        } else {
            let duty = self.scale_duty(cmd.speed);
            self.drive(cmd.direction, duty)
        };

        match result {
            Ok(()) => {
                self.last = if cmd.is_idle() {
                    ActuatorCommand::idle()
                } else {
                    cmd
                };
                Ok(())
            }
            Err(e) => {
                // Best effort: leave the bridge de-energized
                let _ = self.coast();
                self.last = ActuatorCommand::idle();
                Err(e)
            }
        }
    }

    fn max_intensity(&self) -> u16 {
        self.config.max_intensity
    }
}
