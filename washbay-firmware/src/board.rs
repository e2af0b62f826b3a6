//! Board wiring
//!
//! Three dual H-bridge drivers (L298N style), six channels in total:
//!
//! | channel | IN_A    | IN_B    | EN (PWM)         |
//! |---------|---------|---------|------------------|
//! | 0       | GPIO10  | GPIO11  | GPIO4  (PWM2 A)  |
//! | 1       | GPIO12  | GPIO13  | GPIO5  (PWM2 B)  |
//! | 2       | GPIO14  | GPIO15  | GPIO6  (PWM3 A)  |
//! | 3       | GPIO16  | GPIO17  | GPIO7  (PWM3 B)  |
//! | 4       | GPIO18  | GPIO19  | GPIO8  (PWM4 A)  |
//! | 5       | GPIO20  | GPIO21  | GPIO9  (PWM4 B)  |
//!
//! UART0 on GPIO0 (TX) / GPIO1 (RX) carries the command console.

use defmt::unwrap;
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, Pwm, PwmOutput};
use washbay_drivers::actuator::{HBridgeActuator, HBridgeConfig};

/// Number of H-bridge channels
pub const CHANNEL_COUNT: usize = 6;

/// PWM counter top. 125 MHz / 5 / 25000 = 1 kHz
const PWM_TOP: u16 = 24_999;

/// PWM clock divider
const PWM_DIVIDER: u8 = 5;

/// One H-bridge channel
pub type Channel = HBridgeActuator<Output<'static>, Output<'static>, PwmOutput<'static>>;

/// Every channel, indexed by `ActuatorId`
pub type ActuatorTable = [Channel; CHANNEL_COUNT];

/// PWM configuration for the enable lines, starting at 0% duty
pub fn pwm_config() -> PwmConfig {
    let mut config = PwmConfig::default();
    config.top = PWM_TOP;
    config.divider = PWM_DIVIDER.into();
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Split a slice configured with both outputs into its two enable lines
pub fn split_enable(pwm: Pwm<'static>) -> (PwmOutput<'static>, PwmOutput<'static>) {
    let (a, b) = pwm.split();
    (unwrap!(a), unwrap!(b))
}

/// Wrap one channel's outputs in a driver
pub fn channel(
    in_a: Output<'static>,
    in_b: Output<'static>,
    enable: PwmOutput<'static>,
) -> Channel {
    HBridgeActuator::new(in_a, in_b, enable, HBridgeConfig::default())
}
