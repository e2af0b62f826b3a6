//! Actuator driver implementations
//!
//! - H-bridge: reversible DC motor with PWM speed control

pub mod hbridge;

pub use hbridge::{HBridgeActuator, HBridgeConfig};
