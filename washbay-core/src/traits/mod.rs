//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencing logic
//! and the host that owns the physical outputs and the time base.

pub mod actuator;
pub mod clock;

pub use actuator::{
    ActuatorBank, ActuatorCommand, ActuatorError, ActuatorId, ActuatorPort, Direction,
    MAX_INTENSITY,
};
pub use clock::{elapsed_ms, MonotonicClock, MAX_ELAPSED_MS};
