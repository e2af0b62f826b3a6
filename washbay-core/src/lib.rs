//! Board-agnostic core logic for the wash station controller
//!
//! This crate contains all sequencing logic that does not depend on
//! specific hardware implementations:
//!
//! - Actuator and clock traits
//! - Stage tables and the standard wash recipe
//! - Per-station state machine
//! - Multi-station controller
//!
//! Nothing here blocks. The host supplies a millisecond timestamp and an
//! actuator bank on every call.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod scheduler;
pub mod state;
pub mod traits;
