//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in washbay-core on top of `embedded-hal` 1.0:
//!
//! - Actuators (H-bridge DC motor)

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
