//! Board-agnostic core logic for the actuator test rig
//!
//! This crate contains all rig logic that does not depend on specific
//! hardware implementations:
//!
//! - Device traits (output lines, mode button, PWM generator)
//! - Calibration profiles and rig configuration
//! - Software PWM timing arithmetic
//! - Phase state machine
//! - The actuation sequencer (build-up sweep, solenoid engagement,
//!   profile toggle, debug burst, test bench)

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod pwm;
pub mod sequencer;
pub mod state;
pub mod traits;

pub use error::{ConfigError, HardwareFault, RigError};
