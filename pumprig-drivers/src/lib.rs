//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pumprig-core:
//!
//! - Software PWM burst generator (bit-banged on a blocking delay)
//! - Pin-backed output lines with per-channel polarity
//! - GPIO mode button
//! - Adapters from `embedded-hal` 1.0 pins and delays

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod eh;
pub mod lines;
pub mod pwm;

pub use button::GpioButton;
pub use lines::{LinePins, PinLines};
pub use pwm::SoftPwm;
