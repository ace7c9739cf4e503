//! RP2040-specific HAL for the rig firmware
//!
//! This crate provides RP2040 implementations of the `pumprig-hal`
//! traits, plus RP2040-specific functionality:
//!
//! - Dynamic pin allocation for config-driven setup
//! - Blocking UART for the serial pulse protocol

#![no_std]

pub mod gpio;
pub mod pins;
pub mod uart;

pub use gpio::{RpInput, RpOutput, GPIO_COUNT};
pub use pins::{PinBank, PinError, UartPeripherals};
pub use uart::RpUart;
