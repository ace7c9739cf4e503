//! Pumprig Hardware Abstraction Layer
//!
//! This crate defines the pin-level traits that the rig logic is written
//! against. Chip-specific crates (or the embedded-hal adapters in
//! `pumprig-drivers`) implement them, and host tests implement them with
//! recording fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pumprig-firmware                       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pumprig-core / pumprig-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pumprig-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pumprig-hal-rp2040 / embedded-hal      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`delay::BlockingDelay`] - Busy-wait timing
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod gpio;
pub mod uart;

pub use delay::BlockingDelay;
pub use gpio::{InputPin, OutputPin, PinFault};
pub use uart::{UartRx, UartTx};
