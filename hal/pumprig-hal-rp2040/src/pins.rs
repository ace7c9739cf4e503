//! Dynamic pin allocation for config-driven hardware setup
//!
//! Pin numbers come from `rig.toml`, so pins are handed out by number at
//! runtime. GPIO0/GPIO1 are kept back for UART0.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::peripherals::{PIN_0, PIN_1, UART0};
use embassy_rp::{Peri, Peripherals};
use pumprig_core::config::PinConfig;

use crate::gpio::{RpInput, RpOutput, GPIO_COUNT};

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
    /// Pin reserved for UART0
    Reserved(u8),
}

/// UART0 and its pins, split off before the pin bank is built
pub struct UartPeripherals {
    pub uart0: Peri<'static, UART0>,
    pub tx: Peri<'static, PIN_0>,
    pub rx: Peri<'static, PIN_1>,
}

/// Pin bank that holds the GPIO pins and allows taking them by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT as usize],
}

impl PinBank {
    /// Split the peripherals into a pin bank and the UART0 resources
    pub fn from_peripherals(p: Peripherals) -> (Self, UartPeripherals) {
        let uart = UartPeripherals {
            uart0: p.UART0,
            tx: p.PIN_0,
            rx: p.PIN_1,
        };
        let bank = Self {
            pins: [
                None,
                None,
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        (bank, uart)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin_num >= GPIO_COUNT {
            return Err(PinError::InvalidPin(pin_num));
        }
        if pin_num < 2 {
            return Err(PinError::Reserved(pin_num));
        }
        self.pins[pin_num as usize]
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin_num: u8) -> bool {
        pin_num < GPIO_COUNT && self.pins[pin_num as usize].is_some()
    }

    /// Take a pin as an output at its inactive level
    pub fn output(&mut self, config: PinConfig) -> Result<RpOutput, PinError> {
        let pin = self.take(config.pin)?;
        let level = if config.level_for(false) {
            Level::High
        } else {
            Level::Low
        };
        Ok(RpOutput(Output::new(pin, level)))
    }

    /// Take a pin as an input, with the pull from its config
    pub fn input(&mut self, config: PinConfig) -> Result<RpInput, PinError> {
        let pin = self.take(config.pin)?;
        let pull = if config.pull_up {
            Pull::Up
        } else if config.inverted {
            Pull::None
        } else {
            Pull::Down
        };
        Ok(RpInput(Input::new(pin, pull)))
    }
}
