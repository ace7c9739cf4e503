//! GPIO pins
//!
//! RP2040 GPIO never fails once configured, so the rig pin traits are
//! implemented infallibly.

use embassy_rp::gpio::{Input, Output};
use pumprig_hal::{InputPin, OutputPin, PinFault};

/// Maximum number of GPIO pins on RP2040
pub const GPIO_COUNT: u8 = 30;

/// Push-pull output
pub struct RpOutput(pub Output<'static>);

impl OutputPin for RpOutput {
    fn set_high(&mut self) -> Result<(), PinFault> {
        self.0.set_high();
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), PinFault> {
        self.0.set_low();
        Ok(())
    }
}

/// Digital input
pub struct RpInput(pub Input<'static>);

impl InputPin for RpInput {
    fn is_high(&mut self) -> Result<bool, PinFault> {
        Ok(self.0.is_high())
    }
}
