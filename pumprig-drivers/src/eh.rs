//! Adapters from `embedded-hal` 1.0
//!
//! Any chip HAL implementing the embedded-hal digital and delay traits
//! can drive the rig through these wrappers.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital;
use pumprig_hal::{BlockingDelay, InputPin, OutputPin, PinFault};

/// embedded-hal output pin as a rig output pin
pub struct EhOutput<T>(pub T);

impl<T: digital::OutputPin> OutputPin for EhOutput<T> {
    fn set_high(&mut self) -> Result<(), PinFault> {
        self.0.set_high().map_err(|_| PinFault)
    }

    fn set_low(&mut self) -> Result<(), PinFault> {
        self.0.set_low().map_err(|_| PinFault)
    }
}

/// embedded-hal input pin as a rig input pin
pub struct EhInput<T>(pub T);

impl<T: digital::InputPin> InputPin for EhInput<T> {
    fn is_high(&mut self) -> Result<bool, PinFault> {
        self.0.is_high().map_err(|_| PinFault)
    }
}

/// embedded-hal delay as a blocking delay
pub struct EhDelay<T>(pub T);

impl<T: DelayNs> BlockingDelay for EhDelay<T> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}
