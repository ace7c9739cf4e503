//! GPIO pin abstractions
//!
//! Digital input and output pins. Unlike a bare register write, every
//! operation can fail so that a broken line surfaces as a fault instead
//! of being silently ignored.

/// A pin operation failed at the hardware level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinFault;

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), PinFault>;

    /// Set the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), PinFault>;

    /// Set the pin to a specific level
    fn set_state(&mut self, high: bool) -> Result<(), PinFault> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> Result<bool, PinFault>;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> Result<bool, PinFault> {
        self.is_high().map(|high| !high)
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) -> Result<(), PinFault> {
        T::set_high(self)
    }

    fn set_low(&mut self) -> Result<(), PinFault> {
        T::set_low(self)
    }
}

impl<T: InputPin + ?Sized> InputPin for &mut T {
    fn is_high(&mut self) -> Result<bool, PinFault> {
        T::is_high(self)
    }
}
