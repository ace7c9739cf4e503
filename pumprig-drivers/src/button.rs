//! GPIO mode button

use pumprig_core::config::{Channel, PinConfig};
use pumprig_core::error::HardwareFault;
use pumprig_core::traits::ModeButton;
use pumprig_hal::InputPin;

/// Push-button on a GPIO input
///
/// With an inverted pin config the button pulls the line low when
/// pressed (pull-up wiring).
pub struct GpioButton<P> {
    pin: P,
    inverted: bool,
}

impl<P: InputPin> GpioButton<P> {
    /// Create a button using the polarity of `config`
    pub fn new(pin: P, config: PinConfig) -> Self {
        Self {
            pin,
            inverted: config.inverted,
        }
    }
}

impl<P: InputPin> ModeButton for GpioButton<P> {
    fn is_pressed(&mut self) -> Result<bool, HardwareFault> {
        let high = self
            .pin
            .is_high()
            .map_err(|_| HardwareFault::Read(Channel::Button))?;
        Ok(high != self.inverted)
    }
}
