//! Mode button

use crate::error::HardwareFault;

/// Polled push-button
pub trait ModeButton {
    /// Check if the button is currently pressed
    ///
    /// Polarity (active-low or active-high) is resolved by the
    /// implementation.
    fn is_pressed(&mut self) -> Result<bool, HardwareFault>;
}

impl<T: ModeButton + ?Sized> ModeButton for &mut T {
    fn is_pressed(&mut self) -> Result<bool, HardwareFault> {
        T::is_pressed(self)
    }
}
