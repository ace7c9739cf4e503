//! Logical output lines

use crate::config::Channel;
use crate::error::HardwareFault;

/// Set of output lines addressed by logical channel
///
/// `active` is the logical state. Implementations apply the pin
/// polarity from the channel map.
pub trait OutputLines {
    /// Drive a channel active or inactive
    fn set_line(&mut self, channel: Channel, active: bool) -> Result<(), HardwareFault>;

    /// Check if a channel is mapped on this rig
    fn has_line(&self, channel: Channel) -> bool;

    /// Drive every mapped output inactive
    ///
    /// Attempts every line even if one fails, then reports the first
    /// failure.
    fn all_off(&mut self) -> Result<(), HardwareFault> {
        let mut first_fault = None;
        for channel in Channel::OUTPUTS {
            if !self.has_line(channel) {
                continue;
            }
            if let Err(fault) = self.set_line(channel, false) {
                first_fault.get_or_insert(fault);
            }
        }
        match first_fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl<T: OutputLines + ?Sized> OutputLines for &mut T {
    fn set_line(&mut self, channel: Channel, active: bool) -> Result<(), HardwareFault> {
        T::set_line(self, channel, active)
    }

    fn has_line(&self, channel: Channel) -> bool {
        T::has_line(self, channel)
    }
}
