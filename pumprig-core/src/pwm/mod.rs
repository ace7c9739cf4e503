//! Software PWM requests and timing
//!
//! A PWM request describes one blocking burst: how long, how hard, how
//! fast and on which line. [`PwmTiming`] turns it into the per-cycle
//! on/off times the bit-bang generator spins on.

pub mod timing;

pub use timing::PwmTiming;

use crate::config::Channel;

/// Highest frequency that still yields a 1 µs period
pub const MAX_FREQUENCY_KHZ: u32 = 1000;

/// Full-scale raw duty value
pub const DUTY_FULL_SCALE: u8 = 255;

/// Convert a duty percentage to a raw 0-255 value
///
/// Percentages above 100 are clamped. The result truncates, so 40%
/// maps to 102, not 102.5.
pub fn duty_from_percent(percent: u8) -> u8 {
    let percent = percent.min(100) as u32;
    (percent * DUTY_FULL_SCALE as u32 / 100) as u8
}

/// One blocking PWM burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmRequest {
    /// Burst length (ms)
    pub duration_ms: u32,
    /// Duty value, 0 = always off, 255 = always on
    pub duty: u8,
    /// Switching frequency (kHz)
    pub frequency_khz: u16,
    /// Line the burst is emitted on
    pub line: Channel,
}

impl PwmRequest {
    /// Create a new request
    pub const fn new(duration_ms: u32, duty: u8, frequency_khz: u16, line: Channel) -> Self {
        Self {
            duration_ms,
            duty,
            frequency_khz,
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_from_percent() {
        assert_eq!(duty_from_percent(0), 0);
        assert_eq!(duty_from_percent(40), 102);
        assert_eq!(duty_from_percent(50), 127);
        assert_eq!(duty_from_percent(100), 255);
        // Clamped
        assert_eq!(duty_from_percent(150), 255);
    }
}
