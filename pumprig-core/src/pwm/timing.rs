//! PWM cycle arithmetic
//!
//! All values use integer division. The truncation is part of the rig's
//! calibrated behaviour (a 20 kHz burst of 165 ms at duty 102 is exactly
//! 3300 cycles of 20 µs high / 30 µs low) and must not be rounded.

use super::{PwmRequest, DUTY_FULL_SCALE, MAX_FREQUENCY_KHZ};
use crate::error::ConfigError;

/// Per-cycle timing of a software PWM burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmTiming {
    /// Full period (µs)
    pub period_us: u32,
    /// High time per cycle (µs)
    pub on_us: u32,
    /// Low time per cycle (µs)
    pub off_us: u32,
    /// Number of cycles in the burst
    pub cycles: u32,
}

impl PwmTiming {
    /// Period in microseconds for a frequency in kHz
    ///
    /// Fails for 0 kHz and for anything above 1000 kHz, where the period
    /// would truncate to zero.
    pub fn period_us(frequency_khz: u16) -> Result<u32, ConfigError> {
        if frequency_khz == 0 || frequency_khz as u32 > MAX_FREQUENCY_KHZ {
            return Err(ConfigError::InvalidFrequency);
        }
        Ok(1000 / frequency_khz as u32)
    }

    /// Timing for a duration-based burst
    pub fn for_request(request: &PwmRequest) -> Result<Self, ConfigError> {
        let period_us = Self::period_us(request.frequency_khz)?;
        let on_us = period_us * request.duty as u32 / DUTY_FULL_SCALE as u32;
        let cycles = request.duration_ms.saturating_mul(1000) / period_us;

        Ok(Self {
            period_us,
            on_us,
            off_us: period_us - on_us,
            cycles,
        })
    }

    /// Timing for a fixed pulse count at a duty percentage
    ///
    /// Used by the serial pulse mode, where the host chooses how many
    /// periods to emit rather than how long.
    pub fn for_pulses(frequency_khz: u16, duty_percent: u8, pulses: u32) -> Result<Self, ConfigError> {
        let period_us = Self::period_us(frequency_khz)?;
        let on_us = period_us * duty_percent.min(100) as u32 / 100;

        Ok(Self {
            period_us,
            on_us,
            off_us: period_us - on_us,
            cycles: pulses,
        })
    }

    /// Total blocking time of the burst (µs)
    pub fn total_us(&self) -> u64 {
        self.cycles as u64 * self.period_us as u64
    }
}
