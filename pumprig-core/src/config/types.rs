//! Rig configuration types
//!
//! Every timing constant of the rig lives here under a name, with the
//! reference rig's values as defaults.

use heapless::Vec;

use super::calibration::{CalibrationEntry, Profile, SOLO, SWING};
use super::hardware::ChannelMap;
use crate::error::ConfigError;
use crate::pwm::{duty_from_percent, MAX_FREQUENCY_KHZ};

/// Maximum number of jitter offsets in a sweep
pub const MAX_JITTER_TRIALS: usize = 16;

/// Reference jitter sweep (per-mille of the adjusted build-up)
pub const DEFAULT_JITTER_PERMILLE: [i16; 7] = [-120, -80, -40, 0, 40, 80, 120];

/// What the firmware does after boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Button-stepped calibration sequence
    #[default]
    Sequence,
    /// Manual duty pass-through, button toggles pause
    TestBench,
    /// Duty and pulse count received over serial, run once
    SerialPulse,
}

impl OperatingMode {
    /// Look up a mode by its config name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sequence" => Some(OperatingMode::Sequence),
            "test_bench" => Some(OperatingMode::TestBench),
            "serial_pulse" => Some(OperatingMode::SerialPulse),
            _ => None,
        }
    }
}

/// Sequencer timing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Software PWM switching frequency (kHz)
    pub pwm_frequency_khz: u16,
    /// Priming burst duration at the start of each build-up (ms)
    pub prime_ms: u16,
    /// Priming duty as a reference voltage ratio (numerator)
    pub prime_ratio_num: u16,
    /// Priming duty as a reference voltage ratio (denominator)
    pub prime_ratio_den: u16,
    /// Pause between the calibrated burst and the solenoid (ms)
    pub settle_ms: u16,
    /// Solenoid full-on hold time (ms)
    pub solenoid_hold_ms: u16,
    /// Button poll interval while waiting for a press (ms)
    pub idle_poll_ms: u16,
    /// Button poll interval while held (ms)
    pub hold_tick_ms: u16,
    /// Hold ticks that must be exceeded for a long press
    pub long_press_ticks: u16,
    /// Build-up jitter offsets, swept in order (per-mille)
    pub jitter_permille: Vec<i16, MAX_JITTER_TRIALS>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let mut jitter_permille = Vec::new();
        for offset in DEFAULT_JITTER_PERMILLE {
            // Capacity exceeds the default sweep
            let _ = jitter_permille.push(offset);
        }

        Self {
            pwm_frequency_khz: 20,
            prime_ms: 35,
            // 1.5 V out of a 4 V reference
            prime_ratio_num: 15,
            prime_ratio_den: 40,
            settle_ms: 50,
            solenoid_hold_ms: 300,
            idle_poll_ms: 10,
            hold_tick_ms: 100,
            long_press_ticks: 10,
            jitter_permille,
        }
    }
}

impl TimingConfig {
    /// Raw duty value of the priming burst
    pub fn prime_duty_value(&self) -> u8 {
        let den = self.prime_ratio_den.max(1) as u32;
        let value = 255 * self.prime_ratio_num as u32 / den;
        value.min(255) as u8
    }

    /// Replace the jitter sweep
    pub fn set_jitter(&mut self, offsets: &[i16]) -> Result<(), ConfigError> {
        let mut jitter = Vec::new();
        for &offset in offsets {
            jitter
                .push(offset)
                .map_err(|_| ConfigError::TooManyJitterOffsets)?;
        }
        self.jitter_permille = jitter;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pwm_frequency_khz == 0 || self.pwm_frequency_khz as u32 > MAX_FREQUENCY_KHZ {
            return Err(ConfigError::InvalidFrequency);
        }
        if self.jitter_permille.is_empty() {
            return Err(ConfigError::NoJitterOffsets);
        }
        if self.jitter_permille.iter().any(|&o| o <= -1000) {
            return Err(ConfigError::JitterOutOfRange);
        }
        if self.prime_ratio_den == 0 || self.prime_ratio_num > self.prime_ratio_den {
            return Err(ConfigError::DutyOutOfRange);
        }
        Ok(())
    }
}

/// One-shot debug burst run at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebugConfig {
    /// Run the burst on first boot
    pub enabled: bool,
    /// Number of trials
    pub repetitions: u8,
    /// Fixed calibration pair used for every trial
    pub entry: CalibrationEntry,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repetitions: 11,
            entry: CalibrationEntry::new(200, 40),
        }
    }
}

/// Manual test bench pass-through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BenchConfig {
    /// Length of each burst (ms)
    pub burst_ms: u16,
    /// Fixed duty of the pass-through (0-100%)
    pub duty_percent: u8,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            burst_ms: 10,
            duty_percent: 40,
        }
    }
}

impl BenchConfig {
    /// Raw 0-255 duty value
    pub fn duty_value(&self) -> u8 {
        duty_from_percent(self.duty_percent)
    }
}

/// Serial pulse mode timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialPulseConfig {
    /// Solenoid on-time after the pulse train (ms)
    pub solenoid_on_ms: u16,
    /// Solenoid off-time before halting (ms)
    pub solenoid_off_ms: u16,
}

impl Default for SerialPulseConfig {
    fn default() -> Self {
        Self {
            solenoid_on_ms: 800,
            solenoid_off_ms: 800,
        }
    }
}

/// Halt loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HaltConfig {
    /// Status LED on and off time (ms)
    pub blink_ms: u16,
}

impl Default for HaltConfig {
    fn default() -> Self {
        Self { blink_ms: 500 }
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RigConfig {
    pub mode: OperatingMode,
    /// Profile active at boot
    pub initial_profile: Profile,
    pub channels: ChannelMap,
    pub timing: TimingConfig,
    pub debug: DebugConfig,
    pub bench: BenchConfig,
    pub serial: SerialPulseConfig,
    pub halt: HaltConfig,
}

impl RigConfig {
    /// Check the whole configuration before the rig starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channels.validate()?;
        self.timing.validate()?;
        SWING.validate()?;
        SOLO.validate()?;

        if self.debug.enabled && self.debug.repetitions == 0 {
            return Err(ConfigError::NoDebugRepetitions);
        }
        if self.debug.entry.duty_percent > 100 || self.bench.duty_percent > 100 {
            return Err(ConfigError::DutyOutOfRange);
        }
        Ok(())
    }
}
