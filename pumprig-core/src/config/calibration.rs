//! Calibration profiles
//!
//! Each profile is a pair of parallel tables with one entry per step:
//! the motor build-up time and the motor duty percentage. Steps 0-8
//! form the stimulation segment, steps 9-17 the expression segment.
//!
//! The tables are compile-time constants and never change while the rig
//! runs. Only the selection of the active profile is mutable.

use crate::error::ConfigError;
use crate::pwm::duty_from_percent;

/// Number of calibration steps per profile
pub const STEP_COUNT: usize = 18;

/// First step of the expression segment
pub const EXPRESSION_START: usize = 9;

/// Logical half of a profile a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Segment {
    /// Steps 0-8
    Stimulation,
    /// Steps 9-17
    Expression,
}

impl Segment {
    /// Segment of a step index
    pub const fn of_step(step: usize) -> Self {
        if step < EXPRESSION_START {
            Segment::Stimulation
        } else {
            Segment::Expression
        }
    }
}

/// One calibration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationEntry {
    /// Motor build-up time before solenoid engagement (ms)
    pub build_up_ms: u16,
    /// Motor duty cycle (0-100%)
    pub duty_percent: u8,
}

impl CalibrationEntry {
    /// Create a new entry
    pub const fn new(build_up_ms: u16, duty_percent: u8) -> Self {
        Self {
            build_up_ms,
            duty_percent,
        }
    }

    /// Raw 0-255 duty value for the PWM generator
    pub fn duty_value(&self) -> u8 {
        duty_from_percent(self.duty_percent)
    }

    /// Duration of the calibrated burst for one jitter trial
    ///
    /// `(build_up - prime) * (1000 + offset) / 1000`, truncated. The
    /// priming burst is part of the build-up, so its time is removed
    /// first. A build-up shorter than the prime yields zero.
    pub fn adjusted_build_up_ms(&self, prime_ms: u16, offset_permille: i16) -> u32 {
        let base = self.build_up_ms.saturating_sub(prime_ms) as i32;
        let scaled = base * (1000 + offset_permille as i32) / 1000;
        scaled.max(0) as u32
    }
}

/// Parallel build-up and duty tables for one profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTable {
    pub build_up_ms: [u16; STEP_COUNT],
    pub duty_percent: [u8; STEP_COUNT],
}

impl CalibrationTable {
    /// Build a table from runtime slices
    ///
    /// Both slices must hold exactly [`STEP_COUNT`] entries.
    pub fn from_slices(build_up_ms: &[u16], duty_percent: &[u8]) -> Result<Self, ConfigError> {
        if build_up_ms.len() != STEP_COUNT || duty_percent.len() != STEP_COUNT {
            return Err(ConfigError::TableLength);
        }

        let mut table = Self {
            build_up_ms: [0; STEP_COUNT],
            duty_percent: [0; STEP_COUNT],
        };
        table.build_up_ms.copy_from_slice(build_up_ms);
        table.duty_percent.copy_from_slice(duty_percent);
        table.validate()?;
        Ok(table)
    }

    /// Entry for a step, `None` past the end of the table
    pub fn entry(&self, step: usize) -> Option<CalibrationEntry> {
        let build_up_ms = *self.build_up_ms.get(step)?;
        let duty_percent = *self.duty_percent.get(step)?;
        Some(CalibrationEntry {
            build_up_ms,
            duty_percent,
        })
    }

    /// Check every duty percentage is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duty_percent.iter().any(|&d| d > 100) {
            return Err(ConfigError::DutyOutOfRange);
        }
        Ok(())
    }
}

/// Swing pump profile
pub const SWING: CalibrationTable = CalibrationTable {
    build_up_ms: [
        // Stimulation
        200, 215, 230, 245, 260, 275, 290, 305, 320,
        // Expression
        340, 360, 380, 400, 420, 440, 460, 480, 500,
    ],
    duty_percent: [
        40, 42, 44, 46, 48, 50, 52, 54, 56,
        60, 62, 64, 66, 68, 70, 72, 74, 76,
    ],
};

/// Solo pump profile
pub const SOLO: CalibrationTable = CalibrationTable {
    build_up_ms: [
        150, 160, 170, 180, 190, 200, 210, 220, 230,
        250, 265, 280, 295, 310, 325, 340, 355, 370,
    ],
    duty_percent: [
        30, 32, 34, 36, 38, 40, 42, 44, 46,
        50, 52, 54, 56, 58, 60, 62, 64, 66,
    ],
};

/// Active calibration profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    #[default]
    Swing,
    Solo,
}

impl Profile {
    /// Profile from the legacy pump mode bit (0 = swing, 1 = solo)
    pub const fn from_mode_bit(bit: u8) -> Self {
        if bit == 0 {
            Profile::Swing
        } else {
            Profile::Solo
        }
    }

    /// Legacy pump mode bit
    pub const fn mode_bit(&self) -> u8 {
        match self {
            Profile::Swing => 0,
            Profile::Solo => 1,
        }
    }

    /// The other profile
    pub const fn toggled(&self) -> Self {
        match self {
            Profile::Swing => Profile::Solo,
            Profile::Solo => Profile::Swing,
        }
    }

    /// Immutable calibration table for this profile
    pub const fn table(&self) -> &'static CalibrationTable {
        match self {
            Profile::Swing => &SWING,
            Profile::Solo => &SOLO,
        }
    }

    /// Look up a profile by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "swing" => Some(Profile::Swing),
            "solo" => Some(Profile::Solo),
            _ => None,
        }
    }

    /// Profile name for logs and config
    pub const fn name(&self) -> &'static str {
        match self {
            Profile::Swing => "swing",
            Profile::Solo => "solo",
        }
    }
}
