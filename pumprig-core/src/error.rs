//! Rig error types
//!
//! Two classes of failure exist. Configuration errors are detected at
//! startup and stop the firmware before any output is energised. Hardware
//! faults are raised by a failing line and halt the rig in a safe state
//! (all outputs inactive).

use core::fmt;

use crate::config::Channel;
use crate::state::{FaultKind, Phase};

/// Invalid configuration, detected before the rig starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// PWM frequency yields a zero-length period (0 kHz or above 1000 kHz)
    InvalidFrequency,
    /// Calibration arrays are not both exactly one entry per step
    TableLength,
    /// Duty percentage above 100
    DutyOutOfRange,
    /// Two channels mapped to the same physical pin
    DuplicatePin(u8),
    /// Jitter sweep has no offsets
    NoJitterOffsets,
    /// Jitter sweep longer than the trial capacity
    TooManyJitterOffsets,
    /// Debug burst enabled with zero repetitions
    NoDebugRepetitions,
    /// Jitter offset at or below -1000 per-mille
    JitterOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFrequency => write!(f, "PWM frequency must be 1-1000 kHz"),
            Self::TableLength => write!(f, "calibration table length mismatch"),
            Self::DutyOutOfRange => write!(f, "duty percentage above 100"),
            Self::DuplicatePin(pin) => write!(f, "pin {pin} mapped twice"),
            Self::NoJitterOffsets => write!(f, "jitter sweep is empty"),
            Self::TooManyJitterOffsets => write!(f, "jitter sweep exceeds trial capacity"),
            Self::NoDebugRepetitions => write!(f, "debug burst has zero repetitions"),
            Self::JitterOutOfRange => write!(f, "jitter offset must be above -1000"),
        }
    }
}

/// A line could not be driven or read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareFault {
    /// Writing an output channel failed
    Write(Channel),
    /// Reading an input channel failed
    Read(Channel),
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(ch) => write!(f, "write to {} failed", ch.name()),
            Self::Read(ch) => write!(f, "read from {} failed", ch.name()),
        }
    }
}

/// Any error the rig can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RigError {
    Config(ConfigError),
    Hardware(HardwareFault),
    /// The sequencer already halted on an earlier fault
    Halted(FaultKind),
    /// An output was about to be energised outside its phase
    Interlock { phase: Phase, channel: Channel },
}

impl fmt::Display for RigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Halted(kind) => write!(f, "halted ({kind:?})"),
            Self::Interlock { phase, channel } => {
                write!(f, "{} not permitted in {phase:?}", channel.name())
            }
        }
    }
}

impl From<ConfigError> for RigError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HardwareFault> for RigError {
    fn from(e: HardwareFault) -> Self {
        Self::Hardware(e)
    }
}
