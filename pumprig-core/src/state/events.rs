//! Events that trigger phase transitions

use super::machine::FaultKind;

/// Events that can trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// Outputs initialised, no debug burst pending
    BootComplete,
    /// Outputs initialised, debug burst pending
    DebugRequested,
    /// Outputs initialised, rig configured as test bench
    BenchRequested,
    /// All debug trials done
    DebugFinished,

    // Button events
    /// Button went down while idle
    ButtonDown,
    /// Button released before the long-press threshold
    ShortPress,
    /// Button held past the long-press threshold
    LongPress,

    // Sweep events
    /// Priming and calibrated bursts done, settle pause elapsed
    BuildUpDone,
    /// Solenoid released, more jitter trials remain
    SolenoidReleased,
    /// Solenoid released after the last jitter trial
    SweepFinished,

    // Serial pulse events
    /// Host settings received while idle
    PulseRequested,
    /// Pulse train and solenoid cycle done
    PulseFinished,

    // Safety events
    /// A line failed
    Fault(FaultKind),
}
