//! Phase definition
//!
//! What the rig is allowed to energise is a function of the current
//! phase only.

use super::events::Event;
use crate::config::Channel;
use crate::error::{HardwareFault, RigError};

/// Sequencer phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Power-on, outputs being initialised
    Boot,
    /// One-shot debug trials with a fixed calibration pair
    DebugBurst,
    /// Polling the button, nothing energised
    IdleWaitButton,
    /// Button held, counting hold ticks
    DebounceHold,
    /// Motor priming and calibrated burst
    BuildUp,
    /// Solenoid lines held active
    SolenoidEngage,
    /// Manual duty pass-through
    TestBenchPwm,
    /// Host-configured pulse train and solenoid cycle
    PulseTrain,
    /// Fault detected; outputs de-energised, nothing runs
    Halted(FaultKind),
}

/// Reason the rig halted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// An output line could not be written
    LineWrite,
    /// The button line could not be read
    LineRead,
    /// A burst was requested with invalid parameters
    Config,
    /// An output was energised in a phase that does not permit it
    Interlock,
}

impl From<RigError> for FaultKind {
    fn from(e: RigError) -> Self {
        match e {
            RigError::Hardware(HardwareFault::Write(_)) => FaultKind::LineWrite,
            RigError::Hardware(HardwareFault::Read(_)) => FaultKind::LineRead,
            RigError::Config(_) => FaultKind::Config,
            RigError::Interlock { .. } => FaultKind::Interlock,
            RigError::Halted(kind) => kind,
        }
    }
}

impl Phase {
    /// Check if the motor line may be driven in this phase
    pub fn motor_allowed(&self) -> bool {
        matches!(
            self,
            Phase::BuildUp | Phase::DebugBurst | Phase::TestBenchPwm | Phase::PulseTrain
        )
    }

    /// Check if the solenoid lines may be driven in this phase
    pub fn solenoid_allowed(&self) -> bool {
        matches!(
            self,
            Phase::SolenoidEngage | Phase::DebugBurst | Phase::PulseTrain
        )
    }

    /// Check if `channel` may be driven active in this phase
    ///
    /// Driving a line inactive is always permitted.
    pub fn permits(&self, channel: Channel) -> bool {
        match channel {
            Channel::MotorPwm => self.motor_allowed(),
            Channel::SolenoidEnable | Channel::SolenoidPwm => self.solenoid_allowed(),
            Channel::MotorDirection | Channel::StatusLed | Channel::Button => {
                !matches!(self, Phase::Halted(_))
            }
        }
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Phase::*;

        match (self, event) {
            // A halted rig stays halted until power-off
            (Halted(kind), _) => Halted(kind),
            (_, Fault(kind)) => Halted(kind),

            // Boot transitions
            (Boot, DebugRequested) => DebugBurst,
            (Boot, BootComplete) => IdleWaitButton,
            (Boot, BenchRequested) => TestBenchPwm,

            // DebugBurst transitions
            (DebugBurst, DebugFinished) => IdleWaitButton,

            // IdleWaitButton transitions
            (IdleWaitButton, ButtonDown) => DebounceHold,
            (IdleWaitButton, PulseRequested) => PulseTrain,

            // PulseTrain transitions
            (PulseTrain, PulseFinished) => IdleWaitButton,

            // DebounceHold transitions
            (DebounceHold, ShortPress) => BuildUp,
            (DebounceHold, LongPress) => IdleWaitButton,

            // BuildUp transitions
            (BuildUp, BuildUpDone) => SolenoidEngage,

            // SolenoidEngage transitions
            (SolenoidEngage, SolenoidReleased) => BuildUp,
            (SolenoidEngage, SweepFinished) => IdleWaitButton,

            // Default: stay in current phase
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_paths() {
        assert_eq!(Phase::Boot.transition(Event::BootComplete), Phase::IdleWaitButton);
        assert_eq!(Phase::Boot.transition(Event::DebugRequested), Phase::DebugBurst);
        assert_eq!(Phase::Boot.transition(Event::BenchRequested), Phase::TestBenchPwm);
        assert_eq!(
            Phase::DebugBurst.transition(Event::DebugFinished),
            Phase::IdleWaitButton
        );
    }

    #[test]
    fn test_step_flow() {
        let phase = Phase::IdleWaitButton.transition(Event::ButtonDown);
        assert_eq!(phase, Phase::DebounceHold);

        let phase = phase.transition(Event::ShortPress);
        assert_eq!(phase, Phase::BuildUp);

        let phase = phase.transition(Event::BuildUpDone);
        assert_eq!(phase, Phase::SolenoidEngage);

        // Next jitter trial
        let phase = phase.transition(Event::SolenoidReleased);
        assert_eq!(phase, Phase::BuildUp);

        let phase = phase
            .transition(Event::BuildUpDone)
            .transition(Event::SweepFinished);
        assert_eq!(phase, Phase::IdleWaitButton);
    }

    #[test]
    fn test_long_press_skips_build_up() {
        let phase = Phase::DebounceHold.transition(Event::LongPress);
        assert_eq!(phase, Phase::IdleWaitButton);
    }

    #[test]
    fn test_fault_from_any_phase() {
        let phases = [
            Phase::Boot,
            Phase::IdleWaitButton,
            Phase::BuildUp,
            Phase::SolenoidEngage,
            Phase::TestBenchPwm,
        ];

        for phase in phases {
            let next = phase.transition(Event::Fault(FaultKind::LineWrite));
            assert_eq!(next, Phase::Halted(FaultKind::LineWrite));
        }
    }

    #[test]
    fn test_halted_is_terminal() {
        let halted = Phase::Halted(FaultKind::LineRead);
        assert_eq!(halted.transition(Event::BootComplete), halted);
        assert_eq!(halted.transition(Event::Fault(FaultKind::Config)), halted);
        assert!(!halted.permits(Channel::MotorDirection));
    }

    #[test]
    fn test_pulse_train_round_trip() {
        let phase = Phase::IdleWaitButton.transition(Event::PulseRequested);
        assert_eq!(phase, Phase::PulseTrain);
        assert!(phase.permits(Channel::MotorPwm));
        assert!(phase.permits(Channel::SolenoidEnable));
        assert_eq!(phase.transition(Event::PulseFinished), Phase::IdleWaitButton);

        // Only an idle rig accepts a pulse train
        assert_eq!(
            Phase::TestBenchPwm.transition(Event::PulseRequested),
            Phase::TestBenchPwm
        );
    }

    #[test]
    fn test_unexpected_event_ignored() {
        assert_eq!(
            Phase::IdleWaitButton.transition(Event::BuildUpDone),
            Phase::IdleWaitButton
        );
        assert_eq!(Phase::BuildUp.transition(Event::ButtonDown), Phase::BuildUp);
    }

    #[test]
    fn test_output_permissions() {
        assert!(Phase::BuildUp.motor_allowed());
        assert!(!Phase::BuildUp.solenoid_allowed());
        assert!(Phase::SolenoidEngage.solenoid_allowed());
        assert!(!Phase::SolenoidEngage.motor_allowed());
        assert!(!Phase::IdleWaitButton.motor_allowed());
        assert!(!Phase::Halted(FaultKind::Config).motor_allowed());

        assert!(!Phase::IdleWaitButton.permits(Channel::SolenoidPwm));
        assert!(Phase::TestBenchPwm.permits(Channel::MotorPwm));
        assert!(!Phase::TestBenchPwm.permits(Channel::SolenoidEnable));
        assert!(Phase::IdleWaitButton.permits(Channel::StatusLed));
    }
}
