//! Actuation sequencer
//!
//! Drives one rig through its life: boot, optional debug burst, then
//! either the button-stepped calibration sequence or the test bench.
//! Each calibration step is a jitter sweep; every trial in the sweep is
//! a priming burst, a calibrated burst, a settle pause and a solenoid
//! hold.
//!
//! Any hardware or parameter error de-energises every output, moves the
//! state to `Halted` and is returned to the caller. A halted sequencer
//! refuses further work.

pub mod press;
pub mod state;

pub use press::{Press, PressClassifier, PressUpdate};
pub use state::SequencerState;

use pumprig_hal::BlockingDelay;

use crate::config::{CalibrationEntry, Channel, OperatingMode, Profile, RigConfig};
use crate::error::{ConfigError, HardwareFault, RigError};
use crate::pwm::{PwmRequest, PwmTiming};
use crate::state::{Event, FaultKind, Phase};
use crate::traits::{ModeButton, OutputLines, PwmGenerator};

/// Result of one button-driven cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Long press: profile switched, step reset, nothing actuated
    ProfileToggled(Profile),
    /// Short press: the full jitter sweep for `step` ran
    StepCompleted { profile: Profile, step: usize },
}

/// Result of one test bench tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BenchOutcome {
    /// One pass-through burst emitted
    Burst,
    /// Paused, motor held low
    Idle,
    /// Button press paused the bench
    Paused,
    /// Button press resumed the bench
    Resumed,
}

/// Blocking actuation sequencer
pub struct Sequencer<'c, L, B, P, D> {
    config: &'c RigConfig,
    lines: L,
    button: B,
    pwm: P,
    delay: D,
}

impl<'c, L, B, P, D> Sequencer<'c, L, B, P, D>
where
    L: OutputLines,
    B: ModeButton,
    P: PwmGenerator,
    D: BlockingDelay,
{
    /// Create a sequencer after validating the configuration
    pub fn new(
        config: &'c RigConfig,
        lines: L,
        button: B,
        pwm: P,
        delay: D,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            lines,
            button,
            pwm,
            delay,
        })
    }

    /// Output lines, for callers that drive extra channels between cycles
    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    /// Initialise outputs and run the debug burst if one is pending
    ///
    /// Leaves the state in `IdleWaitButton`, or `TestBenchPwm` when the
    /// rig is configured as a test bench.
    pub fn boot(&mut self, state: &mut SequencerState) -> Result<(), RigError> {
        self.ensure_running(state)?;
        self.guarded(state, |seq, state| {
            seq.lines.all_off()?;
            seq.lines.set_line(Channel::MotorDirection, true)?;

            if seq.config.mode == OperatingMode::TestBench {
                info!("boot: test bench");
                state.apply(Event::BenchRequested);
                return Ok(());
            }

            if state.debug_pending {
                seq.run_debug_burst(state)?;
            } else {
                state.apply(Event::BootComplete);
            }
            info!("boot: profile {}", state.profile.name());
            Ok(())
        })
    }

    /// Run the debug trials if still pending; returns the number run
    ///
    /// The pending flag is cleared after the first run, so later calls
    /// run nothing.
    pub fn run_debug_if_pending(&mut self, state: &mut SequencerState) -> Result<u8, RigError> {
        self.ensure_running(state)?;
        if !state.debug_pending {
            return Ok(0);
        }
        self.guarded(state, |seq, state| seq.run_debug_burst(state))
    }

    /// Wait for one press and act on it
    ///
    /// A short press runs the jitter sweep for the current step and
    /// advances the step. A long press toggles the profile as soon as the
    /// threshold is exceeded, resets the step and actuates nothing.
    pub fn run_cycle(&mut self, state: &mut SequencerState) -> Result<CycleOutcome, RigError> {
        self.ensure_running(state)?;
        self.guarded(state, |seq, state| {
            match seq.poll_press(state)? {
                Press::Long => {
                    state.apply(Event::LongPress);
                    Ok(CycleOutcome::ProfileToggled(state.profile))
                }
                Press::Short => {
                    state.apply(Event::ShortPress);
                    let profile = state.profile;
                    let step = state.step_index;
                    seq.run_sweep(state)?;
                    state.advance_step();
                    Ok(CycleOutcome::StepCompleted { profile, step })
                }
            }
        })
    }

    /// Poll until the button goes down, then classify the press
    ///
    /// The profile toggle happens here, on the tick the long-press
    /// threshold is exceeded. A read fault halts the rig.
    pub fn wait_for_press(&mut self, state: &mut SequencerState) -> Result<Press, RigError> {
        self.ensure_running(state)?;
        self.guarded(state, |seq, state| seq.poll_press(state))
    }

    fn poll_press(&mut self, state: &mut SequencerState) -> Result<Press, RigError> {
        let config = self.config;
        let timing = &config.timing;

        while !self.button.is_pressed()? {
            self.delay.delay_ms(timing.idle_poll_ms as u32);
        }
        state.apply(Event::ButtonDown);
        state.hold_ticks = 0;

        let mut classifier = PressClassifier::new(timing.long_press_ticks);
        loop {
            self.delay.delay_ms(timing.hold_tick_ms as u32);
            let held = self.button.is_pressed()?;
            let update = classifier.sample(held);
            state.hold_ticks = classifier.ticks();

            match update {
                PressUpdate::Holding => {}
                PressUpdate::LongPressReached => {
                    state.toggle_profile();
                    info!("long press: profile {}", state.profile.name());
                }
                PressUpdate::Released(press) => {
                    debug!("press {:?} after {} ticks", press, state.hold_ticks);
                    return Ok(press);
                }
            }
        }
    }

    /// One test bench tick
    ///
    /// A press toggles pause and waits for release. While paused the
    /// motor line is held low; otherwise one pass-through burst runs.
    pub fn bench_tick(&mut self, state: &mut SequencerState) -> Result<BenchOutcome, RigError> {
        self.ensure_running(state)?;
        self.guarded(state, |seq, state| {
            let config = seq.config;
            let poll_ms = config.timing.idle_poll_ms as u32;

            if seq.button.is_pressed()? {
                state.paused = !state.paused;
                while seq.button.is_pressed()? {
                    seq.delay.delay_ms(poll_ms);
                }
                if state.paused {
                    seq.lines.set_line(Channel::MotorPwm, false)?;
                    info!("bench paused");
                    return Ok(BenchOutcome::Paused);
                }
                info!("bench resumed");
                return Ok(BenchOutcome::Resumed);
            }

            if state.paused {
                seq.lines.set_line(Channel::MotorPwm, false)?;
                seq.delay.delay_ms(poll_ms);
                return Ok(BenchOutcome::Idle);
            }

            let request = PwmRequest::new(
                config.bench.burst_ms as u32,
                config.bench.duty_value(),
                config.timing.pwm_frequency_khz,
                Channel::MotorPwm,
            );
            seq.burst(state, &request)?;
            Ok(BenchOutcome::Burst)
        })
    }

    /// Emit `pulses` motor cycles at `duty_percent`, then one solenoid
    /// on/off cycle
    ///
    /// Used by the serial pulse mode once the host has sent its settings.
    /// Only an idle rig accepts a pulse train; it returns to idle after.
    pub fn run_pulse_train(
        &mut self,
        state: &mut SequencerState,
        duty_percent: u8,
        pulses: u32,
    ) -> Result<(), RigError> {
        self.ensure_running(state)?;
        self.guarded(state, |seq, state| {
            let config = seq.config;
            let timing = PwmTiming::for_pulses(config.timing.pwm_frequency_khz, duty_percent, pulses)?;
            enter(state, Event::PulseRequested, Phase::PulseTrain)?;

            seq.set_solenoid(false)?;
            seq.delay.delay_ms(config.timing.idle_poll_ms as u32);

            info!("pulse train: {}% x {}", duty_percent, pulses);
            permit(state, Channel::MotorPwm)?;
            seq.pwm.generate_timing(&mut seq.lines, Channel::MotorPwm, &timing)?;

            seq.energise_solenoid(state)?;
            seq.delay.delay_ms(config.serial.solenoid_on_ms as u32);
            seq.set_solenoid(false)?;
            seq.delay.delay_ms(config.serial.solenoid_off_ms as u32);

            state.apply(Event::PulseFinished);
            Ok(())
        })
    }

    /// One status LED blink period
    ///
    /// Rigs without a status LED just wait out the period.
    pub fn blink(&mut self) -> Result<(), HardwareFault> {
        let blink_ms = self.config.halt.blink_ms as u32;
        if self.lines.has_line(Channel::StatusLed) {
            self.lines.set_line(Channel::StatusLed, true)?;
            self.delay.delay_ms(blink_ms);
            self.lines.set_line(Channel::StatusLed, false)?;
            self.delay.delay_ms(blink_ms);
        } else {
            self.delay.delay_ms(blink_ms * 2);
        }
        Ok(())
    }

    /// De-energise every output and halt
    pub fn halt(&mut self, state: &mut SequencerState, kind: FaultKind) {
        if self.lines.all_off().is_err() {
            warn!("halt: not every output could be cleared");
        }
        state.apply(Event::Fault(kind));
    }

    fn ensure_running(&self, state: &SequencerState) -> Result<(), RigError> {
        match state.phase {
            Phase::Halted(kind) => Err(RigError::Halted(kind)),
            _ => Ok(()),
        }
    }

    fn guarded<T>(
        &mut self,
        state: &mut SequencerState,
        f: impl FnOnce(&mut Self, &mut SequencerState) -> Result<T, RigError>,
    ) -> Result<T, RigError> {
        match f(self, state) {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("fault in {:?}: {}", state.phase, e);
                self.halt(state, FaultKind::from(e));
                Err(e)
            }
        }
    }

    fn run_debug_burst(&mut self, state: &mut SequencerState) -> Result<u8, RigError> {
        let debug = self.config.debug;
        enter(state, Event::DebugRequested, Phase::DebugBurst)?;
        info!("debug burst: {} trials", debug.repetitions);
        for _ in 0..debug.repetitions {
            self.build_up(state, debug.entry, 0)?;
            self.engage_solenoid(state)?;
        }
        state.debug_pending = false;
        state.apply(Event::DebugFinished);
        Ok(debug.repetitions)
    }

    fn run_sweep(&mut self, state: &mut SequencerState) -> Result<(), RigError> {
        let config = self.config;
        let entry = state
            .profile
            .table()
            .entry(state.step_index)
            .ok_or(ConfigError::TableLength)?;
        let offsets = &config.timing.jitter_permille;

        info!(
            "step {} ({}): build-up {} ms, duty {}%",
            state.step_index,
            state.profile.name(),
            entry.build_up_ms,
            entry.duty_percent
        );

        for (index, &offset) in offsets.iter().enumerate() {
            state.jitter_index = index;
            self.build_up(state, entry, offset)?;
            state.apply(Event::BuildUpDone);

            self.engage_solenoid(state)?;
            if index + 1 == offsets.len() {
                state.apply(Event::SweepFinished);
            } else {
                state.apply(Event::SolenoidReleased);
            }
        }
        Ok(())
    }

    /// Priming burst, calibrated burst, settle pause
    fn build_up(
        &mut self,
        state: &SequencerState,
        entry: CalibrationEntry,
        offset_permille: i16,
    ) -> Result<(), RigError> {
        let config = self.config;
        let timing = &config.timing;

        let prime = PwmRequest::new(
            timing.prime_ms as u32,
            timing.prime_duty_value(),
            timing.pwm_frequency_khz,
            Channel::MotorPwm,
        );
        let burst = PwmRequest::new(
            entry.adjusted_build_up_ms(timing.prime_ms, offset_permille),
            entry.duty_value(),
            timing.pwm_frequency_khz,
            Channel::MotorPwm,
        );
        debug!("trial {}: burst {} ms", offset_permille, burst.duration_ms);

        self.burst(state, &prime)?;
        self.burst(state, &burst)?;
        self.delay.delay_ms(timing.settle_ms as u32);
        Ok(())
    }

    fn burst(&mut self, state: &SequencerState, request: &PwmRequest) -> Result<(), RigError> {
        permit(state, request.line)?;
        self.pwm.generate(&mut self.lines, request)
    }

    /// Hold both solenoid lines active, then release
    fn engage_solenoid(&mut self, state: &SequencerState) -> Result<(), RigError> {
        self.energise_solenoid(state)?;
        self.delay.delay_ms(self.config.timing.solenoid_hold_ms as u32);
        self.set_solenoid(false)?;
        Ok(())
    }

    fn energise_solenoid(&mut self, state: &SequencerState) -> Result<(), RigError> {
        permit(state, Channel::SolenoidEnable)?;
        self.set_solenoid(true)
    }

    fn set_solenoid(&mut self, active: bool) -> Result<(), RigError> {
        self.lines.set_line(Channel::SolenoidEnable, active)?;
        self.lines.set_line(Channel::SolenoidPwm, active)?;
        Ok(())
    }
}

/// Apply `event`, failing unless it moved the rig into `phase`
///
/// The motor is the first line either entered phase energises.
fn enter(state: &mut SequencerState, event: Event, phase: Phase) -> Result<(), RigError> {
    state.apply(event);
    if state.phase == phase {
        Ok(())
    } else {
        Err(RigError::Interlock {
            phase: state.phase,
            channel: Channel::MotorPwm,
        })
    }
}

/// Refuse to energise a line the current phase does not allow
fn permit(state: &SequencerState, channel: Channel) -> Result<(), RigError> {
    if state.phase.permits(channel) {
        Ok(())
    } else {
        Err(RigError::Interlock {
            phase: state.phase,
            channel,
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::vec::Vec;

    use super::*;
    use crate::config::{SOLO, STEP_COUNT, SWING};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Record {
        Line(Channel, bool),
        Burst {
            duration_ms: u32,
            duty: u8,
            frequency_khz: u16,
            line: Channel,
        },
        Pulses {
            line: Channel,
            cycles: u32,
            on_us: u32,
        },
        Delay(u32),
    }

    type Log = Rc<RefCell<Vec<Record>>>;

    struct FakeLines {
        log: Log,
        status_led: bool,
        fail_on: Option<Channel>,
    }

    impl OutputLines for FakeLines {
        fn set_line(&mut self, channel: Channel, active: bool) -> Result<(), HardwareFault> {
            if active && self.fail_on == Some(channel) {
                return Err(HardwareFault::Write(channel));
            }
            self.log.borrow_mut().push(Record::Line(channel, active));
            Ok(())
        }

        fn has_line(&self, channel: Channel) -> bool {
            channel != Channel::StatusLed || self.status_led
        }
    }

    /// Replays a scripted sequence of button samples, then reports a
    /// read fault so a short script can never hang a test
    struct FakeButton {
        script: VecDeque<bool>,
    }

    impl ModeButton for FakeButton {
        fn is_pressed(&mut self) -> Result<bool, HardwareFault> {
            self.script
                .pop_front()
                .ok_or(HardwareFault::Read(Channel::Button))
        }
    }

    struct FakePwm {
        log: Log,
    }

    impl PwmGenerator for FakePwm {
        fn generate<L: OutputLines + ?Sized>(
            &mut self,
            _lines: &mut L,
            request: &PwmRequest,
        ) -> Result<(), RigError> {
            PwmTiming::for_request(request)?;
            self.log.borrow_mut().push(Record::Burst {
                duration_ms: request.duration_ms,
                duty: request.duty,
                frequency_khz: request.frequency_khz,
                line: request.line,
            });
            Ok(())
        }

        fn generate_timing<L: OutputLines + ?Sized>(
            &mut self,
            _lines: &mut L,
            line: Channel,
            timing: &PwmTiming,
        ) -> Result<(), RigError> {
            self.log.borrow_mut().push(Record::Pulses {
                line,
                cycles: timing.cycles,
                on_us: timing.on_us,
            });
            Ok(())
        }
    }

    struct FakeDelay {
        log: Log,
    }

    impl BlockingDelay for FakeDelay {
        fn delay_us(&mut self, _us: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(Record::Delay(ms));
        }
    }

    type TestSequencer<'c> = Sequencer<'c, FakeLines, FakeButton, FakePwm, FakeDelay>;

    /// Idle poll, press detected, `held` hold ticks, release
    fn press(script: &mut Vec<bool>, held: usize) {
        script.push(false);
        script.push(true);
        script.extend(core::iter::repeat(true).take(held));
        script.push(false);
    }

    fn rig<'c>(config: &'c RigConfig, script: Vec<bool>) -> (TestSequencer<'c>, Log) {
        rig_with_lines(config, script, None)
    }

    fn rig_with_lines<'c>(
        config: &'c RigConfig,
        script: Vec<bool>,
        fail_on: Option<Channel>,
    ) -> (TestSequencer<'c>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sequencer = Sequencer::new(
            config,
            FakeLines {
                log: log.clone(),
                status_led: true,
                fail_on,
            },
            FakeButton {
                script: script.into_iter().collect(),
            },
            FakePwm { log: log.clone() },
            FakeDelay { log: log.clone() },
        )
        .unwrap();
        (sequencer, log)
    }

    fn bursts(log: &Log) -> Vec<(u32, u8)> {
        log.borrow()
            .iter()
            .filter_map(|r| match *r {
                Record::Burst {
                    duration_ms, duty, ..
                } => Some((duration_ms, duty)),
                _ => None,
            })
            .collect()
    }

    /// Records with the button polling delays removed
    fn actuation(log: &Log, config: &RigConfig) -> Vec<Record> {
        let idle = config.timing.idle_poll_ms as u32;
        let hold = config.timing.hold_tick_ms as u32;
        log.borrow()
            .iter()
            .copied()
            .filter(|r| !matches!(*r, Record::Delay(ms) if ms == idle || ms == hold))
            .collect()
    }

    fn solenoid_engagements(log: &Log) -> usize {
        log.borrow()
            .iter()
            .filter(|r| **r == Record::Line(Channel::SolenoidEnable, true))
            .count()
    }

    #[test]
    fn test_boot_clears_outputs_and_sets_direction() {
        let config = RigConfig::default();
        let (mut seq, log) = rig(&config, Vec::new());
        let mut state = SequencerState::new(&config);

        seq.boot(&mut state).unwrap();

        let records = log.borrow();
        for (record, channel) in records.iter().zip(Channel::OUTPUTS) {
            assert_eq!(*record, Record::Line(channel, false));
        }
        assert_eq!(
            records[Channel::OUTPUTS.len()],
            Record::Line(Channel::MotorDirection, true)
        );
        assert_eq!(state.phase, Phase::IdleWaitButton);
        assert!(bursts(&log).is_empty());
    }

    #[test]
    fn test_short_press_runs_jitter_sweep() {
        let config = RigConfig::default();
        let mut script = Vec::new();
        press(&mut script, 2);
        let (mut seq, log) = rig(&config, script);
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        log.borrow_mut().clear();

        let outcome = seq.run_cycle(&mut state).unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::StepCompleted {
                profile: Profile::Swing,
                step: 0
            }
        );
        assert_eq!(state.step_index, 1);
        assert_eq!(state.hold_ticks, 2);
        assert_eq!(state.phase, Phase::IdleWaitButton);

        // Swing step 0: 200 ms at 40%; (200 - 35) * (1000 + offset) / 1000
        let expected: Vec<(u32, u8)> = [145, 151, 158, 165, 171, 178, 184]
            .iter()
            .flat_map(|&ms| [(35, 95), (ms, 102)])
            .collect();
        assert_eq!(bursts(&log), expected);
        assert_eq!(solenoid_engagements(&log), 7);
    }

    #[test]
    fn test_trial_order() {
        let config = RigConfig::default();
        let mut script = Vec::new();
        press(&mut script, 1);
        let (mut seq, log) = rig(&config, script);
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        log.borrow_mut().clear();

        seq.run_cycle(&mut state).unwrap();

        let records = actuation(&log, &config);
        assert_eq!(
            &records[..8],
            &[
                Record::Burst {
                    duration_ms: 35,
                    duty: 95,
                    frequency_khz: 20,
                    line: Channel::MotorPwm,
                },
                Record::Burst {
                    duration_ms: 145,
                    duty: 102,
                    frequency_khz: 20,
                    line: Channel::MotorPwm,
                },
                Record::Delay(50),
                Record::Line(Channel::SolenoidEnable, true),
                Record::Line(Channel::SolenoidPwm, true),
                Record::Delay(300),
                Record::Line(Channel::SolenoidEnable, false),
                Record::Line(Channel::SolenoidPwm, false),
            ]
        );
        assert_eq!(records.len(), 8 * 7);

        // Every priming and calibrated burst runs at 20 kHz on the motor line
        let burst_lines: Vec<(u16, Channel)> = records
            .iter()
            .filter_map(|r| match *r {
                Record::Burst {
                    frequency_khz,
                    line,
                    ..
                } => Some((frequency_khz, line)),
                _ => None,
            })
            .collect();
        assert_eq!(burst_lines.len(), 14);
        assert!(burst_lines.iter().all(|&b| b == (20, Channel::MotorPwm)));
    }

    #[test]
    fn test_steps_walk_table_and_wrap() {
        let config = RigConfig::default();
        let mut script = Vec::new();
        for _ in 0..STEP_COUNT + 1 {
            press(&mut script, 1);
        }
        let (mut seq, log) = rig(&config, script);
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();

        for step in 0..STEP_COUNT {
            log.borrow_mut().clear();
            let outcome = seq.run_cycle(&mut state).unwrap();
            assert_eq!(
                outcome,
                CycleOutcome::StepCompleted {
                    profile: Profile::Swing,
                    step
                }
            );

            // Fourth calibrated burst is the zero offset trial
            let entry = SWING.entry(step).unwrap();
            let calibrated = bursts(&log)[7];
            assert_eq!(calibrated.0, (entry.build_up_ms - 35) as u32);
            assert_eq!(calibrated.1, entry.duty_value());
        }

        let outcome = seq.run_cycle(&mut state).unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::StepCompleted {
                profile: Profile::Swing,
                step: 0
            }
        );
        assert_eq!(state.completed_steps, STEP_COUNT as u32 + 1);
    }

    #[test]
    fn test_long_press_toggles_profile_without_actuation() {
        let config = RigConfig::default();
        let mut script = Vec::new();
        press(&mut script, 1);
        press(&mut script, 1);
        press(&mut script, 11);
        press(&mut script, 1);
        let (mut seq, log) = rig(&config, script);
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();

        seq.run_cycle(&mut state).unwrap();
        seq.run_cycle(&mut state).unwrap();
        assert_eq!(state.step_index, 2);

        log.borrow_mut().clear();
        let outcome = seq.run_cycle(&mut state).unwrap();
        assert_eq!(outcome, CycleOutcome::ProfileToggled(Profile::Solo));
        assert_eq!(state.step_index, 0);
        assert_eq!(state.phase, Phase::IdleWaitButton);
        assert!(bursts(&log).is_empty());
        assert_eq!(solenoid_engagements(&log), 0);

        // Solo step 0: 150 ms at 30%
        log.borrow_mut().clear();
        seq.run_cycle(&mut state).unwrap();
        let entry = SOLO.entry(0).unwrap();
        assert_eq!(bursts(&log)[7], (115, entry.duty_value()));
        assert_eq!(entry.duty_value(), 76);
    }

    #[test]
    fn test_ten_ticks_is_still_short() {
        let config = RigConfig::default();
        let mut script = Vec::new();
        press(&mut script, 10);
        let (mut seq, _log) = rig(&config, script);
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();

        let outcome = seq.run_cycle(&mut state).unwrap();
        assert!(matches!(outcome, CycleOutcome::StepCompleted { .. }));
        assert_eq!(state.profile, Profile::Swing);
    }

    #[test]
    fn test_debug_burst_runs_once() {
        let mut config = RigConfig::default();
        config.debug.enabled = true;
        let (mut seq, log) = rig(&config, Vec::new());
        let mut state = SequencerState::new(&config);

        seq.boot(&mut state).unwrap();
        assert_eq!(state.phase, Phase::IdleWaitButton);
        assert!(!state.debug_pending);

        let all = bursts(&log);
        assert_eq!(all.len(), 22);
        assert!(all.chunks(2).all(|pair| pair == [(35, 95), (165, 102)]));
        assert_eq!(solenoid_engagements(&log), 11);

        log.borrow_mut().clear();
        assert_eq!(seq.run_debug_if_pending(&mut state), Ok(0));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_bench_pause_toggle() {
        let mut config = RigConfig::default();
        config.mode = OperatingMode::TestBench;
        let script = std::vec![
            false, // burst
            true, true, false, // press, held, released
            false, // idle while paused
            true, false, // resume
            false, // burst
        ];
        let (mut seq, log) = rig(&config, script);
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        assert_eq!(state.phase, Phase::TestBenchPwm);
        log.borrow_mut().clear();

        assert_eq!(seq.bench_tick(&mut state), Ok(BenchOutcome::Burst));
        assert_eq!(
            *log.borrow(),
            [Record::Burst {
                duration_ms: 10,
                duty: 102,
                frequency_khz: 20,
                line: Channel::MotorPwm,
            }]
        );

        assert_eq!(seq.bench_tick(&mut state), Ok(BenchOutcome::Paused));
        assert!(state.paused);

        log.borrow_mut().clear();
        assert_eq!(seq.bench_tick(&mut state), Ok(BenchOutcome::Idle));
        assert_eq!(
            *log.borrow(),
            [Record::Line(Channel::MotorPwm, false), Record::Delay(10)]
        );

        assert_eq!(seq.bench_tick(&mut state), Ok(BenchOutcome::Resumed));
        assert!(!state.paused);

        log.borrow_mut().clear();
        assert_eq!(seq.bench_tick(&mut state), Ok(BenchOutcome::Burst));
        assert_eq!(bursts(&log).len(), 1);
    }

    #[test]
    fn test_write_fault_halts_with_outputs_low() {
        let config = RigConfig::default();
        let mut script = Vec::new();
        press(&mut script, 1);
        press(&mut script, 1);
        let (mut seq, log) =
            rig_with_lines(&config, script, Some(Channel::SolenoidEnable));
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();

        let err = seq.run_cycle(&mut state).unwrap_err();
        assert_eq!(
            err,
            RigError::Hardware(HardwareFault::Write(Channel::SolenoidEnable))
        );
        assert_eq!(state.phase, Phase::Halted(FaultKind::LineWrite));

        let records = log.borrow().clone();
        let tail = &records[records.len() - Channel::OUTPUTS.len()..];
        for (record, channel) in tail.iter().zip(Channel::OUTPUTS) {
            assert_eq!(*record, Record::Line(channel, false));
        }

        // Halted rigs refuse further work
        log.borrow_mut().clear();
        assert_eq!(
            seq.run_cycle(&mut state),
            Err(RigError::Halted(FaultKind::LineWrite))
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_read_fault_halts() {
        let config = RigConfig::default();
        let (mut seq, _log) = rig(&config, Vec::new());
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();

        assert_eq!(
            seq.run_cycle(&mut state),
            Err(RigError::Hardware(HardwareFault::Read(Channel::Button)))
        );
        assert_eq!(state.phase, Phase::Halted(FaultKind::LineRead));
    }

    #[test]
    fn test_wait_for_press_read_fault_halts_with_outputs_low() {
        let config = RigConfig::default();
        let (mut seq, log) = rig(&config, Vec::new());
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        log.borrow_mut().clear();

        assert_eq!(
            seq.wait_for_press(&mut state),
            Err(RigError::Hardware(HardwareFault::Read(Channel::Button)))
        );
        assert_eq!(state.phase, Phase::Halted(FaultKind::LineRead));

        let records = log.borrow();
        assert_eq!(records.len(), Channel::OUTPUTS.len());
        for (record, channel) in records.iter().zip(Channel::OUTPUTS) {
            assert_eq!(*record, Record::Line(channel, false));
        }
    }

    #[test]
    fn test_wait_for_press_refused_when_halted() {
        let config = RigConfig::default();
        let mut script = Vec::new();
        press(&mut script, 11);
        let (mut seq, log) = rig(&config, script);
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        seq.halt(&mut state, FaultKind::LineWrite);
        log.borrow_mut().clear();

        assert_eq!(
            seq.wait_for_press(&mut state),
            Err(RigError::Halted(FaultKind::LineWrite))
        );
        assert_eq!(state.profile, Profile::Swing);
        assert_eq!(state.phase, Phase::Halted(FaultKind::LineWrite));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_pulse_train() {
        let config = RigConfig::default();
        let (mut seq, log) = rig(&config, Vec::new());
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        log.borrow_mut().clear();

        seq.run_pulse_train(&mut state, 50, 100).unwrap();

        assert_eq!(
            *log.borrow(),
            [
                Record::Line(Channel::SolenoidEnable, false),
                Record::Line(Channel::SolenoidPwm, false),
                Record::Delay(10),
                Record::Pulses {
                    line: Channel::MotorPwm,
                    cycles: 100,
                    on_us: 25
                },
                Record::Line(Channel::SolenoidEnable, true),
                Record::Line(Channel::SolenoidPwm, true),
                Record::Delay(800),
                Record::Line(Channel::SolenoidEnable, false),
                Record::Line(Channel::SolenoidPwm, false),
                Record::Delay(800),
            ]
        );
    }

    #[test]
    fn test_pulse_train_passes_through_its_phase() {
        let mut config = RigConfig::default();
        config.mode = OperatingMode::SerialPulse;
        let (mut seq, _log) = rig(&config, Vec::new());
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        assert_eq!(state.phase, Phase::IdleWaitButton);

        seq.run_pulse_train(&mut state, 50, 10).unwrap();
        assert_eq!(state.phase, Phase::IdleWaitButton);
    }

    #[test]
    fn test_pulse_train_refused_outside_idle() {
        let mut config = RigConfig::default();
        config.mode = OperatingMode::TestBench;
        let (mut seq, log) = rig(&config, Vec::new());
        let mut state = SequencerState::new(&config);
        seq.boot(&mut state).unwrap();
        log.borrow_mut().clear();

        assert_eq!(
            seq.run_pulse_train(&mut state, 50, 10),
            Err(RigError::Interlock {
                phase: Phase::TestBenchPwm,
                channel: Channel::MotorPwm,
            })
        );
        assert_eq!(state.phase, Phase::Halted(FaultKind::Interlock));
        assert!(log
            .borrow()
            .iter()
            .all(|r| matches!(*r, Record::Line(_, false))));
    }

    #[test]
    fn test_blink() {
        let config = RigConfig::default();
        let (mut seq, log) = rig(&config, Vec::new());

        seq.blink().unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Record::Line(Channel::StatusLed, true),
                Record::Delay(500),
                Record::Line(Channel::StatusLed, false),
                Record::Delay(500),
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RigConfig::default();
        config.timing.pwm_frequency_khz = 0;
        let log: Log = Rc::new(RefCell::new(Vec::new()));

        let result = Sequencer::new(
            &config,
            FakeLines {
                log: log.clone(),
                status_led: false,
                fail_on: None,
            },
            FakeButton {
                script: VecDeque::new(),
            },
            FakePwm { log: log.clone() },
            FakeDelay { log },
        );
        assert_eq!(result.err(), Some(ConfigError::InvalidFrequency));
    }
}
