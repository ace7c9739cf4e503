//! Pumprig - Actuator Test Rig Firmware
//!
//! Bit-banged PWM and actuation sequencing for a motor/solenoid test
//! rig on RP2040. Everything runs in the main task and blocks: bursts are
//! timed by busy-waiting, and nothing else competes for the core.
//!
//! The operating mode comes from the embedded rig.toml:
//! - `sequence`: button-stepped calibration sweeps (short press runs the
//!   next step, long press switches profile)
//! - `test_bench`: fixed-duty pass-through, button toggles pause
//! - `serial_pulse`: receive duty and pulse count from a host, run once

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use pumprig_core::config::OperatingMode;
use pumprig_core::sequencer::{BenchOutcome, CycleOutcome, Sequencer, SequencerState};
use pumprig_core::traits::OutputLines;
use pumprig_drivers::eh::EhDelay;
use pumprig_drivers::SoftPwm;
use pumprig_hal::uart::{UartConfig, UartTx};
use pumprig_hal_rp2040::{PinBank, RpUart, UartPeripherals};
use pumprig_protocol::{receive_settings, DONE};

use crate::startup::{RigButton, RigLines};

mod startup;

/// Embedded configuration (compiled into firmware)
/// Edit rig.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../rig.toml");

type Rig<'c> = Sequencer<'c, RigLines, RigButton, SoftPwm<EhDelay<Delay>>, EhDelay<Delay>>;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Pumprig firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (mut bank, uart) = PinBank::from_peripherals(p);
    info!("Peripherals initialized");

    let config = match startup::load_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Embedded configuration rejected: {}", e);
            startup::fallback_halt(&mut bank)
        }
    };

    let (lines, button) = match startup::take_rig(&config, &mut bank) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Rig bring-up failed: {}", e);
            startup::fallback_halt(&mut bank)
        }
    };

    let pwm = SoftPwm::new(EhDelay(Delay));
    let mut rig = match Sequencer::new(&config, lines, button, pwm, EhDelay(Delay)) {
        Ok(rig) => rig,
        Err(e) => {
            error!("Configuration invalid: {}", e);
            startup::fallback_halt(&mut bank)
        }
    };
    let mut state = SequencerState::new(&config);

    match rig.boot(&mut state) {
        Ok(()) => match config.mode {
            OperatingMode::Sequence => run_sequence(&mut rig, &mut state),
            OperatingMode::TestBench => run_bench(&mut rig, &mut state),
            OperatingMode::SerialPulse => run_serial_pulse(&mut rig, &mut state, uart),
        },
        Err(e) => error!("Boot failed: {}", e),
    }

    halt(&mut rig)
}

/// Button-stepped calibration sweeps until a fault
fn run_sequence(rig: &mut Rig<'_>, state: &mut SequencerState) {
    info!("Sequence mode: waiting for button");
    loop {
        match rig.run_cycle(state) {
            Ok(CycleOutcome::ProfileToggled(profile)) => {
                info!("Profile switched to {}, step reset", profile.name());
            }
            Ok(CycleOutcome::StepCompleted { profile, step }) => {
                info!("{} step {} done ({} total)", profile.name(), step, state.completed_steps);
            }
            Err(e) => {
                error!("Sequence halted: {}", e);
                return;
            }
        }
    }
}

/// Test bench pass-through until a fault
fn run_bench(rig: &mut Rig<'_>, state: &mut SequencerState) {
    info!("Test bench mode");
    loop {
        match rig.bench_tick(state) {
            Ok(BenchOutcome::Paused) => info!("Bench paused"),
            Ok(BenchOutcome::Resumed) => info!("Bench resumed"),
            Ok(_) => {}
            Err(e) => {
                error!("Bench halted: {}", e);
                return;
            }
        }
    }
}

/// One host-configured pulse train
fn run_serial_pulse(rig: &mut Rig<'_>, state: &mut SequencerState, uart: UartPeripherals) {
    let mut uart = RpUart::new(uart, UartConfig::default());
    let mut delay = EhDelay(Delay);
    info!("Serial pulse mode: waiting for host");

    let settings = match receive_settings(&mut uart, &mut delay) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Serial session failed: {}", Debug2Format(&e));
            return;
        }
    };
    info!(
        "Host settings: {}% duty, {} pulses",
        settings.duty_percent, settings.pulses
    );

    if let Err(e) = rig.run_pulse_train(state, settings.duty_percent, settings.pulses as u32) {
        error!("Pulse train failed: {}", e);
        return;
    }
    if uart.write_blocking(DONE).is_err() {
        warn!("Could not report completion to host");
    }
}

/// Drive every output inactive and blink the status LED forever
fn halt(rig: &mut Rig<'_>) -> ! {
    info!("Halted");
    if rig.lines_mut().all_off().is_err() {
        warn!("Not every output could be cleared");
    }
    loop {
        if rig.blink().is_err() {
            warn!("Status LED write failed");
        }
    }
}
