//! Rig bring-up
//!
//! Parses the embedded configuration, claims pins by number and builds
//! the drivers. Nothing here energises an output.

use defmt::*;
use embassy_time::Delay;

use pumprig_core::config::{parse_config, ParseError, RigConfig};
use pumprig_core::error::{ConfigError, HardwareFault};
use pumprig_drivers::eh::EhDelay;
use pumprig_drivers::{GpioButton, LinePins, PinLines};
use pumprig_hal::{BlockingDelay, OutputPin};
use pumprig_hal_rp2040::{PinBank, PinError, RpInput, RpOutput};

pub type RigLines = PinLines<RpOutput>;
pub type RigButton = GpioButton<RpInput>;

/// Anything that stops the rig from coming up
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    Parse(ParseError),
    Config(ConfigError),
    Pin(PinError),
    Hardware(HardwareFault),
}

impl From<ParseError> for StartupError {
    fn from(e: ParseError) -> Self {
        StartupError::Parse(e)
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        StartupError::Config(e)
    }
}

impl From<PinError> for StartupError {
    fn from(e: PinError) -> Self {
        StartupError::Pin(e)
    }
}

impl From<HardwareFault> for StartupError {
    fn from(e: HardwareFault) -> Self {
        StartupError::Hardware(e)
    }
}

/// Parse and validate the embedded rig.toml
pub fn load_config(input: &str) -> Result<RigConfig, StartupError> {
    let config = parse_config(input)?;
    config.validate()?;

    info!(
        "Config: mode={}, profile={}, {} kHz, {} jitter trials",
        config.mode,
        config.initial_profile.name(),
        config.timing.pwm_frequency_khz,
        config.timing.jitter_permille.len()
    );
    Ok(config)
}

/// Claim the rig pins and build the line and button drivers
pub fn take_rig(config: &RigConfig, bank: &mut PinBank) -> Result<(RigLines, RigButton), StartupError> {
    let map = &config.channels;

    let status_led = match map.status_led {
        Some(pin) => Some(bank.output(pin)?),
        None => None,
    };
    let pins = LinePins {
        motor_pwm: bank.output(map.motor_pwm)?,
        motor_direction: bank.output(map.motor_direction)?,
        solenoid_enable: bank.output(map.solenoid_enable)?,
        solenoid_pwm: bank.output(map.solenoid_pwm)?,
        status_led,
    };
    let lines = PinLines::new(map, pins)?;
    let button = GpioButton::new(bank.input(map.button)?, map.button);

    debug!("Pins claimed, outputs inactive");
    Ok((lines, button))
}

/// Halt before the rig exists
///
/// Blinks the default status LED if it is still unclaimed.
pub fn fallback_halt(bank: &mut PinBank) -> ! {
    let defaults = RigConfig::default();
    let blink_ms = defaults.halt.blink_ms as u32;
    let mut delay = EhDelay(Delay);

    let mut led = defaults
        .channels
        .status_led
        .and_then(|pin| bank.output(pin).ok());
    if led.is_none() {
        warn!("No status LED available for the halt loop");
    }

    loop {
        if let Some(led) = led.as_mut() {
            let _ = led.set_high();
            delay.delay_ms(blink_ms);
            let _ = led.set_low();
        } else {
            delay.delay_ms(blink_ms);
        }
        delay.delay_ms(blink_ms);
    }
}
