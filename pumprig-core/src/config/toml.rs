//! Minimal TOML parser for `rig.toml`
//!
//! Handles only the subset the rig configuration needs. It does NOT
//! support full TOML.
//!
//! Supported features:
//! - `[section]` headers
//! - Key = value pairs (string, integer, boolean)
//! - Single-line integer arrays: `jitter_permille = [-120, 0, 120]`
//! - Comments (# ...)
//!
//! Keys a section does not know are ignored, so older firmware accepts
//! newer files. Unknown sections and malformed values are errors.

use core::fmt;
use core::str::FromStr;

use super::calibration::{CalibrationEntry, Profile};
use super::hardware::{Channel, PinConfig};
use super::types::{OperatingMode, RigConfig, MAX_JITTER_TRIALS};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header (line number)
    InvalidSection(u16),
    /// Value of the wrong type or out of range (line number)
    InvalidValue(u16),
    /// Array longer than the jitter sweep capacity (line number)
    TooManyItems(u16),
    /// Malformed pin string (line number)
    InvalidPin(u16),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSection(line) => write!(f, "line {line}: unknown section"),
            Self::InvalidValue(line) => write!(f, "line {line}: invalid value"),
            Self::TooManyItems(line) => write!(f, "line {line}: too many items"),
            Self::InvalidPin(line) => write!(f, "line {line}: invalid pin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Rig,
    Pins,
    Timing,
    Debug,
    Bench,
    Serial,
    Halt,
}

/// Parse `rig.toml` on top of the default configuration
///
/// The result is not validated; call [`RigConfig::validate`] before use.
pub fn parse_config(input: &str) -> Result<RigConfig, ParseError> {
    let mut config = RigConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line_no = (index + 1).min(u16::MAX as usize) as u16;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ParseError::InvalidSection(line_no))?;
            continue;
        }

        let Some((key, value)) = parse_key_value(line) else {
            return Err(ParseError::InvalidValue(line_no));
        };

        let result = match section {
            Section::Root => Ok(()),
            Section::Rig => apply_rig(&mut config, key, value),
            Section::Pins => apply_pin(&mut config, key, value),
            Section::Timing => apply_timing(&mut config, key, value),
            Section::Debug => apply_debug(&mut config, key, value),
            Section::Bench => apply_bench(&mut config, key, value),
            Section::Serial => apply_serial(&mut config, key, value),
            Section::Halt => apply_halt(&mut config, key, value),
        };
        result.map_err(|kind| kind.at(line_no))?;
    }

    Ok(config)
}

/// Error kind before the line number is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Value,
    TooMany,
    Pin,
}

impl Kind {
    fn at(self, line: u16) -> ParseError {
        match self {
            Kind::Value => ParseError::InvalidValue(line),
            Kind::TooMany => ParseError::TooManyItems(line),
            Kind::Pin => ParseError::InvalidPin(line),
        }
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "rig" => Some(Section::Rig),
        "pins" => Some(Section::Pins),
        "timing" => Some(Section::Timing),
        "debug" => Some(Section::Debug),
        "bench" => Some(Section::Bench),
        "serial" => Some(Section::Serial),
        "halt" => Some(Section::Halt),
        _ => None,
    }
}

fn apply_rig(config: &mut RigConfig, key: &str, value: &str) -> Result<(), Kind> {
    match key {
        "mode" => {
            config.mode = OperatingMode::from_name(parse_string(value)).ok_or(Kind::Value)?;
        }
        "profile" => {
            config.initial_profile = Profile::from_name(parse_string(value)).ok_or(Kind::Value)?;
        }
        _ => {}
    }
    Ok(())
}

fn apply_pin(config: &mut RigConfig, key: &str, value: &str) -> Result<(), Kind> {
    let Some(channel) = Channel::from_name(key) else {
        return Ok(());
    };

    let value = parse_string(value);
    if channel == Channel::StatusLed && value == "none" {
        config.channels.status_led = None;
        return Ok(());
    }

    let pin = parse_pin(value).ok_or(Kind::Pin)?;
    config.channels.set(channel, pin);
    Ok(())
}

fn apply_timing(config: &mut RigConfig, key: &str, value: &str) -> Result<(), Kind> {
    let timing = &mut config.timing;
    match key {
        "pwm_frequency_khz" => timing.pwm_frequency_khz = parse_int(value)?,
        "prime_ms" => timing.prime_ms = parse_int(value)?,
        "prime_ratio_num" => timing.prime_ratio_num = parse_int(value)?,
        "prime_ratio_den" => timing.prime_ratio_den = parse_int(value)?,
        "settle_ms" => timing.settle_ms = parse_int(value)?,
        "solenoid_hold_ms" => timing.solenoid_hold_ms = parse_int(value)?,
        "idle_poll_ms" => timing.idle_poll_ms = parse_int(value)?,
        "hold_tick_ms" => timing.hold_tick_ms = parse_int(value)?,
        "long_press_ticks" => timing.long_press_ticks = parse_int(value)?,
        "jitter_permille" => {
            let mut offsets = [0i16; MAX_JITTER_TRIALS];
            let count = parse_int_array(value, &mut offsets)?;
            timing
                .set_jitter(&offsets[..count])
                .map_err(|_| Kind::TooMany)?;
        }
        _ => {}
    }
    Ok(())
}

fn apply_debug(config: &mut RigConfig, key: &str, value: &str) -> Result<(), Kind> {
    let debug = &mut config.debug;
    match key {
        "enabled" => debug.enabled = parse_bool(value)?,
        "repetitions" => debug.repetitions = parse_int(value)?,
        "build_up_ms" => {
            debug.entry = CalibrationEntry::new(parse_int(value)?, debug.entry.duty_percent)
        }
        "duty_percent" => {
            debug.entry = CalibrationEntry::new(debug.entry.build_up_ms, parse_int(value)?)
        }
        _ => {}
    }
    Ok(())
}

fn apply_bench(config: &mut RigConfig, key: &str, value: &str) -> Result<(), Kind> {
    match key {
        "burst_ms" => config.bench.burst_ms = parse_int(value)?,
        "duty_percent" => config.bench.duty_percent = parse_int(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_serial(config: &mut RigConfig, key: &str, value: &str) -> Result<(), Kind> {
    match key {
        "solenoid_on_ms" => config.serial.solenoid_on_ms = parse_int(value)?,
        "solenoid_off_ms" => config.serial.solenoid_off_ms = parse_int(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_halt(config: &mut RigConfig, key: &str, value: &str) -> Result<(), Kind> {
    if key == "blink_ms" {
        config.halt.blink_ms = parse_int(value)?;
    }
    Ok(())
}

/// Split a line into key and value, dropping an inline comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    let value = match value.find('#') {
        // Make sure # is not inside a string
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Strip quotes from a string value; bare words are accepted too
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_int<T: FromStr>(value: &str) -> Result<T, Kind> {
    value.parse().map_err(|_| Kind::Value)
}

fn parse_bool(value: &str) -> Result<bool, Kind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Kind::Value),
    }
}

/// Parse `[a, b, c]` into `out`, returning the item count
fn parse_int_array<T: FromStr>(value: &str, out: &mut [T]) -> Result<usize, Kind> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(Kind::Value)?
        .trim();

    if inner.is_empty() {
        return Ok(0);
    }

    let mut count = 0;
    for item in inner.split(',') {
        let item = item.trim();
        // Trailing comma
        if item.is_empty() {
            continue;
        }
        let slot = out.get_mut(count).ok_or(Kind::TooMany)?;
        *slot = parse_int(item)?;
        count += 1;
    }
    Ok(count)
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4", "!^gpio14"
///
/// `!` marks the line active-low, `^` enables the pull-up.
pub fn parse_pin(value: &str) -> Option<PinConfig> {
    let mut inverted = false;
    let mut pull_up = false;
    let mut s = value.trim();

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let pin = s.strip_prefix("gpio")?.parse().ok()?;
    Some(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}
