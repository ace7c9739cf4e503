//! Build script for pumprig-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates rig.toml at compile time

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const MODES: [&str; 3] = ["sequence", "test_bench", "serial_pulse"];
const PROFILES: [&str; 2] = ["swing", "solo"];
const REQUIRED_PINS: [&str; 5] = [
    "motor_pwm",
    "motor_direction",
    "solenoid_enable",
    "solenoid_pwm",
    "button",
];
const GPIO_COUNT: i64 = 30;
const MAX_JITTER_TRIALS: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate rig.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=rig.toml");

    let config_path = Path::new("rig.toml");
    if !config_path.exists() {
        fail(
            "ERROR: rig.toml not found!",
            &["The firmware embeds rig.toml; create one next to Cargo.toml.".to_string()],
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("ERROR: Failed to read rig.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("ERROR: Invalid TOML syntax in rig.toml", &lines)
        }
    };

    let mut errors = Vec::new();
    validate_rig(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_duties(&config, &mut errors);

    if !errors.is_empty() {
        fail("ERROR: Invalid configuration in rig.toml", &errors);
    }

    println!("cargo:warning=rig.toml validated successfully");
}

/// Print a boxed error and abort the build
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  {:<64}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

fn section<'a>(
    config: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::map::Map<String, toml::Value>> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => None,
    }
}

fn validate_rig(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(rig) = section(config, "rig", errors) else {
        errors.push("Missing [rig] section".to_string());
        return;
    };

    match rig.get("mode").and_then(|v| v.as_str()) {
        Some(mode) if MODES.contains(&mode) => {}
        _ => errors.push("[rig] mode must be 'sequence', 'test_bench' or 'serial_pulse'".into()),
    }

    if let Some(profile) = rig.get("profile") {
        if !profile.as_str().is_some_and(|p| PROFILES.contains(&p)) {
            errors.push("[rig] profile must be 'swing' or 'solo'".into());
        }
    }
}

/// Parse "gpioN" with optional "!" and "^" prefixes
fn parse_pin(value: &str) -> Option<i64> {
    let value = value.trim_start_matches(['!', '^']);
    value.strip_prefix("gpio")?.parse().ok()
}

fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(pins) = section(config, "pins", errors) else {
        errors.push("Missing [pins] section".to_string());
        return;
    };

    for name in REQUIRED_PINS {
        if pins.get(name).is_none() {
            errors.push(format!("[pins] missing '{}'", name));
        }
    }

    let mut used: BTreeMap<i64, &str> = BTreeMap::new();
    for (name, value) in pins {
        let Some(value) = value.as_str() else {
            errors.push(format!("[pins] {} must be a string", name));
            continue;
        };
        if name == "status_led" && value == "none" {
            continue;
        }

        match parse_pin(value) {
            Some(pin) if (2..GPIO_COUNT).contains(&pin) => {
                if let Some(other) = used.insert(pin, name.as_str()) {
                    errors.push(format!("[pins] gpio{} used by both {} and {}", pin, other, name));
                }
            }
            Some(pin) if (0..2).contains(&pin) => {
                errors.push(format!("[pins] {}: gpio{} is reserved for UART0", name, pin));
            }
            _ => errors.push(format!("[pins] {}: invalid pin '{}'", name, value)),
        }
    }
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(timing) = section(config, "timing", errors) else {
        return;
    };

    for (name, value) in timing {
        if name == "jitter_permille" {
            continue;
        }
        match value.as_integer() {
            Some(v) if (0..=u16::MAX as i64).contains(&v) => {}
            _ => errors.push(format!("[timing] {} must be 0-65535", name)),
        }
    }

    if let Some(khz) = timing.get("pwm_frequency_khz").and_then(|v| v.as_integer()) {
        if !(1..=1000).contains(&khz) {
            errors.push("[timing] pwm_frequency_khz must be 1-1000".into());
        }
    }

    if let Some(jitter) = timing.get("jitter_permille") {
        match jitter.as_array() {
            Some(offsets) if !offsets.is_empty() && offsets.len() <= MAX_JITTER_TRIALS => {
                for offset in offsets {
                    if !offset.as_integer().is_some_and(|o| o > -1000 && o <= i16::MAX as i64) {
                        errors.push("[timing] jitter offsets must be integers above -1000".into());
                        break;
                    }
                }
            }
            _ => errors.push(format!(
                "[timing] jitter_permille must list 1-{} offsets",
                MAX_JITTER_TRIALS
            )),
        }
    }
}

fn validate_duties(config: &toml::Value, errors: &mut Vec<String>) {
    for name in ["debug", "bench"] {
        let Some(table) = section(config, name, errors) else {
            continue;
        };
        if let Some(duty) = table.get("duty_percent") {
            if !duty.as_integer().is_some_and(|d| (0..=100).contains(&d)) {
                errors.push(format!("[{}] duty_percent must be 0-100", name));
            }
        }
    }
}
