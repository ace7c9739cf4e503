//! Configuration types
//!
//! Board-agnostic configuration: logical channel mapping, calibration
//! profiles and rig timing. Profile tables are compile-time constants;
//! everything else can be overridden at startup from `rig.toml`.

pub mod calibration;
pub mod hardware;
pub mod toml;
pub mod types;

pub use calibration::*;
pub use hardware::*;
pub use toml::{parse_config, parse_pin, ParseError};
pub use types::*;
