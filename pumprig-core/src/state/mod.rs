//! Sequencer phase machine
//!
//! Defines the authoritative phases of the rig. The machine is explicit,
//! finite and deterministic; the sequencer drives it with events as it
//! works through a step.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{FaultKind, Phase};
