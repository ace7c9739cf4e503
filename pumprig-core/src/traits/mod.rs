//! Device traits
//!
//! These traits define the interface between the sequencer and the
//! driver implementations. Everything is blocking and single-threaded.

pub mod button;
pub mod lines;
pub mod pwm;

pub use button::ModeButton;
pub use lines::OutputLines;
pub use pwm::PwmGenerator;
