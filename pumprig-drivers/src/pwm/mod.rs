//! PWM burst generators

pub mod soft;

pub use soft::SoftPwm;
