//! PWM burst generator

use super::OutputLines;
use crate::config::Channel;
use crate::error::RigError;
use crate::pwm::{PwmRequest, PwmTiming};

/// Blocking PWM burst generator
///
/// The generator borrows the output lines for the duration of one burst
/// only, so the sequencer keeps ownership of the solenoid lines between
/// bursts.
pub trait PwmGenerator {
    /// Emit one burst; returns once every cycle has completed
    ///
    /// Fails with a config error when the request has no valid period
    /// and with a hardware fault when the line cannot be driven.
    fn generate<L: OutputLines + ?Sized>(
        &mut self,
        lines: &mut L,
        request: &PwmRequest,
    ) -> Result<(), RigError> {
        let timing = PwmTiming::for_request(request)?;
        self.generate_timing(lines, request.line, &timing)
    }

    /// Emit a burst with precomputed timing
    fn generate_timing<L: OutputLines + ?Sized>(
        &mut self,
        lines: &mut L,
        line: Channel,
        timing: &PwmTiming,
    ) -> Result<(), RigError>;
}

impl<T: PwmGenerator + ?Sized> PwmGenerator for &mut T {
    fn generate<L: OutputLines + ?Sized>(
        &mut self,
        lines: &mut L,
        request: &PwmRequest,
    ) -> Result<(), RigError> {
        T::generate(self, lines, request)
    }

    fn generate_timing<L: OutputLines + ?Sized>(
        &mut self,
        lines: &mut L,
        line: Channel,
        timing: &PwmTiming,
    ) -> Result<(), RigError> {
        T::generate_timing(self, lines, line, timing)
    }
}
