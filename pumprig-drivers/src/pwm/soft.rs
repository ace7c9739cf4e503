//! Bit-banged PWM
//!
//! Each cycle drives the line active, waits the on-time, drives it
//! inactive and waits the off-time. Timing accuracy is whatever the
//! delay provider gives; the cycle count is exact.

use pumprig_core::config::Channel;
use pumprig_core::error::RigError;
use pumprig_core::pwm::PwmTiming;
use pumprig_core::traits::{OutputLines, PwmGenerator};
use pumprig_hal::BlockingDelay;

/// Software PWM generator on a blocking delay
pub struct SoftPwm<D> {
    delay: D,
}

impl<D: BlockingDelay> SoftPwm<D> {
    /// Create a generator using `delay` for cycle timing
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Give the delay provider back
    pub fn into_inner(self) -> D {
        self.delay
    }
}

impl<D: BlockingDelay> PwmGenerator for SoftPwm<D> {
    fn generate_timing<L: OutputLines + ?Sized>(
        &mut self,
        lines: &mut L,
        line: Channel,
        timing: &PwmTiming,
    ) -> Result<(), RigError> {
        for _ in 0..timing.cycles {
            if let Err(fault) = lines.set_line(line, true) {
                // Never leave the line active after a fault
                let _ = lines.set_line(line, false);
                return Err(fault.into());
            }
            self.delay.delay_us(timing.on_us);

            lines.set_line(line, false)?;
            self.delay.delay_us(timing.off_us);
        }
        Ok(())
    }
}
