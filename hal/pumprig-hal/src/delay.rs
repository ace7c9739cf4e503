//! Busy-wait delay abstraction
//!
//! The rig is fully blocking: PWM bursts, button polling and solenoid
//! holds all spin on a delay provider. Injecting it lets tests run on a
//! simulated clock.

/// Blocking delay provider
pub trait BlockingDelay {
    /// Busy-wait for the given number of microseconds
    fn delay_us(&mut self, us: u32);

    /// Busy-wait for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}

impl<T: BlockingDelay + ?Sized> BlockingDelay for &mut T {
    fn delay_us(&mut self, us: u32) {
        T::delay_us(self, us)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}
