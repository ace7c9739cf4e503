//! Button press classification
//!
//! The classifier is fed one sample per hold tick after the button went
//! down. It knows nothing about time; the caller paces the samples.

/// Completed press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    /// Released before the long-press threshold was exceeded
    Short,
    /// Held past the threshold
    Long,
}

/// Result of one hold-tick sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressUpdate {
    /// Still held, below the threshold or already reported
    Holding,
    /// Threshold exceeded on this tick; reported once per press
    LongPressReached,
    /// Button released
    Released(Press),
}

/// Hold-tick counter for a single press
#[derive(Debug, Clone, Copy)]
pub struct PressClassifier {
    threshold: u16,
    ticks: u16,
    long_reported: bool,
}

impl PressClassifier {
    /// Create a classifier; a press is long once `ticks > threshold`
    pub const fn new(threshold: u16) -> Self {
        Self {
            threshold,
            ticks: 0,
            long_reported: false,
        }
    }

    /// Hold ticks counted so far
    pub fn ticks(&self) -> u16 {
        self.ticks
    }

    /// Feed the button state sampled after one hold tick
    pub fn sample(&mut self, held: bool) -> PressUpdate {
        if !held {
            let press = if self.long_reported {
                Press::Long
            } else {
                Press::Short
            };
            return PressUpdate::Released(press);
        }

        self.ticks = self.ticks.saturating_add(1);
        if self.ticks > self.threshold && !self.long_reported {
            self.long_reported = true;
            PressUpdate::LongPressReached
        } else {
            PressUpdate::Holding
        }
    }
}
