//! Mutable sequencer state
//!
//! Kept apart from the sequencer so it can be inspected between cycles
//! and survives a rebuilt driver set.

use crate::config::{Profile, RigConfig, STEP_COUNT};
use crate::state::{Event, Phase};

/// Everything the sequencer remembers between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequencerState {
    pub phase: Phase,
    /// Active calibration profile
    pub profile: Profile,
    /// Debug burst still to run
    pub debug_pending: bool,
    /// Next calibration step, always below `STEP_COUNT`
    pub step_index: usize,
    /// Jitter trial currently running
    pub jitter_index: usize,
    /// Hold ticks of the last press
    pub hold_ticks: u16,
    /// Test bench pause flag
    pub paused: bool,
    /// Steps completed since boot
    pub completed_steps: u32,
}

impl SequencerState {
    /// Power-on state for a configuration
    pub fn new(config: &RigConfig) -> Self {
        Self {
            phase: Phase::Boot,
            profile: config.initial_profile,
            debug_pending: config.debug.enabled,
            step_index: 0,
            jitter_index: 0,
            hold_ticks: 0,
            paused: false,
            completed_steps: 0,
        }
    }

    /// Feed an event to the phase machine
    pub fn apply(&mut self, event: Event) {
        let next = self.phase.transition(event);
        if next != self.phase {
            debug!("phase {:?} -> {:?}", self.phase, next);
        }
        self.phase = next;
    }

    /// Move to the next step, wrapping after the last one
    pub fn advance_step(&mut self) {
        self.step_index = (self.step_index + 1) % STEP_COUNT;
        self.completed_steps = self.completed_steps.wrapping_add(1);
    }

    /// Switch profile and restart at step 0
    pub fn toggle_profile(&mut self) {
        self.profile = self.profile.toggled();
        self.step_index = 0;
    }
}
