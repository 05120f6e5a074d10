//! Active profile selection

use crate::config::{MAX_PROFILE_COUNT, MAX_RATE_PROFILE_COUNT};

/// Which profile and rate profile slots are live
///
/// Indices are always in range: selecting past the end picks the last slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileSelector {
    profile: u8,
    rate_profile: u8,
}

impl ProfileSelector {
    pub const fn new() -> Self {
        Self {
            profile: 0,
            rate_profile: 0,
        }
    }

    pub fn profile(&self) -> usize {
        usize::from(self.profile)
    }

    pub fn rate_profile(&self) -> usize {
        usize::from(self.rate_profile)
    }

    /// Select a profile slot, returning the slot actually selected
    pub fn select_profile(&mut self, index: usize) -> usize {
        self.profile = clamp_slot(index, MAX_PROFILE_COUNT);
        self.profile()
    }

    /// Select a rate profile slot, returning the slot actually selected
    pub fn select_rate_profile(&mut self, index: usize) -> usize {
        self.rate_profile = clamp_slot(index, MAX_RATE_PROFILE_COUNT);
        self.rate_profile()
    }
}

fn clamp_slot(index: usize, count: usize) -> u8 {
    index.min(count - 1) as u8
}
