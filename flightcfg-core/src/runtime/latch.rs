//! Feature latch
//!
//! Output drivers are set up once at boot from the features configured at
//! that moment. Later edits change the record but not the hardware, so the
//! boot-time set is latched and queried separately from the live mask.

use crate::config::FeatureMask;

/// Extra settle time before a soft restart when the ESC protocol was turned off
pub const ONESHOT_FEATURE_CHANGED_DELAY_MS: u32 = 1500;

/// Features latched at the last [`latch`](FeatureLatch::latch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeatureLatch {
    active: FeatureMask,
}

impl FeatureLatch {
    /// Nothing active until the first latch
    pub const fn new() -> Self {
        Self {
            active: FeatureMask::empty(),
        }
    }

    pub fn latch(&mut self, configured: FeatureMask) {
        self.active = configured;
    }

    pub fn active(&self) -> FeatureMask {
        self.active
    }

    /// Whether any of `mask` was active at the last latch
    pub fn is_active(&self, mask: FeatureMask) -> bool {
        self.active.intersects(mask)
    }

    /// Delay before restarting motors on a soft reboot
    ///
    /// ESCs running OneShot125 or MultiShot need time to fall back to
    /// standard PWM when the feature was switched off since boot.
    pub fn motor_restart_delay_ms(&self, configured: FeatureMask) -> u32 {
        let switched_off = [FeatureMask::ONESHOT125, FeatureMask::MULTISHOT]
            .into_iter()
            .any(|protocol| self.is_active(protocol) && !configured.intersects(protocol));

        if switched_off {
            ONESHOT_FEATURE_CHANGED_DELAY_MS
        } else {
            0
        }
    }
}
