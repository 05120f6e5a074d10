//! Rate profiles
//!
//! Stick-to-rate mapping coefficients. Values are stored as the small
//! integers the configurator edits (×100 scale for rates and expo, ×100 for
//! throttle mid/expo).

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use super::AXIS_COUNT;

/// Axis index for roll in per-axis arrays
pub const ROLL: usize = 0;
/// Axis index for pitch in per-axis arrays
pub const PITCH: usize = 1;
/// Axis index for yaw in per-axis arrays
pub const YAW: usize = 2;

/// Stick response and throttle curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateProfile {
    /// Overall roll/pitch stick rate
    pub rc_rate: u8,
    /// Roll/pitch expo
    pub rc_expo: u8,
    /// Yaw expo
    pub rc_yaw_expo: u8,
    /// Throttle curve mid point
    pub thr_mid: u8,
    /// Throttle curve expo
    pub thr_expo: u8,
    /// Throttle-dependent PID attenuation
    pub dyn_thr_pid: u8,
    /// Per-axis super rates
    pub rates: [u8; AXIS_COUNT],
    /// Throttle value above which `dyn_thr_pid` applies
    pub tpa_breakpoint: u16,
}

impl Default for RateProfile {
    fn default() -> Self {
        Self {
            rc_rate: 20,
            rc_expo: 40,
            rc_yaw_expo: 20,
            thr_mid: 50,
            thr_expo: 0,
            dyn_thr_pid: 0,
            rates: [5, 5, 25],
            tpa_breakpoint: 1500,
        }
    }
}
