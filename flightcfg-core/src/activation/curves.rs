//! Stick response lookup curves
//!
//! Precomputed once per activation from the active rate profile. The flight
//! loop interpolates between entries, so each table covers the full stick
//! travel in equal steps.

use crate::config::record::EscServoConfig;
use crate::config::RateProfile;

/// Roll/pitch entries, stick deflection 0..=500 in steps of 100
pub const PITCH_LOOKUP_LENGTH: usize = 7;
/// Yaw entries, same spacing as roll/pitch
pub const YAW_LOOKUP_LENGTH: usize = 7;
/// Throttle entries, 0..=110% in steps of 10%
pub const THROTTLE_LOOKUP_LENGTH: usize = 12;

/// All lookup curves for one rate profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcCurves {
    pub pitch_roll: [i16; PITCH_LOOKUP_LENGTH],
    pub yaw: [i16; YAW_LOOKUP_LENGTH],
    /// Motor command (µs) per throttle step
    pub throttle: [i16; THROTTLE_LOOKUP_LENGTH],
}

impl RcCurves {
    pub fn generate(rates: &RateProfile, esc: &EscServoConfig) -> Self {
        Self {
            pitch_roll: pitch_roll_curve(rates),
            yaw: yaw_curve(rates),
            throttle: throttle_curve(rates, esc),
        }
    }
}

pub fn pitch_roll_curve(rates: &RateProfile) -> [i16; PITCH_LOOKUP_LENGTH] {
    let expo = i32::from(rates.rc_expo);
    let rate = i32::from(rates.rc_rate);

    core::array::from_fn(|i| {
        let i = i as i32;
        ((2500 + expo * (i * i - 25)) * i * rate / 2500) as i16
    })
}

pub fn yaw_curve(rates: &RateProfile) -> [i16; YAW_LOOKUP_LENGTH] {
    let expo = i32::from(rates.rc_yaw_expo);

    core::array::from_fn(|i| {
        let i = i as i32;
        ((2500 + expo * (i * i - 25)) * i / 25) as i16
    })
}

/// Throttle curve scaled into the ESC's `min_throttle..max_throttle` range
pub fn throttle_curve(rates: &RateProfile, esc: &EscServoConfig) -> [i16; THROTTLE_LOOKUP_LENGTH] {
    let mid = i32::from(rates.thr_mid);
    let expo = i32::from(rates.thr_expo);
    let min = i32::from(esc.min_throttle);
    let span = i32::from(esc.max_throttle) - min;

    core::array::from_fn(|i| {
        let tmp = 10 * i as i32 - mid;
        let y = match tmp {
            t if t > 0 => 100 - mid,
            t if t < 0 => mid,
            _ => 1,
        };
        // Mid point at 100% leaves no room above it
        let y = if y == 0 { 1 } else { y };

        let curve = 10 * mid + tmp * (100 - expo + expo * tmp * tmp / (y * y)) / 10;
        (min + span * curve / 1000) as i16
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_roll_curve_defaults() {
        let curve = pitch_roll_curve(&RateProfile::default());
        assert_eq!(curve[0], 0);
        assert_eq!(curve[1], 12);
        assert_eq!(curve[5], 100);
        assert_eq!(curve[6], 141);
    }

    #[test]
    fn test_yaw_curve_defaults() {
        let curve = yaw_curve(&RateProfile::default());
        assert_eq!(curve[0], 0);
        assert_eq!(curve[1], 80);
        assert_eq!(curve[5], 500);
        assert_eq!(curve[6], 652);
    }

    #[test]
    fn test_linear_throttle_spans_esc_range() {
        let esc = EscServoConfig::default();
        let curve = throttle_curve(&RateProfile::default(), &esc);
        assert_eq!(curve[0], 1150);
        assert_eq!(curve[5], 1500);
        assert_eq!(curve[10], 1850);
        assert_eq!(curve[11], 1920);
    }

    #[test]
    fn test_throttle_expo_flattens_mid_range() {
        let rates = RateProfile {
            thr_expo: 100,
            ..RateProfile::default()
        };
        let esc = EscServoConfig {
            min_throttle: 1000,
            max_throttle: 2000,
            ..EscServoConfig::default()
        };
        let curve = throttle_curve(&rates, &esc);
        assert_eq!(curve[0], 1000);
        assert_eq!(curve[3], 1468);
        assert_eq!(curve[5], 1500);
        assert_eq!(curve[10], 2000);
    }

    #[test]
    fn test_throttle_mid_at_top_does_not_divide_by_zero() {
        let rates = RateProfile {
            thr_mid: 100,
            thr_expo: 50,
            ..RateProfile::default()
        };
        let curve = throttle_curve(&rates, &EscServoConfig::default());
        assert_eq!(curve[10], 1850);
    }

    #[test]
    fn test_generate_bundles_all_curves() {
        let rates = RateProfile::default();
        let esc = EscServoConfig::default();
        let curves = RcCurves::generate(&rates, &esc);
        assert_eq!(curves.pitch_roll, pitch_roll_curve(&rates));
        assert_eq!(curves.yaw, yaw_curve(&rates));
        assert_eq!(curves.throttle, throttle_curve(&rates, &esc));
    }
}
