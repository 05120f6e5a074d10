//! Tuning profiles
//!
//! A profile is one complete tuning set: PID gains, accelerometer trims and
//! filtering, barometer/GPS/servo settings and the switch-to-mode mapping.
//! The record keeps several and activates one at a time.

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use super::{AXIS_COUNT, MAX_MODE_ACTIVATION_CONDITIONS, MAX_SUPPORTED_SERVOS, PID_ITEM_COUNT};

/// PID item indices into [`PidProfile`] gain arrays
pub const PID_ROLL: usize = 0;
pub const PID_PITCH: usize = 1;
pub const PID_YAW: usize = 2;
pub const PID_ALT: usize = 3;
pub const PID_POS: usize = 4;
pub const PID_POSR: usize = 5;
pub const PID_NAVR: usize = 6;
pub const PID_LEVEL: usize = 7;
pub const PID_MAG: usize = 8;
pub const PID_VEL: usize = 9;

/// Lowest valid PID controller id
pub const PID_CONTROLLER_MIN: u8 = 1;
/// Highest valid PID controller id
pub const PID_CONTROLLER_MAX: u8 = 2;

/// Servo forwarding disabled marker
pub const CHANNEL_FORWARDING_DISABLED: u8 = 0xFF;

/// PID gains and loop filtering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidProfile {
    /// Controller implementation, valid range `1..=2`
    pub pid_controller: u8,
    pub p8: [u8; PID_ITEM_COUNT],
    pub i8: [u8; PID_ITEM_COUNT],
    pub d8: [u8; PID_ITEM_COUNT],
    /// Gyro FIR filter selector
    pub gyro_soft_lpf: u8,
    pub dterm_cut_hz: u8,
    pub yaw_pterm_cut_hz: u8,
    /// Float-controller gains per axis
    pub p_f: [f32; AXIS_COUNT],
    pub i_f: [f32; AXIS_COUNT],
    pub d_f: [f32; AXIS_COUNT],
    pub a_level: f32,
    pub h_level: f32,
    pub h_sensitivity: u8,
}

impl Default for PidProfile {
    fn default() -> Self {
        //              ROLL PITCH YAW ALT POS POSR NAVR LEVEL MAG VEL
        let p8 = [40, 40, 100, 50, 15, 34, 25, 50, 40, 120];
        let i8 = [30, 30, 50, 0, 0, 14, 33, 50, 0, 45];
        let d8 = [23, 23, 12, 0, 0, 53, 83, 100, 0, 1];

        Self {
            pid_controller: 2,
            p8,
            i8,
            d8,
            gyro_soft_lpf: 0,
            dterm_cut_hz: 8,
            yaw_pterm_cut_hz: 30,
            p_f: [5.012, 6.121, 8.420],
            i_f: [1.021, 1.400, 1.725],
            d_f: [0.020, 0.025, 0.020],
            a_level: 3.0,
            h_level: 3.0,
            h_sensitivity: 100,
        }
    }
}

/// Per-axis trim offsets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisTrims {
    pub roll: i16,
    pub pitch: i16,
    pub yaw: i16,
}

/// Accelerometer deadbands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccDeadband {
    pub xy: u8,
    pub z: u8,
}

impl Default for AccDeadband {
    fn default() -> Self {
        Self { xy: 40, z: 40 }
    }
}

/// Barometer filtering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaroConfig {
    pub sample_count: u8,
    pub noise_lpf: f32,
    /// Complementary filter coefficient for velocity
    pub cf_vel: f32,
    /// Complementary filter coefficient for altitude
    pub cf_alt: f32,
}

impl Default for BaroConfig {
    fn default() -> Self {
        Self {
            sample_count: 21,
            noise_lpf: 0.6,
            cf_vel: 0.985,
            cf_alt: 0.965,
        }
    }
}

/// Navigation tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsProfile {
    /// Waypoint arrival radius (cm)
    pub wp_radius: u16,
    pub lpf: u8,
    pub nav_slew_rate: u8,
    pub nav_controls_heading: u8,
    /// Navigation speed limits (cm/s)
    pub nav_speed_min: u16,
    pub nav_speed_max: u16,
    pub ap_mode: u8,
}

impl Default for GpsProfile {
    fn default() -> Self {
        Self {
            wp_radius: 200,
            lpf: 20,
            nav_slew_rate: 30,
            nav_controls_heading: 1,
            nav_speed_min: 100,
            nav_speed_max: 300,
            ap_mode: 40,
        }
    }
}

/// Stick deadbands and altitude-hold stick behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcControlsConfig {
    pub deadband: u8,
    pub yaw_deadband: u8,
    pub alt_hold_deadband: u8,
    pub alt_hold_fast_change: u8,
}

impl Default for RcControlsConfig {
    fn default() -> Self {
        Self {
            deadband: 0,
            yaw_deadband: 0,
            alt_hold_deadband: 40,
            alt_hold_fast_change: 1,
        }
    }
}

/// Output range and behaviour of one servo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoParam {
    pub min: i16,
    pub max: i16,
    pub middle: i16,
    /// Output scale in percent, may be negative to reverse
    pub rate: i8,
    pub angle_at_min: u8,
    pub angle_at_max: u8,
    /// Receiver channel forwarded to this servo, or
    /// [`CHANNEL_FORWARDING_DISABLED`]
    pub forward_from_channel: u8,
}

impl Default for ServoParam {
    fn default() -> Self {
        Self {
            min: 1000,
            max: 2000,
            middle: 1500,
            rate: 100,
            angle_at_min: 45,
            angle_at_max: 45,
            forward_from_channel: CHANNEL_FORWARDING_DISABLED,
        }
    }
}

/// Camera gimbal mixing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GimbalMode {
    #[default]
    Normal,
    MixTilt,
}

/// Auxiliary-channel range that turns a flight mode on
///
/// A condition with `start_step == end_step` is unused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeActivationCondition {
    pub mode_id: u8,
    pub aux_channel_index: u8,
    pub start_step: u8,
    pub end_step: u8,
}

impl ModeActivationCondition {
    /// Whether this slot holds a real condition
    pub fn is_used(&self) -> bool {
        self.start_step < self.end_step
    }
}

/// One tuning set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Profile {
    pub pid: PidProfile,
    /// Roll/pitch trims applied on top of the accelerometer zero
    pub accelerometer_trims: AxisTrims,
    /// Magnetic declination (deg × 10)
    pub mag_declination: i16,
    pub acc_cut_hz: u8,
    /// Vertical acceleration low-pass cutoff (Hz)
    pub accz_lpf_cutoff: f32,
    pub acc_deadband: AccDeadband,
    /// Allow accelerometer use while disarmed
    pub acc_unarmedcal: u8,
    pub baro: BaroConfig,
    pub rc_controls: RcControlsConfig,
    pub throttle_correction_value: u8,
    /// Tilt angle (deg × 10) at which throttle correction reaches full value
    pub throttle_correction_angle: u16,
    pub servos: [ServoParam; MAX_SUPPORTED_SERVOS],
    pub gimbal_mode: GimbalMode,
    pub gps: GpsProfile,
    pub mode_activation: [ModeActivationCondition; MAX_MODE_ACTIVATION_CONDITIONS],
    /// Rate profile selected when this profile becomes active
    pub default_rate_profile_index: u8,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            pid: PidProfile::default(),
            accelerometer_trims: AxisTrims::default(),
            mag_declination: 0,
            acc_cut_hz: 15,
            accz_lpf_cutoff: 5.0,
            acc_deadband: AccDeadband::default(),
            acc_unarmedcal: 1,
            baro: BaroConfig::default(),
            rc_controls: RcControlsConfig::default(),
            throttle_correction_value: 0,
            throttle_correction_angle: 800,
            servos: [ServoParam::default(); MAX_SUPPORTED_SERVOS],
            gimbal_mode: GimbalMode::Normal,
            gps: GpsProfile::default(),
            mode_activation: [ModeActivationCondition::default(); MAX_MODE_ACTIVATION_CONDITIONS],
            default_rate_profile_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pid_gains() {
        let pid = PidProfile::default();
        assert_eq!(pid.pid_controller, 2);
        assert_eq!((pid.p8[PID_YAW], pid.i8[PID_YAW], pid.d8[PID_YAW]), (100, 50, 12));
        assert_eq!(pid.p8[PID_MAG], 40);
        assert_eq!((pid.p8[PID_VEL], pid.i8[PID_VEL], pid.d8[PID_VEL]), (120, 45, 1));
        assert_eq!(pid.d8[PID_LEVEL], 100);
    }

    #[test]
    fn test_unused_mode_slots() {
        let profile = Profile::default();
        assert!(profile.mode_activation.iter().all(|c| !c.is_used()));
    }
}
