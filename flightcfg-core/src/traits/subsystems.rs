//! Activation targets
//!
//! The store never talks to flight code directly. Activation hands each
//! collaborator its slice of the record through [`Subsystems`], always in
//! the same order, and always with complete values so a collaborator can
//! replace whatever it held before.

use crate::activation::curves::RcCurves;
use crate::activation::filter::FirCoefficients;
use crate::config::profile::{
    AccDeadband, AxisTrims, BaroConfig, GimbalMode, GpsProfile, ModeActivationCondition,
    PidProfile, RcControlsConfig, ServoParam,
};
use crate::config::record::{
    AirplaneConfig, EscServoConfig, FailsafeConfig, Flight3dConfig, GyroConfig, MixerConfig,
    MotorMix, RxConfig, TelemetryConfig,
};

/// Input interpretation: switch-to-mode mapping and stick limits
#[derive(Debug, Clone, Copy)]
pub struct RcControlsSettings<'a> {
    pub mode_activation: &'a [ModeActivationCondition],
    pub esc_servo: &'a EscServoConfig,
    pub pid: &'a PidProfile,
}

/// Servo outputs, only handed over on boards that drive servos
#[derive(Debug, Clone, Copy)]
pub struct ServoSettings<'a> {
    pub servos: &'a [ServoParam],
    pub gimbal_mode: GimbalMode,
}

/// Everything the motor mixer needs
#[derive(Debug, Clone, Copy)]
pub struct MixerSettings<'a> {
    pub servo: Option<ServoSettings<'a>>,
    pub flight_3d: &'a Flight3dConfig,
    pub esc_servo: &'a EscServoConfig,
    pub mixer: &'a MixerConfig,
    pub airplane: &'a AirplaneConfig,
    pub rx: &'a RxConfig,
    pub custom_motor_mix: &'a [MotorMix],
}

/// Attitude estimator parameters derived from stored values
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuRuntimeConfig {
    /// Proportional gain, stored value / 10000
    pub dcm_kp: f32,
    /// Integral gain, stored value / 10000
    pub dcm_ki: f32,
    pub acc_cut_hz: u8,
    pub acc_unarmedcal: u8,
    /// Max tilt (deg) that still allows arming
    pub small_angle: u8,
}

/// Estimator setup
#[derive(Debug, Clone, Copy)]
pub struct ImuSettings<'a> {
    pub runtime: ImuRuntimeConfig,
    pub pid: &'a PidProfile,
    pub acc_deadband: &'a AccDeadband,
    pub accz_lpf_cutoff: f32,
    pub throttle_correction_angle: u16,
}

/// Altitude hold setup
#[derive(Debug, Clone, Copy)]
pub struct AltHoldSettings<'a> {
    pub pid: &'a PidProfile,
    pub baro: &'a BaroConfig,
    pub rc_controls: &'a RcControlsConfig,
    pub esc_servo: &'a EscServoConfig,
}

/// Consumers of the activated configuration
///
/// Methods are listed in the order activation calls them. Implementations
/// must treat every call as a full replacement of what they held.
pub trait Subsystems {
    /// Stick and throttle lookup curves
    fn use_rc_curves(&mut self, curves: &RcCurves);

    /// Forget in-flight adjustment state
    fn reset_adjustment_states(&mut self);

    fn use_rc_controls(&mut self, settings: &RcControlsSettings<'_>);

    /// Gyro setup and the software filter, `None` when disabled
    fn use_gyro_config(&mut self, gyro: &GyroConfig, fir: Option<&'static FirCoefficients>);

    fn use_telemetry_config(&mut self, telemetry: &TelemetryConfig);

    /// Select the PID controller implementation (`1..=2`)
    fn set_pid_controller(&mut self, controller: u8);

    /// Navigation tuning, only called on boards with GPS
    fn use_gps_profile(&mut self, gps: &GpsProfile, pid: &PidProfile);

    fn use_failsafe_config(&mut self, failsafe: &FailsafeConfig);

    /// Accelerometer calibration offsets
    fn set_acceleration_trims(&mut self, trims: &AxisTrims);

    fn use_mixer_config(&mut self, settings: &MixerSettings<'_>);

    fn configure_imu(&mut self, settings: &ImuSettings<'_>);

    fn configure_altitude_hold(&mut self, settings: &AltHoldSettings<'_>);

    /// Barometer filtering, only called on boards with a barometer
    fn use_barometer_config(&mut self, baro: &BaroConfig);

    /// Audible acknowledgement of a settings change
    fn confirmation_beeps(&mut self, _count: u8) {}
}

impl<T: Subsystems + ?Sized> Subsystems for &mut T {
    fn use_rc_curves(&mut self, curves: &RcCurves) {
        (**self).use_rc_curves(curves)
    }

    fn reset_adjustment_states(&mut self) {
        (**self).reset_adjustment_states()
    }

    fn use_rc_controls(&mut self, settings: &RcControlsSettings<'_>) {
        (**self).use_rc_controls(settings)
    }

    fn use_gyro_config(&mut self, gyro: &GyroConfig, fir: Option<&'static FirCoefficients>) {
        (**self).use_gyro_config(gyro, fir)
    }

    fn use_telemetry_config(&mut self, telemetry: &TelemetryConfig) {
        (**self).use_telemetry_config(telemetry)
    }

    fn set_pid_controller(&mut self, controller: u8) {
        (**self).set_pid_controller(controller)
    }

    fn use_gps_profile(&mut self, gps: &GpsProfile, pid: &PidProfile) {
        (**self).use_gps_profile(gps, pid)
    }

    fn use_failsafe_config(&mut self, failsafe: &FailsafeConfig) {
        (**self).use_failsafe_config(failsafe)
    }

    fn set_acceleration_trims(&mut self, trims: &AxisTrims) {
        (**self).set_acceleration_trims(trims)
    }

    fn use_mixer_config(&mut self, settings: &MixerSettings<'_>) {
        (**self).use_mixer_config(settings)
    }

    fn configure_imu(&mut self, settings: &ImuSettings<'_>) {
        (**self).configure_imu(settings)
    }

    fn configure_altitude_hold(&mut self, settings: &AltHoldSettings<'_>) {
        (**self).configure_altitude_hold(settings)
    }

    fn use_barometer_config(&mut self, baro: &BaroConfig) {
        (**self).use_barometer_config(baro)
    }

    fn confirmation_beeps(&mut self, count: u8) {
        (**self).confirmation_beeps(count)
    }
}
