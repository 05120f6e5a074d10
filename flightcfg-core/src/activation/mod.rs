//! Activation pipeline
//!
//! Turns the stored record into live parameters and pushes them to the
//! [`Subsystems`] in dependency order:
//!
//! 1. Stick and throttle curves from the active rate profile
//! 2. Reset adjustment state
//! 3. RC controls (mode conditions, ESC limits, PID profile)
//! 4. Gyro config and software filter table
//! 5. Telemetry
//! 6. PID controller selection
//! 7. GPS profile and navigation PIDs (boards with GPS)
//! 8. Failsafe
//! 9. Accelerometer zero trims
//! 10. Mixer, servos, gimbal, 3D, ESC, airplane, receiver, custom motor mix
//! 11. Attitude estimator
//! 12. Altitude hold
//! 13. Barometer (boards with a barometer)
//!
//! The PID controller id is clamped to a valid range and written back to
//! the record before any step reads the profile. Every step hands over
//! complete values, so applying twice leaves the subsystems exactly as
//! applying once.

pub mod curves;
pub mod filter;

pub use curves::RcCurves;

use crate::config::profile::{PID_CONTROLLER_MAX, PID_CONTROLLER_MIN};
use crate::config::{ConfigRecord, Target};
use crate::runtime::ProfileSelector;
use crate::traits::{
    AltHoldSettings, ImuRuntimeConfig, ImuSettings, MixerSettings, RcControlsSettings,
    ServoSettings, Subsystems,
};

/// Scale of the stored estimator gains
const DCM_GAIN_SCALE: f32 = 10000.0;

/// Regenerate the lookup curves for the selected rate profile
pub fn activate_rate_profile<S: Subsystems>(
    record: &ConfigRecord,
    selector: &ProfileSelector,
    subsystems: &mut S,
) {
    let rates = &record.rate_profiles[selector.rate_profile()];
    subsystems.use_rc_curves(&RcCurves::generate(rates, &record.esc_servo));
}

/// Push the whole record to `subsystems`
///
/// The only write-back is the PID controller clamp on the active profile.
pub fn apply<S: Subsystems>(
    record: &mut ConfigRecord,
    target: Target,
    selector: &ProfileSelector,
    subsystems: &mut S,
) {
    let capabilities = target.info().capabilities;

    activate_rate_profile(record, selector, subsystems);
    subsystems.reset_adjustment_states();

    let profile_index = selector.profile();
    let pid_controller = &mut record.profiles[profile_index].pid.pid_controller;
    *pid_controller = (*pid_controller).clamp(PID_CONTROLLER_MIN, PID_CONTROLLER_MAX);

    let record = &*record;
    let profile = &record.profiles[profile_index];

    subsystems.use_rc_controls(&RcControlsSettings {
        mode_activation: &profile.mode_activation,
        esc_servo: &record.esc_servo,
        pid: &profile.pid,
    });

    subsystems.use_gyro_config(&record.gyro, filter::fir_coefficients(profile.pid.gyro_soft_lpf));
    subsystems.use_telemetry_config(&record.telemetry);
    subsystems.set_pid_controller(profile.pid.pid_controller);

    if capabilities.gps {
        subsystems.use_gps_profile(&profile.gps, &profile.pid);
    }

    subsystems.use_failsafe_config(&record.failsafe);
    subsystems.set_acceleration_trims(&record.acc_zero);

    subsystems.use_mixer_config(&MixerSettings {
        servo: capabilities.servos.then_some(ServoSettings {
            servos: &profile.servos,
            gimbal_mode: profile.gimbal_mode,
        }),
        flight_3d: &record.flight_3d,
        esc_servo: &record.esc_servo,
        mixer: &record.mixer,
        airplane: &record.airplane,
        rx: &record.rx,
        custom_motor_mix: &record.custom_motor_mix,
    });

    subsystems.configure_imu(&ImuSettings {
        runtime: ImuRuntimeConfig {
            dcm_kp: f32::from(record.dcm_kp) / DCM_GAIN_SCALE,
            dcm_ki: f32::from(record.dcm_ki) / DCM_GAIN_SCALE,
            acc_cut_hz: profile.acc_cut_hz,
            acc_unarmedcal: profile.acc_unarmedcal,
            small_angle: record.small_angle,
        },
        pid: &profile.pid,
        acc_deadband: &profile.acc_deadband,
        accz_lpf_cutoff: profile.accz_lpf_cutoff,
        throttle_correction_angle: profile.throttle_correction_angle,
    });

    subsystems.configure_altitude_hold(&AltHoldSettings {
        pid: &profile.pid,
        baro: &profile.baro,
        rc_controls: &profile.rc_controls,
        esc_servo: &record.esc_servo,
    });

    if capabilities.baro {
        subsystems.use_barometer_config(&profile.baro);
    }

    log_debug!(
        "Activated profile {} rate profile {}",
        profile_index,
        selector.rate_profile()
    );
}
