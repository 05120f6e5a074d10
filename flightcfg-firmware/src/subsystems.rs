//! Subsystem hooks for this board
//!
//! The flight code consumers are not linked into this firmware yet; each
//! hook logs what it was handed.

use defmt::*;

use flightcfg_core::activation::filter::FirCoefficients;
use flightcfg_core::activation::RcCurves;
use flightcfg_core::config::profile::{AxisTrims, BaroConfig, GpsProfile, PidProfile};
use flightcfg_core::config::record::{FailsafeConfig, GyroConfig, TelemetryConfig};
use flightcfg_core::traits::{
    AltHoldSettings, ImuSettings, MixerSettings, RcControlsSettings, Subsystems,
};

/// Logs every activation call
#[derive(Debug, Default)]
pub struct LoggingSubsystems {
    /// Activation passes seen since boot
    applied: u32,
}

impl LoggingSubsystems {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Subsystems for LoggingSubsystems {
    fn use_rc_curves(&mut self, curves: &RcCurves) {
        debug!(
            "RC curves: pitch/roll max {}, yaw max {}, throttle {}..{}",
            curves.pitch_roll[curves.pitch_roll.len() - 1],
            curves.yaw[curves.yaw.len() - 1],
            curves.throttle[0],
            curves.throttle[curves.throttle.len() - 1]
        );
    }

    fn reset_adjustment_states(&mut self) {
        self.applied += 1;
        debug!("Activation pass {}", self.applied);
    }

    fn use_rc_controls(&mut self, settings: &RcControlsSettings<'_>) {
        debug!(
            "RC controls: {} mode conditions, min throttle {}",
            settings.mode_activation.len(),
            settings.esc_servo.min_throttle
        );
    }

    fn use_gyro_config(&mut self, gyro: &GyroConfig, fir: Option<&'static FirCoefficients>) {
        debug!("Gyro: lpf {}, soft filter {}", gyro.lpf, fir.is_some());
    }

    fn use_telemetry_config(&mut self, telemetry: &TelemetryConfig) {
        debug!("Telemetry: inversion {}", telemetry.inversion);
    }

    fn set_pid_controller(&mut self, controller: u8) {
        info!("PID controller {}", controller);
    }

    fn use_gps_profile(&mut self, gps: &GpsProfile, _pid: &PidProfile) {
        debug!("GPS: waypoint radius {} cm", gps.wp_radius);
    }

    fn use_failsafe_config(&mut self, failsafe: &FailsafeConfig) {
        debug!("Failsafe: delay {}, throttle {}", failsafe.delay, failsafe.throttle);
    }

    fn set_acceleration_trims(&mut self, trims: &AxisTrims) {
        debug!("Acc trims: {:?}", trims);
    }

    fn use_mixer_config(&mut self, settings: &MixerSettings<'_>) {
        info!(
            "Mixer: {:?}, servos {}",
            settings.mixer.mode,
            settings.servo.is_some()
        );
    }

    fn configure_imu(&mut self, settings: &ImuSettings<'_>) {
        debug!("IMU: {:?}", settings.runtime);
    }

    fn configure_altitude_hold(&mut self, settings: &AltHoldSettings<'_>) {
        debug!("Alt hold: baro samples {}", settings.baro.sample_count);
    }

    fn use_barometer_config(&mut self, baro: &BaroConfig) {
        debug!("Baro: {} samples", baro.sample_count);
    }

    fn confirmation_beeps(&mut self, count: u8) {
        info!("Beep x{}", count);
    }
}
