#![allow(dead_code)]

use flightcfg_core::activation::filter::FirCoefficients;
use flightcfg_core::activation::RcCurves;
use flightcfg_core::config::profile::{AxisTrims, BaroConfig, GpsProfile, PidProfile};
use flightcfg_core::config::record::{
    FailsafeConfig, GyroConfig, MixerMode, TelemetryConfig,
};
use flightcfg_core::traits::{
    AltHoldSettings, ImuRuntimeConfig, ImuSettings, MixerSettings, RcControlsSettings,
    Subsystems,
};
use flightcfg_core::{ConfigStore, Target};
use flightcfg_hal::{NoRxSignal, RamFlash, RxSignal};

/// Config region start used by every test, 1KB pages
pub const START: u32 = 0x0801_F800;
pub const PAGE: u32 = 1024;
pub const REGION: usize = 2048;

pub type TestFlash = RamFlash<REGION>;

/// Calls seen by the subsystems, with the last value handed to each
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<&'static str>,
    pub curves: Option<RcCurves>,
    pub fir: Option<Option<&'static FirCoefficients>>,
    pub telemetry: Option<TelemetryConfig>,
    pub pid_controller: Option<u8>,
    pub failsafe: Option<FailsafeConfig>,
    pub acc_trims: Option<AxisTrims>,
    pub mixer_mode: Option<MixerMode>,
    pub imu: Option<ImuRuntimeConfig>,
    pub beeps: Vec<u8>,
}

impl Recorder {
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Subsystems for Recorder {
    fn use_rc_curves(&mut self, curves: &RcCurves) {
        self.calls.push("curves");
        self.curves = Some(*curves);
    }

    fn reset_adjustment_states(&mut self) {
        self.calls.push("adjustments");
    }

    fn use_rc_controls(&mut self, _settings: &RcControlsSettings<'_>) {
        self.calls.push("rc_controls");
    }

    fn use_gyro_config(&mut self, _gyro: &GyroConfig, fir: Option<&'static FirCoefficients>) {
        self.calls.push("gyro");
        self.fir = Some(fir);
    }

    fn use_telemetry_config(&mut self, telemetry: &TelemetryConfig) {
        self.calls.push("telemetry");
        self.telemetry = Some(*telemetry);
    }

    fn set_pid_controller(&mut self, controller: u8) {
        self.calls.push("pid_controller");
        self.pid_controller = Some(controller);
    }

    fn use_gps_profile(&mut self, _gps: &GpsProfile, _pid: &PidProfile) {
        self.calls.push("gps");
    }

    fn use_failsafe_config(&mut self, failsafe: &FailsafeConfig) {
        self.calls.push("failsafe");
        self.failsafe = Some(*failsafe);
    }

    fn set_acceleration_trims(&mut self, trims: &AxisTrims) {
        self.calls.push("acc_trims");
        self.acc_trims = Some(*trims);
    }

    fn use_mixer_config(&mut self, settings: &MixerSettings<'_>) {
        self.calls.push("mixer");
        self.mixer_mode = Some(settings.mixer.mode);
    }

    fn configure_imu(&mut self, settings: &ImuSettings<'_>) {
        self.calls.push("imu");
        self.imu = Some(settings.runtime);
    }

    fn configure_altitude_hold(&mut self, _settings: &AltHoldSettings<'_>) {
        self.calls.push("alt_hold");
    }

    fn use_barometer_config(&mut self, _baro: &BaroConfig) {
        self.calls.push("baro");
    }

    fn confirmation_beeps(&mut self, count: u8) {
        self.beeps.push(count);
    }
}

/// Receiver hook that tracks whether capture is paused
#[derive(Debug, Default)]
pub struct TrackingRx {
    pub suspended: bool,
    pub suspends: u32,
}

impl RxSignal for TrackingRx {
    fn suspend(&mut self) {
        assert!(!self.suspended, "capture suspended twice");
        self.suspended = true;
        self.suspends += 1;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }
}

pub fn blank_flash() -> TestFlash {
    RamFlash::new(START, PAGE)
}

pub fn store_on(flash: TestFlash, target: Target) -> ConfigStore<TestFlash, NoRxSignal> {
    ConfigStore::new(flash, NoRxSignal, target).unwrap()
}

/// Store whose flash already holds valid defaults
pub fn initialized_store(target: Target) -> ConfigStore<TestFlash, NoRxSignal> {
    let mut store = store_on(blank_flash(), target);
    store.ensure_valid().unwrap();
    store
}
