//! Compiled-in defaults
//!
//! Builds a fresh [`ConfigRecord`] for a board: common defaults first, then
//! the board's table entry layered on top, then profile 0 and rate profile 0
//! replicated into the remaining slots.

use super::features::FeatureMask;
use super::profile::{Profile, PID_PITCH, PID_ROLL};
use super::rates::RateProfile;
use super::record::{
    AirplaneConfig, BatteryConfig, BlackboxConfig, BoardAlignment, ConfigRecord,
    EscServoConfig, FailsafeConfig, Flight3dConfig, GpsConfig, GyroConfig, MixerConfig,
    MotorMix, RxConfig, SensorAlignment, TelemetryConfig,
};
use super::serial::SerialConfig;
use super::target::{Target, TargetInfo, TuningOverrides};
use super::{MAX_RATE_PROFILE_COUNT, MAX_SUPPORTED_MOTORS};

/// Current version of the settings layout
pub const CONFIG_VERSION: u8 = 115;

/// Motor output rate for brushless ESCs (Hz)
pub const BRUSHLESS_MOTORS_PWM_RATE: u16 = 400;
/// Motor output rate for brushed motors (Hz)
pub const BRUSHED_MOTORS_PWM_RATE: u16 = 16000;

/// Features every board starts with
pub const COMMON_FEATURES: FeatureMask = FeatureMask::FAILSAFE.union(FeatureMask::ONESHOT125);

impl ConfigRecord {
    /// Fresh record for `target`
    pub fn defaults(target: Target) -> Self {
        let info = target.info();

        let mut record = Self {
            current_profile_index: 0,
            features: COMMON_FEATURES
                .union(info.default_features)
                .difference(info.cleared_features),
            mixer: MixerConfig::default(),
            sensor_alignment: SensorAlignment::default(),
            board_alignment: BoardAlignment::default(),
            acc_hardware: 0,
            mag_hardware: 1,
            baro_hardware: 1,
            max_angle_inclination: 700,
            yaw_control_direction: 1,
            dcm_kp: 2500,
            dcm_ki: 0,
            acc_zero: Default::default(),
            gyro: GyroConfig::default(),
            battery: BatteryConfig::default(),
            telemetry: TelemetryConfig::default(),
            rx: RxConfig {
                serialrx_provider: info.serialrx_provider,
                ..RxConfig::default()
            },
            input_filtering_mode: 0,
            retarded_arm: 0,
            disarm_kill_switch: 1,
            auto_disarm_delay: 5,
            small_angle: 25,
            failsafe: FailsafeConfig::default(),
            esc_servo: EscServoConfig::default(),
            flight_3d: Flight3dConfig::default(),
            airplane: AirplaneConfig::default(),
            custom_motor_mix: [MotorMix::default(); MAX_SUPPORTED_MOTORS],
            motor_pwm_rate: if info.brushed_motors {
                BRUSHED_MOTORS_PWM_RATE
            } else {
                BRUSHLESS_MOTORS_PWM_RATE
            },
            servo_pwm_rate: 50,
            use_fast_pwm: 0,
            gps: GpsConfig::default(),
            serial: board_serial_config(info),
            emf_avoidance: 0,
            beeper_off_flags: 0,
            blackbox: BlackboxConfig {
                device: info.blackbox_device,
                ..BlackboxConfig::default()
            },
            profiles: core::array::from_fn(|_| Profile::default()),
            rate_profiles: [RateProfile::default(); MAX_RATE_PROFILE_COUNT],
        };

        if let Some(tuning) = &info.tuning {
            record.apply_tuning(tuning);
        }

        record.replicate_first_slots();
        record
    }

    fn apply_tuning(&mut self, tuning: &TuningOverrides) {
        if let Some(scale) = tuning.vbat_scale {
            self.battery.vbat_scale = scale;
        }
        self.rx.spektrum_sat_bind = tuning.spektrum_sat_bind;
        self.rx.apply_channel_map(tuning.channel_map);
        self.esc_servo.min_throttle = tuning.min_throttle;
        self.esc_servo.max_throttle = tuning.max_throttle;
        self.motor_pwm_rate = tuning.motor_pwm_rate;
        self.failsafe.delay = tuning.failsafe_delay;
        self.failsafe.off_delay = tuning.failsafe_off_delay;

        let pid = &mut self.profiles[0].pid;
        pid.p8[PID_ROLL] = tuning.roll_pitch_p;
        pid.p8[PID_PITCH] = tuning.roll_pitch_p;

        let rates = &mut self.rate_profiles[0];
        rates.rc_rate = tuning.rc_rate;
        rates.rates = tuning.rates;

        for (slot, mix) in self.custom_motor_mix.iter_mut().zip(tuning.custom_mix) {
            *slot = *mix;
        }
    }

    /// Copy slot 0 into every other profile and rate profile, and spread the
    /// profiles' default rate profile round-robin
    fn replicate_first_slots(&mut self) {
        let first_profile = self.profiles[0].clone();
        let first_rates = self.rate_profiles[0];

        for (i, profile) in self.profiles.iter_mut().enumerate().skip(1) {
            *profile = first_profile.clone();
            profile.default_rate_profile_index = (i % MAX_RATE_PROFILE_COUNT) as u8;
        }
        for rates in self.rate_profiles.iter_mut().skip(1) {
            *rates = first_rates;
        }
    }
}

/// Board default serial port layout
pub(crate) fn board_serial_config(info: &TargetInfo) -> SerialConfig {
    let mut serial = SerialConfig::new(info.serial_ports);
    for port in info.port_overrides {
        if let Some(config) = serial.ports.get_mut(port.index) {
            config.functions = port.functions;
            if let Some(baud) = port.msp_baud {
                config.msp_baud = baud;
            }
        }
    }
    serial
}
