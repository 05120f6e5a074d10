//! The persisted settings record
//!
//! [`ConfigRecord`] is the single aggregate written to flash. Everything
//! that is not per-profile lives directly in it; per-profile tuning lives in
//! [`Profile`] and stick response in [`RateProfile`].

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use super::features::FeatureMask;
use super::profile::{AxisTrims, Profile};
use super::rates::RateProfile;
use super::serial::SerialConfig;
use super::{
    MAX_MAPPABLE_RX_INPUTS, MAX_PROFILE_COUNT, MAX_RATE_PROFILE_COUNT, MAX_RC_CHANNELS,
    MAX_SUPPORTED_MOTORS, NON_AUX_CHANNEL_COUNT,
};

/// Receiver channel index of throttle after mapping
pub const THROTTLE_CHANNEL: usize = 3;

/// Lowest pulse width representable as a failsafe step
const RXFAIL_STEP_MIN_US: u16 = 750;
/// Highest pulse width representable as a failsafe step
const RXFAIL_STEP_MAX_US: u16 = 2250;
/// Pulse width per failsafe step
const RXFAIL_STEP_US: u16 = 25;

/// Convert a pulse width to a failsafe step
pub fn channel_value_to_rxfail_step(value_us: u16) -> u8 {
    let clamped = value_us.clamp(RXFAIL_STEP_MIN_US, RXFAIL_STEP_MAX_US);
    ((clamped - RXFAIL_STEP_MIN_US) / RXFAIL_STEP_US) as u8
}

/// Mounting orientation of each sensor, 0 = board default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorAlignment {
    pub gyro: u8,
    pub acc: u8,
    pub mag: u8,
}

/// Rotation of the board relative to the airframe (degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardAlignment {
    pub roll_degrees: i16,
    pub pitch_degrees: i16,
    pub yaw_degrees: i16,
}

/// Gyro sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroConfig {
    /// Hardware low-pass selector
    pub lpf: u16,
    /// Movement threshold that aborts gyro calibration
    pub movement_calibration_threshold: u8,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            lpf: 4,
            movement_calibration_threshold: 64,
        }
    }
}

/// Current sensor source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurrentMeterType {
    None,
    /// Analog sensor on an ADC pin
    #[default]
    Adc,
    /// Estimated from throttle
    Virtual,
}

/// Battery monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryConfig {
    pub vbat_scale: u8,
    pub vbat_res_div_val: u8,
    pub vbat_res_div_multiplier: u8,
    /// Cell voltages in 0.1V
    pub vbat_max_cell_voltage: u8,
    pub vbat_min_cell_voltage: u8,
    pub vbat_warning_cell_voltage: u8,
    /// Current sensor offset (mV)
    pub current_meter_offset: i16,
    /// Current sensor scale (0.1mV/A)
    pub current_meter_scale: i16,
    /// Pack capacity (mAh), 0 = unknown
    pub battery_capacity: u16,
    pub current_meter_type: CurrentMeterType,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            vbat_scale: 110,
            vbat_res_div_val: 10,
            vbat_res_div_multiplier: 1,
            vbat_max_cell_voltage: 43,
            vbat_min_cell_voltage: 33,
            vbat_warning_cell_voltage: 35,
            current_meter_offset: 0,
            current_meter_scale: 400,
            battery_capacity: 0,
            current_meter_type: CurrentMeterType::Adc,
        }
    }
}

/// FrSky GPS coordinate encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrskyCoordinateFormat {
    #[default]
    Dms,
    Nmea,
}

/// FrSky unit system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrskyUnit {
    #[default]
    Metric,
    Imperial,
}

/// Telemetry output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryConfig {
    /// Invert the telemetry serial line
    pub inversion: bool,
    /// Enable telemetry only when armed via switch
    pub switch: bool,
    pub gps_no_fix_latitude: f32,
    pub gps_no_fix_longitude: f32,
    pub frsky_coordinate_format: FrskyCoordinateFormat,
    pub frsky_unit: FrskyUnit,
    pub frsky_vfas_precision: u8,
    /// HoTT alarm repeat interval (s)
    pub hott_alarm_interval: u8,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            inversion: false,
            switch: false,
            gps_no_fix_latitude: 0.0,
            gps_no_fix_longitude: 0.0,
            frsky_coordinate_format: FrskyCoordinateFormat::Dms,
            frsky_unit: FrskyUnit::Metric,
            frsky_vfas_precision: 0,
            hott_alarm_interval: 5,
        }
    }
}

/// Behaviour of one receiver channel when the link is lost
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxFailsafeMode {
    /// Channel-appropriate safe value
    #[default]
    Auto,
    /// Keep the last good value
    Hold,
    /// Use the configured step
    Set,
}

/// Failsafe setting for one receiver channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxFailsafeChannel {
    pub mode: RxFailsafeMode,
    /// Value in 25µs steps above 750µs
    pub step: u8,
}

/// Calibrated input range of one stick channel (µs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxChannelRange {
    pub min: u16,
    pub max: u16,
}

impl Default for RxChannelRange {
    fn default() -> Self {
        Self {
            min: 1000,
            max: 2000,
        }
    }
}

/// Receiver interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxConfig {
    /// Logical channel → physical input position
    pub rcmap: [u8; MAX_MAPPABLE_RX_INPUTS],
    /// Serial receiver protocol
    pub serialrx_provider: u8,
    pub spektrum_sat_bind: u8,
    pub midrc: u16,
    pub mincheck: u16,
    pub maxcheck: u16,
    /// Stick channels outside this range count as signal loss
    pub rx_min_usec: u16,
    pub rx_max_usec: u16,
    pub rssi_channel: u8,
    pub rssi_scale: u8,
    pub rssi_ppm_invert: u8,
    pub rc_smoothing: u8,
    pub failsafe_channels: [RxFailsafeChannel; MAX_RC_CHANNELS],
    pub channel_ranges: [RxChannelRange; NON_AUX_CHANNEL_COUNT],
}

impl Default for RxConfig {
    fn default() -> Self {
        let midrc = 1500;
        let rx_min_usec = 885;

        let mut failsafe_channels = [RxFailsafeChannel::default(); MAX_RC_CHANNELS];
        for (i, channel) in failsafe_channels.iter_mut().enumerate() {
            channel.mode = if i < NON_AUX_CHANNEL_COUNT {
                RxFailsafeMode::Auto
            } else {
                RxFailsafeMode::Hold
            };
            channel.step = if i == THROTTLE_CHANNEL {
                channel_value_to_rxfail_step(rx_min_usec)
            } else {
                channel_value_to_rxfail_step(midrc)
            };
        }

        let mut config = Self {
            rcmap: [0; MAX_MAPPABLE_RX_INPUTS],
            serialrx_provider: 0,
            spektrum_sat_bind: 0,
            midrc,
            mincheck: 1100,
            maxcheck: 1900,
            rx_min_usec,
            rx_max_usec: 2115,
            rssi_channel: 0,
            rssi_scale: 30,
            rssi_ppm_invert: 0,
            rc_smoothing: 0,
            failsafe_channels,
            channel_ranges: [RxChannelRange::default(); NON_AUX_CHANNEL_COUNT],
        };
        config.apply_channel_map("AETR1234");
        config
    }
}

impl RxConfig {
    /// Logical channel letters in `rcmap` order
    const CHANNEL_LETTERS: &'static [u8] = b"AERT12345678";

    /// Set `rcmap` from a channel order string such as `"TAER1234"`
    ///
    /// Each letter names the logical channel found at that input position;
    /// unknown letters are ignored.
    pub fn apply_channel_map(&mut self, map: &str) {
        for (position, letter) in map.bytes().enumerate() {
            let Some(channel) = Self::CHANNEL_LETTERS.iter().position(|&l| l == letter) else {
                continue;
            };
            if let Some(slot) = self.rcmap.get_mut(channel) {
                *slot = position as u8;
            }
        }
    }
}

/// Flight-controller failsafe stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FailsafeConfig {
    /// Guard time before failsafe engages (0.1s)
    pub delay: u8,
    /// Landing time before disarm (0.1s)
    pub off_delay: u8,
    /// Throttle while landing (µs)
    pub throttle: u16,
    pub kill_switch: u8,
    /// Time throttle must be low to skip landing (0.1s)
    pub throttle_low_delay: u16,
}

impl Default for FailsafeConfig {
    fn default() -> Self {
        Self {
            delay: 10,
            off_delay: 10,
            throttle: 1000,
            kill_switch: 0,
            throttle_low_delay: 100,
        }
    }
}

/// ESC and servo pulse limits (µs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EscServoConfig {
    pub min_throttle: u16,
    pub max_throttle: u16,
    pub min_command: u16,
    pub servo_center_pulse: u16,
}

impl Default for EscServoConfig {
    fn default() -> Self {
        Self {
            min_throttle: 1150,
            max_throttle: 1850,
            min_command: 1000,
            servo_center_pulse: 1500,
        }
    }
}

/// Reversible-ESC deadbands (µs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Flight3dConfig {
    pub deadband_low: u16,
    pub deadband_high: u16,
    pub neutral: u16,
    pub deadband_throttle: u16,
}

impl Default for Flight3dConfig {
    fn default() -> Self {
        Self {
            deadband_low: 1406,
            deadband_high: 1514,
            neutral: 1460,
            deadband_throttle: 50,
        }
    }
}

/// Airframe type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MixerMode {
    Tri,
    QuadP,
    #[default]
    QuadX,
    Bicopter,
    Gimbal,
    Y6,
    Hex6,
    FlyingWing,
    Y4,
    Hex6X,
    OctoX8,
    Airplane,
    /// Motor mix taken from the record
    Custom,
}

/// Motor mixer behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MixerConfig {
    pub mode: MixerMode,
    pub yaw_motor_direction: i8,
    pub yaw_jump_prevention_limit: u16,
    pub tri_unarmed_servo: u8,
    pub servo_lowpass_freq: u16,
    pub servo_lowpass_enable: u8,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            mode: MixerMode::QuadX,
            yaw_motor_direction: 1,
            yaw_jump_prevention_limit: 200,
            tri_unarmed_servo: 1,
            servo_lowpass_freq: 400,
            servo_lowpass_enable: 0,
        }
    }
}

/// Fixed-wing specifics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AirplaneConfig {
    /// Direction of throttle compensation in altitude hold
    pub fixedwing_althold_dir: i8,
}

impl Default for AirplaneConfig {
    fn default() -> Self {
        Self {
            fixedwing_althold_dir: 1,
        }
    }
}

/// One motor's share of each control input
///
/// A zero `throttle` marks the end of a custom mix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorMix {
    pub throttle: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl MotorMix {
    pub const fn new(throttle: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }
}

/// GPS receiver protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpsProvider {
    #[default]
    Nmea,
    Ublox,
}

/// Satellite-based augmentation region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SbasMode {
    #[default]
    Auto,
    Egnos,
    Waas,
    Msas,
    Gagan,
}

/// GPS receiver setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsConfig {
    pub provider: GpsProvider,
    pub sbas_mode: SbasMode,
    pub auto_config: bool,
    pub auto_baud: bool,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            provider: GpsProvider::Nmea,
            sbas_mode: SbasMode::Auto,
            auto_config: true,
            auto_baud: false,
        }
    }
}

/// Flight data recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlackboxConfig {
    /// 0 = serial port, 1 = onboard flash
    pub device: u8,
    pub rate_num: u8,
    pub rate_denom: u8,
}

impl Default for BlackboxConfig {
    fn default() -> Self {
        Self {
            device: 0,
            rate_num: 1,
            rate_denom: 1,
        }
    }
}

/// The complete persisted configuration
///
/// Built from target defaults by [`ConfigRecord::defaults`](super::defaults)
/// and owned by the store. The flash image header (version, size, magic,
/// checksum) frames the encoded record and is not part of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRecord {
    /// Active profile slot
    pub current_profile_index: u8,
    pub features: FeatureMask,
    pub mixer: MixerConfig,
    pub sensor_alignment: SensorAlignment,
    pub board_alignment: BoardAlignment,
    /// Sensor selection: 0 = autodetect, 1 = disabled, others force a part
    pub acc_hardware: u8,
    pub mag_hardware: u8,
    pub baro_hardware: u8,
    /// Angle-mode tilt limit (deg × 10)
    pub max_angle_inclination: u16,
    pub yaw_control_direction: i8,
    /// Attitude estimator gains (× 10000)
    pub dcm_kp: u16,
    pub dcm_ki: u16,
    /// Accelerometer calibration result
    pub acc_zero: AxisTrims,
    pub gyro: GyroConfig,
    pub battery: BatteryConfig,
    pub telemetry: TelemetryConfig,
    pub rx: RxConfig,
    pub input_filtering_mode: u8,
    pub retarded_arm: u8,
    pub disarm_kill_switch: u8,
    /// Seconds at low throttle before auto-disarm
    pub auto_disarm_delay: u8,
    /// Max tilt (deg) that still allows arming
    pub small_angle: u8,
    pub failsafe: FailsafeConfig,
    pub esc_servo: EscServoConfig,
    pub flight_3d: Flight3dConfig,
    pub airplane: AirplaneConfig,
    pub custom_motor_mix: [MotorMix; MAX_SUPPORTED_MOTORS],
    /// Motor and servo output rates (Hz)
    pub motor_pwm_rate: u16,
    pub servo_pwm_rate: u16,
    pub use_fast_pwm: u8,
    pub gps: GpsConfig,
    pub serial: SerialConfig,
    pub emf_avoidance: u8,
    pub beeper_off_flags: u32,
    pub blackbox: BlackboxConfig,
    pub profiles: [Profile; MAX_PROFILE_COUNT],
    pub rate_profiles: [RateProfile; MAX_RATE_PROFILE_COUNT],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rxfail_step_conversion() {
        assert_eq!(channel_value_to_rxfail_step(1500), 30);
        assert_eq!(channel_value_to_rxfail_step(885), 5);
        assert_eq!(channel_value_to_rxfail_step(100), 0);
        assert_eq!(channel_value_to_rxfail_step(3000), 60);
    }

    #[test]
    fn test_channel_map() {
        let mut rx = RxConfig::default();
        assert_eq!(rx.rcmap, [0, 1, 3, 2, 4, 5, 6, 7]);

        rx.apply_channel_map("TAER1234");
        assert_eq!(rx.rcmap, [1, 2, 3, 0, 4, 5, 6, 7]);
    }

    #[test]
    fn test_failsafe_channel_defaults() {
        let rx = RxConfig::default();
        assert_eq!(rx.failsafe_channels[0].mode, RxFailsafeMode::Auto);
        assert_eq!(rx.failsafe_channels[4].mode, RxFailsafeMode::Hold);
        assert_eq!(rx.failsafe_channels[THROTTLE_CHANNEL].step, 5);
        assert_eq!(rx.failsafe_channels[0].step, 30);
        assert_eq!(rx.failsafe_channels[17].step, 30);
    }
}
