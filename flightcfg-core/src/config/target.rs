//! Per-board default table
//!
//! Board differences (flash geometry, default features, which peripherals
//! share pins or timers, serial port layout, tuning for odd airframes) are
//! data. The record defaults, the resolver and the store look them up here
//! rather than branching on the board.

use super::features::FeatureMask;
use super::record::MotorMix;
use super::serial::{BaudRate, SerialFunction, SerialPortId};
use super::SERIAL_PORT_COUNT;

/// Microcontroller family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McuFamily {
    Stm32F1,
    Stm32F3,
    Stm32F4,
    Rp2040,
}

/// Where the configuration lives in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashGeometry {
    /// Address of the first flash byte
    pub base: u32,
    /// Total flash size in bytes
    pub size: u32,
    /// Erase granularity in bytes
    pub page_size: u32,
    /// Bytes reserved for the configuration image
    pub reserved: u32,
    /// Dedicated configuration sector, otherwise the end of flash
    pub config_address: Option<u32>,
}

impl FlashGeometry {
    /// Reserve the last 2KB (≤128KB parts) or 4KB of flash
    pub const fn end_of_flash(base: u32, size: u32, page_size: u32) -> Self {
        let reserved = if size <= 128 * 1024 { 0x800 } else { 0x1000 };
        Self {
            base,
            size,
            page_size,
            reserved,
            config_address: None,
        }
    }

    /// Start address of the configuration region
    pub const fn config_start(&self) -> u32 {
        match self.config_address {
            Some(address) => address,
            None => self.base + self.size - self.reserved,
        }
    }
}

/// Peripherals the board can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    pub gps: bool,
    pub baro: bool,
    pub servos: bool,
    pub led_strip: bool,
}

/// Features that share pins with parallel PWM receiver input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmContention {
    pub rssi_adc: bool,
    /// Only an ADC current meter contends
    pub current_meter_adc: bool,
    pub led_strip: bool,
}

impl PwmContention {
    const NONE: Self = Self {
        rssi_adc: false,
        current_meter_adc: false,
        led_strip: false,
    };

    const ALL: Self = Self {
        rssi_adc: true,
        current_meter_adc: true,
        led_strip: true,
    };
}

/// Board-specific mutual exclusions, applied in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExclusionRule {
    /// LED strip and soft serial share a timer: soft serial wins
    LedStripVsSoftSerial,
    /// Sonar and an ADC current meter cannot both run with parallel PWM
    SonarCurrentMeterOnParallelPwm,
    /// Sonar and an ADC current meter share a pin
    SonarVsCurrentMeter,
    /// Display and a used USART3 share pins: the port wins
    DisplayVsUsart3,
    /// Sonar and soft serial share a timer: soft serial wins
    SonarVsSoftSerial,
}

/// Default function assignment for one serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortOverride {
    pub index: usize,
    pub functions: SerialFunction,
    pub msp_baud: Option<BaudRate>,
}

/// Fixed serial layout enforced whenever a serial receiver is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialRxPinning {
    pub msp_port: usize,
    pub rx_port: usize,
    pub provider: u8,
}

/// Tuning for boards whose airframe differs from a stock quad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningOverrides {
    pub min_throttle: u16,
    pub max_throttle: u16,
    pub motor_pwm_rate: u16,
    pub roll_pitch_p: u8,
    pub rc_rate: u8,
    /// Roll, pitch, yaw rates
    pub rates: [u8; 3],
    pub failsafe_delay: u8,
    pub failsafe_off_delay: u8,
    pub vbat_scale: Option<u8>,
    pub spektrum_sat_bind: u8,
    pub channel_map: &'static str,
    pub custom_mix: &'static [MotorMix],
}

/// Everything that differs between boards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub name: &'static str,
    pub mcu: McuFamily,
    pub flash: FlashGeometry,
    /// Set on top of the common defaults
    pub default_features: FeatureMask,
    /// Cleared from the common defaults
    pub cleared_features: FeatureMask,
    pub capabilities: Capabilities,
    pub pwm_contention: PwmContention,
    pub exclusions: &'static [ExclusionRule],
    pub serialrx_provider: u8,
    pub serial_ports: [SerialPortId; SERIAL_PORT_COUNT],
    pub port_overrides: &'static [PortOverride],
    pub blackbox_device: u8,
    pub brushed_motors: bool,
    /// Hardware inverter on the telemetry line is always used
    pub forced_telemetry_inversion: bool,
    pub serialrx_pinning: Option<SerialRxPinning>,
    pub tuning: Option<TuningOverrides>,
}

/// Supported boards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    Naze,
    Cc3d,
    Cjmcu,
    SpRacingF3,
    ColibriRace,
    AlienWiiF3,
    Revo,
    Rp2040,
}

impl Target {
    /// Every board in the table
    pub const ALL: [Target; 8] = [
        Target::Naze,
        Target::Cc3d,
        Target::Cjmcu,
        Target::SpRacingF3,
        Target::ColibriRace,
        Target::AlienWiiF3,
        Target::Revo,
        Target::Rp2040,
    ];

    /// Table entry for this board
    pub const fn info(self) -> &'static TargetInfo {
        match self {
            Target::Naze => &NAZE,
            Target::Cc3d => &CC3D,
            Target::Cjmcu => &CJMCU,
            Target::SpRacingF3 => &SPRACINGF3,
            Target::ColibriRace => &COLIBRI_RACE,
            Target::AlienWiiF3 => &ALIENWIIF3,
            Target::Revo => &REVO,
            Target::Rp2040 => &RP2040,
        }
    }
}

const STM32_FLASH_BASE: u32 = 0x0800_0000;

/// SBUS serial receiver protocol id
pub const SERIALRX_SBUS: u8 = 2;

const F1_PORTS: [SerialPortId; SERIAL_PORT_COUNT] = [
    SerialPortId::Usart1,
    SerialPortId::Usart2,
    SerialPortId::SoftSerial1,
    SerialPortId::SoftSerial2,
    SerialPortId::Usart3,
];

const VCP_PORTS: [SerialPortId; SERIAL_PORT_COUNT] = [
    SerialPortId::UsbVcp,
    SerialPortId::Usart1,
    SerialPortId::Usart2,
    SerialPortId::Usart3,
    SerialPortId::SoftSerial1,
];

const ALL_CAPABILITIES: Capabilities = Capabilities {
    gps: true,
    baro: true,
    servos: true,
    led_strip: true,
};

const NAZE: TargetInfo = TargetInfo {
    name: "NAZE",
    mcu: McuFamily::Stm32F1,
    flash: FlashGeometry::end_of_flash(STM32_FLASH_BASE, 128 * 1024, 0x400),
    default_features: FeatureMask::VBAT,
    cleared_features: FeatureMask::empty(),
    capabilities: ALL_CAPABILITIES,
    pwm_contention: PwmContention::ALL,
    exclusions: &[
        ExclusionRule::LedStripVsSoftSerial,
        ExclusionRule::SonarCurrentMeterOnParallelPwm,
    ],
    serialrx_provider: 0,
    serial_ports: F1_PORTS,
    port_overrides: &[],
    blackbox_device: 0,
    brushed_motors: false,
    forced_telemetry_inversion: false,
    serialrx_pinning: None,
    tuning: None,
};

const CC3D: TargetInfo = TargetInfo {
    name: "CC3D",
    mcu: McuFamily::Stm32F1,
    flash: FlashGeometry::end_of_flash(STM32_FLASH_BASE, 128 * 1024, 0x400),
    default_features: FeatureMask::VBAT,
    cleared_features: FeatureMask::empty(),
    capabilities: ALL_CAPABILITIES,
    pwm_contention: PwmContention::ALL,
    exclusions: &[
        ExclusionRule::LedStripVsSoftSerial,
        ExclusionRule::DisplayVsUsart3,
        ExclusionRule::SonarVsSoftSerial,
    ],
    serialrx_provider: 0,
    serial_ports: [
        SerialPortId::UsbVcp,
        SerialPortId::Usart1,
        SerialPortId::Usart3,
        SerialPortId::SoftSerial1,
        SerialPortId::Usart2,
    ],
    // MSP on USART1 as well as VCP so the board can always be reconfigured
    port_overrides: &[PortOverride {
        index: 1,
        functions: SerialFunction::MSP,
        msp_baud: None,
    }],
    blackbox_device: 0,
    brushed_motors: false,
    forced_telemetry_inversion: false,
    serialrx_pinning: None,
    tuning: None,
};

const CJMCU: TargetInfo = TargetInfo {
    name: "CJMCU",
    mcu: McuFamily::Stm32F1,
    flash: FlashGeometry::end_of_flash(STM32_FLASH_BASE, 64 * 1024, 0x400),
    default_features: FeatureMask::RX_PPM,
    cleared_features: FeatureMask::empty(),
    capabilities: Capabilities {
        gps: false,
        baro: false,
        servos: false,
        led_strip: true,
    },
    pwm_contention: PwmContention::ALL,
    exclusions: &[],
    serialrx_provider: 0,
    serial_ports: F1_PORTS,
    port_overrides: &[],
    blackbox_device: 0,
    brushed_motors: true,
    forced_telemetry_inversion: false,
    serialrx_pinning: None,
    tuning: None,
};

const SPRACINGF3: TargetInfo = TargetInfo {
    name: "SPRACINGF3",
    mcu: McuFamily::Stm32F3,
    flash: FlashGeometry::end_of_flash(STM32_FLASH_BASE, 256 * 1024, 0x800),
    default_features: FeatureMask::VBAT.union(FeatureMask::BLACKBOX),
    cleared_features: FeatureMask::empty(),
    capabilities: ALL_CAPABILITIES,
    pwm_contention: PwmContention::NONE,
    exclusions: &[],
    serialrx_provider: 0,
    serial_ports: VCP_PORTS,
    port_overrides: &[],
    blackbox_device: 1,
    brushed_motors: false,
    forced_telemetry_inversion: true,
    serialrx_pinning: None,
    tuning: None,
};

const COLIBRI_RACE: TargetInfo = TargetInfo {
    name: "COLIBRI_RACE",
    mcu: McuFamily::Stm32F3,
    flash: FlashGeometry::end_of_flash(STM32_FLASH_BASE, 256 * 1024, 0x800),
    default_features: FeatureMask::VBAT.union(FeatureMask::RX_PPM),
    cleared_features: FeatureMask::empty(),
    capabilities: Capabilities {
        gps: true,
        baro: true,
        servos: true,
        led_strip: true,
    },
    pwm_contention: PwmContention::NONE,
    exclusions: &[],
    serialrx_provider: 0,
    serial_ports: VCP_PORTS,
    port_overrides: &[],
    blackbox_device: 0,
    brushed_motors: false,
    forced_telemetry_inversion: true,
    serialrx_pinning: Some(SerialRxPinning {
        msp_port: 0,
        rx_port: 2,
        provider: SERIALRX_SBUS,
    }),
    tuning: None,
};

/// Custom hex-X mix for the AlienWii frame
const ALIENWII_MIX: [MotorMix; 8] = [
    MotorMix::new(1.0, -0.414178, 1.0, -1.0),  // REAR_R
    MotorMix::new(1.0, -0.414178, -1.0, 1.0),  // FRONT_R
    MotorMix::new(1.0, 0.414178, 1.0, 1.0),    // REAR_L
    MotorMix::new(1.0, 0.414178, -1.0, -1.0),  // FRONT_L
    MotorMix::new(1.0, -1.0, -0.414178, -1.0), // MIDFRONT_R
    MotorMix::new(1.0, 1.0, -0.414178, 1.0),   // MIDFRONT_L
    MotorMix::new(1.0, -1.0, 0.414178, 1.0),   // MIDREAR_R
    MotorMix::new(1.0, 1.0, 0.414178, -1.0),   // MIDREAR_L
];

const ALIENWIIF3: TargetInfo = TargetInfo {
    name: "ALIENWIIF3",
    mcu: McuFamily::Stm32F3,
    flash: FlashGeometry::end_of_flash(STM32_FLASH_BASE, 256 * 1024, 0x800),
    default_features: FeatureMask::VBAT
        .union(FeatureMask::RX_SERIAL)
        .union(FeatureMask::MOTOR_STOP),
    cleared_features: FeatureMask::ONESHOT125,
    capabilities: ALL_CAPABILITIES,
    pwm_contention: PwmContention::NONE,
    exclusions: &[],
    serialrx_provider: 1,
    serial_ports: VCP_PORTS,
    port_overrides: &[PortOverride {
        index: 2,
        functions: SerialFunction::RX_SERIAL,
        msp_baud: None,
    }],
    blackbox_device: 0,
    brushed_motors: true,
    forced_telemetry_inversion: true,
    serialrx_pinning: None,
    tuning: Some(TuningOverrides {
        min_throttle: 1000,
        max_throttle: 2000,
        motor_pwm_rate: 32000,
        roll_pitch_p: 36,
        rc_rate: 40,
        rates: [20, 20, 100],
        failsafe_delay: 2,
        failsafe_off_delay: 0,
        vbat_scale: Some(20),
        spektrum_sat_bind: 5,
        channel_map: "TAER1234",
        custom_mix: &ALIENWII_MIX,
    }),
};

const REVO: TargetInfo = TargetInfo {
    name: "REVO",
    mcu: McuFamily::Stm32F4,
    flash: FlashGeometry {
        base: STM32_FLASH_BASE,
        size: 1024 * 1024,
        page_size: 0x20000,
        reserved: 0x1000,
        config_address: Some(0x0808_0000),
    },
    default_features: FeatureMask::VBAT
        .union(FeatureMask::RX_SERIAL)
        .union(FeatureMask::BLACKBOX),
    cleared_features: FeatureMask::empty(),
    capabilities: ALL_CAPABILITIES,
    pwm_contention: PwmContention::NONE,
    exclusions: &[],
    serialrx_provider: SERIALRX_SBUS,
    serial_ports: VCP_PORTS,
    port_overrides: &[
        PortOverride {
            index: 1,
            functions: SerialFunction::RX_SERIAL,
            msp_baud: None,
        },
        PortOverride {
            index: 2,
            functions: SerialFunction::MSP,
            msp_baud: Some(BaudRate::B9600),
        },
    ],
    blackbox_device: 1,
    brushed_motors: false,
    forced_telemetry_inversion: false,
    serialrx_pinning: None,
    tuning: None,
};

const RP2040: TargetInfo = TargetInfo {
    name: "RP2040",
    mcu: McuFamily::Rp2040,
    flash: FlashGeometry {
        base: 0,
        size: 2 * 1024 * 1024,
        page_size: 4096,
        reserved: 4096,
        config_address: Some(2 * 1024 * 1024 - 4096),
    },
    default_features: FeatureMask::empty(),
    cleared_features: FeatureMask::empty(),
    capabilities: Capabilities {
        gps: true,
        baro: false,
        servos: true,
        led_strip: false,
    },
    pwm_contention: PwmContention::NONE,
    exclusions: &[],
    serialrx_provider: 0,
    serial_ports: VCP_PORTS,
    port_overrides: &[],
    blackbox_device: 0,
    brushed_motors: false,
    forced_telemetry_inversion: false,
    serialrx_pinning: None,
    tuning: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_flash_reservation() {
        let small = FlashGeometry::end_of_flash(STM32_FLASH_BASE, 128 * 1024, 0x400);
        assert_eq!(small.reserved, 0x800);
        assert_eq!(small.config_start(), 0x0801_F800);

        let large = FlashGeometry::end_of_flash(STM32_FLASH_BASE, 256 * 1024, 0x800);
        assert_eq!(large.reserved, 0x1000);
        assert_eq!(large.config_start(), 0x0803_F000);
    }

    #[test]
    fn test_dedicated_config_sector() {
        assert_eq!(Target::Revo.info().flash.config_start(), 0x0808_0000);
    }

    #[test]
    fn test_board_names_are_unique() {
        for (i, a) in Target::ALL.iter().enumerate() {
            for b in &Target::ALL[i + 1..] {
                assert_ne!(a.info().name, b.info().name);
            }
        }
        assert_eq!(Target::Rp2040.info().mcu, McuFamily::Rp2040);
        assert_eq!(Target::Revo.info().mcu, McuFamily::Stm32F4);
    }

    #[test]
    fn test_config_region_is_page_aligned() {
        for target in Target::ALL {
            let flash = target.info().flash;
            let offset = flash.config_start() - flash.base;
            assert_eq!(offset % flash.page_size.min(flash.reserved), 0, "{:?}", target);
        }
    }
}
