//! Feature toggles
//!
//! Optional firmware capabilities, stored as one bitmask in the record. Many
//! bits compete for the same pins or timers; see [`crate::resolver`] for the
//! rules that keep them consistent.

use bitflags::bitflags;
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Bitmask of enabled firmware features
    ///
    /// Bit positions are part of the persisted format and must not move.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FeatureMask: u32 {
        // Receiver input methods (mutually exclusive)
        /// Pulse-position receiver on a single pin
        const RX_PPM = 1 << 0;
        /// Battery voltage monitoring
        const VBAT = 1 << 1;
        /// In-flight accelerometer calibration
        const INFLIGHT_ACC_CAL = 1 << 2;
        /// Serial receiver (SBUS, Spektrum, ...)
        const RX_SERIAL = 1 << 3;
        /// Keep motors stopped at low throttle
        const MOTOR_STOP = 1 << 4;
        /// Servo-driven camera tilt
        const SERVO_TILT = 1 << 5;
        /// Software-emulated serial ports on PWM pins
        const SOFTSERIAL = 1 << 6;
        const GPS = 1 << 7;
        const FAILSAFE = 1 << 8;
        /// Ultrasonic distance sensor
        const SONAR = 1 << 9;
        const TELEMETRY = 1 << 10;
        const CURRENT_METER = 1 << 11;
        /// Reversible ESCs
        const THREE_D = 1 << 12;
        /// One pin per receiver channel
        const RX_PARALLEL_PWM = 1 << 13;
        /// Receiver channels supplied over the management protocol
        const RX_MSP = 1 << 14;
        /// RSSI read from an analog pin
        const RSSI_ADC = 1 << 15;
        const LED_STRIP = 1 << 16;
        const DISPLAY = 1 << 17;
        /// OneShot125 ESC protocol
        const ONESHOT125 = 1 << 18;
        const BLACKBOX = 1 << 19;
        /// Forward receiver channels to servo outputs
        const CHANNEL_FORWARDING = 1 << 20;
        /// Multishot ESC protocol
        const MULTISHOT = 1 << 21;
    }
}

impl FeatureMask {
    /// All receiver input methods, highest priority first
    pub const RX_METHODS: FeatureMask = FeatureMask::RX_MSP
        .union(FeatureMask::RX_SERIAL)
        .union(FeatureMask::RX_PPM)
        .union(FeatureMask::RX_PARALLEL_PWM);

    /// Number of receiver input methods selected
    pub fn rx_method_count(&self) -> u32 {
        self.intersection(Self::RX_METHODS).bits().count_ones()
    }
}

impl MaxSize for FeatureMask {
    const POSTCARD_MAX_SIZE: usize = u32::POSTCARD_MAX_SIZE;
}

#[cfg(feature = "defmt")]
impl defmt::Format for FeatureMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FeatureMask({=u32:#x})", self.bits())
    }
}
