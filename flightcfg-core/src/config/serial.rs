//! Serial port assignments

use bitflags::bitflags;
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use super::SERIAL_PORT_COUNT;

/// Maximum number of ports that may carry the management protocol
pub const MAX_MSP_PORT_COUNT: usize = 2;

bitflags! {
    /// Functions a serial port can carry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SerialFunction: u16 {
        /// Management protocol (configurator link)
        const MSP = 1 << 0;
        const GPS = 1 << 1;
        const TELEMETRY_FRSKY = 1 << 2;
        const TELEMETRY_HOTT = 1 << 3;
        const TELEMETRY_MSP = 1 << 4;
        const TELEMETRY_SMARTPORT = 1 << 5;
        const RX_SERIAL = 1 << 6;
        const BLACKBOX = 1 << 7;
    }
}

impl SerialFunction {
    /// Functions that may share a port with MSP
    pub const MSP_SHAREABLE: SerialFunction = SerialFunction::TELEMETRY_FRSKY
        .union(SerialFunction::TELEMETRY_HOTT)
        .union(SerialFunction::TELEMETRY_MSP)
        .union(SerialFunction::TELEMETRY_SMARTPORT)
        .union(SerialFunction::BLACKBOX);
}

impl MaxSize for SerialFunction {
    const POSTCARD_MAX_SIZE: usize = u16::POSTCARD_MAX_SIZE;
}

#[cfg(feature = "defmt")]
impl defmt::Format for SerialFunction {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SerialFunction({=u16:#x})", self.bits())
    }
}

/// Physical serial port
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialPortId {
    #[default]
    Usart1,
    Usart2,
    Usart3,
    Uart4,
    Uart5,
    UsbVcp,
    SoftSerial1,
    SoftSerial2,
}

/// Baud rate selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudRate {
    #[default]
    Auto,
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
    B230400,
    B250000,
}

/// Function and baud assignment for one port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialPortConfig {
    pub identifier: SerialPortId,
    pub functions: SerialFunction,
    pub msp_baud: BaudRate,
    pub gps_baud: BaudRate,
    pub telemetry_baud: BaudRate,
    pub blackbox_baud: BaudRate,
}

impl SerialPortConfig {
    /// Unassigned port with default baud selections
    pub const fn new(identifier: SerialPortId) -> Self {
        Self {
            identifier,
            functions: SerialFunction::empty(),
            msp_baud: BaudRate::B115200,
            gps_baud: BaudRate::B57600,
            telemetry_baud: BaudRate::Auto,
            blackbox_baud: BaudRate::B115200,
        }
    }

    /// Function combination allowed on a single port
    ///
    /// Only MSP may share a port, and only with telemetry or blackbox.
    fn has_valid_sharing(&self) -> bool {
        if self.functions.bits().count_ones() <= 1 {
            return true;
        }
        let others = self.functions.difference(SerialFunction::MSP);
        self.functions.contains(SerialFunction::MSP)
            && SerialFunction::MSP_SHAREABLE.contains(others)
            && others.bits().count_ones() == 1
    }
}

/// Assignments for every serial port on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    pub ports: [SerialPortConfig; SERIAL_PORT_COUNT],
    /// Character that reboots the board when received on an MSP port
    pub reboot_character: u8,
}

impl SerialConfig {
    /// Default assignment: MSP on the first port, everything else free
    pub fn new(identifiers: [SerialPortId; SERIAL_PORT_COUNT]) -> Self {
        let mut ports = identifiers.map(SerialPortConfig::new);
        ports[0].functions = SerialFunction::MSP;
        Self {
            ports,
            reboot_character: b'R',
        }
    }

    /// Whether any port with this identifier has a function assigned
    pub fn uses_port(&self, identifier: SerialPortId) -> bool {
        self.ports
            .iter()
            .any(|p| p.identifier == identifier && !p.functions.is_empty())
    }

    fn count_with(&self, function: SerialFunction) -> usize {
        self.ports
            .iter()
            .filter(|p| p.functions.contains(function))
            .count()
    }

    /// Check the assignment rules
    ///
    /// - at least one and at most [`MAX_MSP_PORT_COUNT`] MSP ports
    /// - at most one serial receiver port and at most one GPS port
    /// - only MSP may share a port, with one telemetry or blackbox function
    pub fn is_valid(&self) -> bool {
        let msp = self.count_with(SerialFunction::MSP);
        (1..=MAX_MSP_PORT_COUNT).contains(&msp)
            && self.count_with(SerialFunction::RX_SERIAL) <= 1
            && self.count_with(SerialFunction::GPS) <= 1
            && self.ports.iter().all(SerialPortConfig::has_valid_sharing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTS: [SerialPortId; SERIAL_PORT_COUNT] = [
        SerialPortId::UsbVcp,
        SerialPortId::Usart1,
        SerialPortId::Usart2,
        SerialPortId::Usart3,
        SerialPortId::SoftSerial1,
    ];

    #[test]
    fn test_default_config_is_valid() {
        let config = SerialConfig::new(PORTS);
        assert!(config.is_valid());
        assert_eq!(config.ports[0].functions, SerialFunction::MSP);
        assert_eq!(config.ports[1].gps_baud, BaudRate::B57600);
        assert_eq!(config.reboot_character, b'R');
    }

    #[test]
    fn test_no_msp_port_is_invalid() {
        let mut config = SerialConfig::new(PORTS);
        config.ports[0].functions = SerialFunction::GPS;
        assert!(!config.is_valid());
    }

    #[test]
    fn test_two_serial_receivers_is_invalid() {
        let mut config = SerialConfig::new(PORTS);
        config.ports[1].functions = SerialFunction::RX_SERIAL;
        config.ports[2].functions = SerialFunction::RX_SERIAL;
        assert!(!config.is_valid());
    }

    #[test]
    fn test_port_sharing_rules() {
        let mut config = SerialConfig::new(PORTS);
        config.ports[0].functions = SerialFunction::MSP | SerialFunction::TELEMETRY_FRSKY;
        assert!(config.is_valid());

        config.ports[0].functions = SerialFunction::MSP | SerialFunction::GPS;
        assert!(!config.is_valid());
    }

    #[test]
    fn test_uses_port() {
        let mut config = SerialConfig::new(PORTS);
        assert!(!config.uses_port(SerialPortId::Usart3));
        config.ports[3].functions = SerialFunction::GPS;
        assert!(config.uses_port(SerialPortId::Usart3));
    }
}
