//! Configuration record model
//!
//! Types for everything persisted in the settings record, plus the
//! per-board default table used to build a fresh one.

pub mod defaults;
pub mod features;
pub mod profile;
pub mod rates;
pub mod record;
pub mod serial;
pub mod target;

pub use defaults::CONFIG_VERSION;
pub use features::FeatureMask;
pub use profile::{PidProfile, Profile};
pub use rates::RateProfile;
pub use record::ConfigRecord;
pub use serial::{SerialConfig, SerialFunction, SerialPortId};
pub use target::{Target, TargetInfo};

/// Number of tuning profile slots
pub const MAX_PROFILE_COUNT: usize = 3;
/// Number of rate profile slots
pub const MAX_RATE_PROFILE_COUNT: usize = 3;
/// Mode activation slots per profile
pub const MAX_MODE_ACTIVATION_CONDITIONS: usize = 20;
pub const MAX_SUPPORTED_SERVOS: usize = 8;
pub const MAX_SUPPORTED_MOTORS: usize = 12;
/// Receiver channels with failsafe settings
pub const MAX_RC_CHANNELS: usize = 18;
/// Roll, pitch, yaw and throttle
pub const NON_AUX_CHANNEL_COUNT: usize = 4;
/// Channels that can be reordered through the channel map
pub const MAX_MAPPABLE_RX_INPUTS: usize = 8;
pub const SERIAL_PORT_COUNT: usize = 5;
/// Gain sets in a PID profile
pub const PID_ITEM_COUNT: usize = 10;
/// Roll, pitch, yaw
pub const AXIS_COUNT: usize = 3;
