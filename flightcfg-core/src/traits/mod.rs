//! Interfaces to the rest of the firmware
//!
//! Flash and receiver access live in the HAL crate; this module holds the
//! contract for consumers of the activated settings.

pub mod subsystems;

pub use subsystems::{
    AltHoldSettings, ImuRuntimeConfig, ImuSettings, MixerSettings, RcControlsSettings,
    ServoSettings, Subsystems,
};
