//! RP2040-specific HAL for the flightcfg configuration store
//!
//! Provides the RP2040 implementation of the shared `flightcfg-hal` traits:
//!
//! - Flash driver for the reserved configuration sector (implements
//!   `flightcfg_hal::ConfigFlash`)

#![no_std]

pub mod flash;

pub use flash::Rp2040ConfigFlash;

// Re-export shared traits from flightcfg-hal for convenience
pub use flightcfg_hal::{ConfigFlash, FlashError, FlashRegion};
