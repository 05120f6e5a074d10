//! Board-agnostic core of the flight-controller configuration store
//!
//! This crate contains everything about persistent configuration that does
//! not depend on a specific chip:
//!
//! - Settings record model and per-target default table
//! - XOR checksum and fixed-size flash image codec
//! - Bounded-retry image writer over the `ConfigFlash` HAL trait
//! - Feature-flag conflict resolver
//! - Activation pipeline pushing settings into the rest of the firmware
//! - Profile selection and feature latching
//! - `ConfigStore` tying it all together
//! - Failure-mode indication for unrecoverable storage faults

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod logging;

pub mod activation;
pub mod config;
pub mod resolver;
pub mod runtime;
pub mod safety;
pub mod storage;
pub mod store;
pub mod traits;

pub use config::{ConfigRecord, FeatureMask, Target};
pub use resolver::FixReport;
pub use store::{ConfigStore, FailureReason};
pub use traits::Subsystems;
