//! Flightcfg Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the configuration store needs from
//! a chip-specific HAL. The store itself never touches registers; it only
//! erases pages, programs words and reads back through [`ConfigFlash`], and
//! pauses receiver capture through [`RxSignal`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  flightcfg-core (ConfigStore, etc.)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flightcfg-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!         │                       │
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ flightcfg-hal-│       │   RamFlash    │
//! │    rp2040     │       │ (host model)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::ConfigFlash`] - Page-erasable, word-programmable config region
//! - [`rx::RxSignal`] - Receiver capture suspend/resume

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod rx;

// Re-export key traits at crate root for convenience
pub use flash::{ConfigFlash, FlashError, FlashRegion, RamFlash, ERASED_WORD, WORD_SIZE};
pub use rx::{NoRxSignal, RxSignal};
