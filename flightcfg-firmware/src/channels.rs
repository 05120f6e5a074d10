//! Inter-task communication
//!
//! Requests from the input tasks to the config task. Only the config task
//! touches the store.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicU8;

/// Switch to this tuning profile slot (persisted)
pub static PROFILE_CHANGE: Signal<CriticalSectionRawMutex, u8> = Signal::new();

/// Save the record and re-apply it
pub static SAVE_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Profile slot in use, published by the config task after every load
pub static CURRENT_PROFILE: AtomicU8 = AtomicU8::new(0);
