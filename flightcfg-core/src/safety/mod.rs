//! Failure handling
//!
//! Signals unrecoverable storage faults to the pilot.

pub mod failure;

pub use failure::{blink_count, failure_mode};
