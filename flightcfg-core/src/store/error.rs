//! Store failures
//!
//! Every variant is fatal: the firmware cannot fly on settings it cannot
//! trust, so callers hand these to [`crate::safety::failure_mode`].

use crate::storage::image::{EncodeError, ImageError};
use crate::storage::WriteError;

/// Why the store gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureReason {
    /// `load` found an image that does not validate
    InvalidStoredConfig(ImageError),
    /// Every erase/program attempt faulted
    FlashWriteFailed(WriteError),
    /// The write completed but reading it back did not match
    VerifyFailed,
    /// The record did not serialize into the image
    EncodeFailed,
    /// The flash region cannot hold an image
    RegionTooSmall,
}

impl From<ImageError> for FailureReason {
    fn from(e: ImageError) -> Self {
        FailureReason::InvalidStoredConfig(e)
    }
}

impl From<WriteError> for FailureReason {
    fn from(e: WriteError) -> Self {
        FailureReason::FlashWriteFailed(e)
    }
}

impl From<EncodeError> for FailureReason {
    fn from(_: EncodeError) -> Self {
        FailureReason::EncodeFailed
    }
}
