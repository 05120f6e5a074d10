//! Persistent image storage
//!
//! - [`checksum`] - XOR closure over the image
//! - [`image`] - fixed-size image layout, encode/check/decode
//! - [`writer`] - bounded-retry erase/program state machine

pub mod checksum;
pub mod image;
pub mod writer;

pub use image::{ImageBuffer, ImageError, IMAGE_SIZE};
pub use writer::{ImageWriter, WriteError, WriteState, WRITE_ATTEMPTS};
