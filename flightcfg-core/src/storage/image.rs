//! Flash image codec
//!
//! The record is stored as one fixed-size image:
//!
//! ```text
//! offset 0            version      u8
//! offset 1..3         size         u16 LE, always IMAGE_SIZE
//! offset 3            magic        0xBE
//! offset 4            magic        0xEF
//! offset 5..N-1       payload      postcard-encoded ConfigRecord, zero padded
//! offset N-1          checksum     XOR closure byte
//! ```
//!
//! The image size is fixed at compile time so stale or foreign flash content
//! is rejected by the size field even when the payload happens to decode.

use flightcfg_hal::{FlashError, WORD_SIZE};
use postcard::experimental::max_size::MaxSize;

use super::checksum;
use crate::config::{ConfigRecord, Target, CONFIG_VERSION};

/// Size of the stored image in bytes
pub const IMAGE_SIZE: usize = 2048;

/// First magic byte
pub const MAGIC_BE: u8 = 0xBE;
/// Second magic byte
pub const MAGIC_EF: u8 = 0xEF;

/// Version, size and two magic bytes
pub const HEADER_SIZE: usize = 5;

/// Bytes available for the encoded record
pub const PAYLOAD_CAPACITY: usize = IMAGE_SIZE - HEADER_SIZE - 1;

const CHECKSUM_OFFSET: usize = IMAGE_SIZE - 1;

// Build-time layout contracts
const _: () = assert!(IMAGE_SIZE % WORD_SIZE == 0);
const _: () = assert!(IMAGE_SIZE <= u16::MAX as usize);
const _: () = assert!(
    ConfigRecord::POSTCARD_MAX_SIZE <= PAYLOAD_CAPACITY,
    "ConfigRecord does not fit the image payload"
);
const _: () = {
    let mut i = 0;
    while i < Target::ALL.len() {
        assert!(
            IMAGE_SIZE as u32 <= Target::ALL[i].info().flash.reserved,
            "image does not fit a target's reserved flash"
        );
        i += 1;
    }
};

/// One complete flash image
pub type ImageBuffer = [u8; IMAGE_SIZE];

/// Why a stored image was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// The region could not be read at all
    Read(FlashError),
    /// Written by a different settings layout
    Version(u8),
    /// Size field does not match this build
    Size(u16),
    /// Magic bytes missing (blank or foreign flash)
    Magic,
    /// XOR over the image is not zero
    Checksum,
    /// Header and checksum are fine but the payload does not decode
    Decode,
}

/// Encoding failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodeError;

impl From<postcard::Error> for EncodeError {
    fn from(_: postcard::Error) -> Self {
        EncodeError
    }
}

/// Serialize `record` into `image`, stamping header and checksum
pub fn encode(record: &ConfigRecord, image: &mut ImageBuffer) -> Result<(), EncodeError> {
    image.fill(0);

    image[0] = CONFIG_VERSION;
    image[1..3].copy_from_slice(&(IMAGE_SIZE as u16).to_le_bytes());
    image[3] = MAGIC_BE;
    image[4] = MAGIC_EF;

    postcard::to_slice(record, &mut image[HEADER_SIZE..CHECKSUM_OFFSET])?;

    checksum::stamp(image);
    Ok(())
}

/// Check header and checksum, in that order
pub fn check(image: &ImageBuffer) -> Result<(), ImageError> {
    if image[0] != CONFIG_VERSION {
        return Err(ImageError::Version(image[0]));
    }

    let size = u16::from_le_bytes([image[1], image[2]]);
    if size as usize != IMAGE_SIZE {
        return Err(ImageError::Size(size));
    }
    if image[3] != MAGIC_BE || image[4] != MAGIC_EF {
        return Err(ImageError::Magic);
    }

    if !checksum::verify(image) {
        return Err(ImageError::Checksum);
    }

    Ok(())
}

/// Check and decode a stored image
pub fn decode(image: &ImageBuffer) -> Result<ConfigRecord, ImageError> {
    check(image)?;
    let (record, _padding) =
        postcard::take_from_bytes(&image[HEADER_SIZE..CHECKSUM_OFFSET])
            .map_err(|_| ImageError::Decode)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_defaults() -> ImageBuffer {
        let mut image = [0u8; IMAGE_SIZE];
        encode(&ConfigRecord::defaults(Target::Naze), &mut image).unwrap();
        image
    }

    #[test]
    fn test_encode_stamps_header() {
        let image = encoded_defaults();
        assert_eq!(image[0], CONFIG_VERSION);
        assert_eq!(u16::from_le_bytes([image[1], image[2]]) as usize, IMAGE_SIZE);
        assert_eq!(&image[3..5], &[MAGIC_BE, MAGIC_EF]);
        assert_eq!(check(&image), Ok(()));
    }

    #[test]
    fn test_decode_roundtrip() {
        let record = ConfigRecord::defaults(Target::AlienWiiF3);
        let mut image = [0u8; IMAGE_SIZE];
        encode(&record, &mut image).unwrap();
        assert_eq!(decode(&image), Ok(record));
    }

    #[test]
    fn test_check_order() {
        assert_eq!(check(&[0u8; IMAGE_SIZE]), Err(ImageError::Version(0)));
        assert_eq!(check(&[0xFF; IMAGE_SIZE]), Err(ImageError::Version(0xFF)));

        let mut image = encoded_defaults();
        image[1] = 0x00;
        image[2] = 0x04;
        assert_eq!(check(&image), Err(ImageError::Size(0x0400)));

        let mut image = encoded_defaults();
        image[4] = 0x00;
        assert_eq!(check(&image), Err(ImageError::Magic));

        let mut image = encoded_defaults();
        image[100] ^= 0x01;
        assert_eq!(check(&image), Err(ImageError::Checksum));
    }

    #[test]
    fn test_undecodable_payload_rejected() {
        let mut image = encoded_defaults();
        // An all-0xFF varint overflows; reclose the checksum afterwards
        image[HEADER_SIZE..CHECKSUM_OFFSET].fill(0xFF);
        checksum::stamp(&mut image);
        assert_eq!(check(&image), Ok(()));
        assert_eq!(decode(&image), Err(ImageError::Decode));
    }

    #[test]
    fn test_record_fits_with_headroom() {
        assert!(ConfigRecord::POSTCARD_MAX_SIZE <= PAYLOAD_CAPACITY);
    }
}
