//! XOR checksum
//!
//! The last byte of an image is chosen so the XOR of every byte, including
//! itself, is zero. Validity can then be checked without a reference value.

/// Running XOR of every byte
pub fn checksum(bytes: &[u8]) -> u8 {
    let mut checksum = 0u8;
    for &byte in bytes {
        checksum ^= byte;
    }
    checksum
}

/// Write the closing checksum into the last byte of `image`
///
/// Does nothing on an empty slice.
pub fn stamp(image: &mut [u8]) {
    let Some((last, body)) = image.split_last_mut() else {
        return;
    };
    *last = 0;
    *last = checksum(body);
}

/// Whether `image` XORs to zero
pub fn verify(image: &[u8]) -> bool {
    checksum(image) == 0
}
