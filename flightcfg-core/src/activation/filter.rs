//! Gyro software filter tables
//!
//! Nine-tap FIR coefficients for a 1 kHz gyro loop, selected by the PID
//! profile's `gyro_soft_lpf`. Coefficients are scaled so each table sums to
//! roughly 256.

/// Taps per table
pub const FIR_TAP_COUNT: usize = 9;

/// One coefficient table
pub type FirCoefficients = [i8; FIR_TAP_COUNT];

/// Highest selectable filter level
pub const MAX_FILTER_LEVEL: u8 = GYRO_FIR_1KHZ.len() as u8;

static GYRO_FIR_1KHZ: [FirCoefficients; 3] = [
    // group delay 2.5ms, -5dB at 97Hz
    [0, 0, 12, 23, 40, 51, 52, 40, 38],
    // group delay 3ms, -5dB at 81Hz
    [18, 30, 42, 46, 40, 34, 22, 8, 8],
    // group delay 4ms, -5dB at 75Hz
    [18, 12, 28, 40, 44, 40, 32, 22, 20],
];

/// Coefficients for a filter level
///
/// Level 0 disables the filter; levels above [`MAX_FILTER_LEVEL`] use the
/// strongest table.
pub fn fir_coefficients(level: u8) -> Option<&'static FirCoefficients> {
    match level {
        0 => None,
        level => GYRO_FIR_1KHZ.get(usize::from(level.min(MAX_FILTER_LEVEL)) - 1),
    }
}
