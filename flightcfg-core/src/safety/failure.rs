//! Unrecoverable failure indication
//!
//! Once the store fails there is nothing safe left to run. The status LED
//! repeats a burst of flashes whose count identifies the reason, forever.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::store::FailureReason;

/// LED on and off time within a burst
pub const FLASH_MS: u32 = 150;
/// Dark time between bursts
pub const BURST_PAUSE_MS: u32 = 1500;

/// Flashes per burst for `reason`
pub fn blink_count(reason: FailureReason) -> u8 {
    match reason {
        FailureReason::InvalidStoredConfig(_) => 4,
        FailureReason::FlashWriteFailed(_) => 5,
        FailureReason::VerifyFailed => 6,
        FailureReason::EncodeFailed => 7,
        FailureReason::RegionTooSmall => 8,
    }
}

/// Emit one burst for `reason` and the pause after it
pub fn blink_burst<L: OutputPin, D: DelayNs>(reason: FailureReason, led: &mut L, delay: &mut D) {
    for _ in 0..blink_count(reason) {
        // Pin errors are ignored: there is no one left to report them to
        let _ = led.set_high();
        delay.delay_ms(FLASH_MS);
        let _ = led.set_low();
        delay.delay_ms(FLASH_MS);
    }
    delay.delay_ms(BURST_PAUSE_MS);
}

/// Blink the failure code forever
pub fn failure_mode<L: OutputPin, D: DelayNs>(
    reason: FailureReason,
    led: &mut L,
    delay: &mut D,
) -> ! {
    log_error!("Configuration failure: {:?}", reason);
    loop {
        blink_burst(reason, led, delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use flightcfg_hal::FlashError;

    use crate::storage::image::ImageError;
    use crate::storage::WriteError;

    #[derive(Default)]
    struct MockLed {
        rising_edges: u32,
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for MockLed {
        type Error = Infallible;
    }

    impl OutputPin for MockLed {
        fn set_high(&mut self) -> Result<(), Infallible> {
            if !self.high {
                self.rising_edges += 1;
            }
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let reasons = [
            FailureReason::InvalidStoredConfig(ImageError::Checksum),
            FailureReason::FlashWriteFailed(WriteError {
                attempts: 3,
                last_fault: FlashError::Program,
            }),
            FailureReason::VerifyFailed,
            FailureReason::EncodeFailed,
            FailureReason::RegionTooSmall,
        ];
        let mut codes: Vec<_> = reasons.iter().map(|&r| blink_count(r)).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), reasons.len());
    }

    #[test]
    fn test_burst_flashes_code_and_ends_dark() {
        let mut led = MockLed::default();
        let mut delay = MockDelay::default();

        blink_burst(FailureReason::VerifyFailed, &mut led, &mut delay);

        assert_eq!(led.rising_edges, 6);
        assert!(!led.high);
        let expected_ms = u64::from(6 * 2 * FLASH_MS + BURST_PAUSE_MS);
        assert_eq!(delay.total_ns, expected_ms * 1_000_000);
    }
}
