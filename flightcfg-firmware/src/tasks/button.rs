//! Profile button
//!
//! A short press steps to the next tuning profile. Holding the button for
//! a second saves the current record.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::Ordering;

use flightcfg_core::config::MAX_PROFILE_COUNT;

use crate::channels::{CURRENT_PROFILE, PROFILE_CHANGE, SAVE_REQUEST};

const DEBOUNCE_MS: u64 = 20;
const LONG_PRESS: Duration = Duration::from_millis(1000);

/// Button is active low with the internal pull-up
#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>) {
    info!("Button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if button.is_high() {
            continue;
        }

        let pressed_at = Instant::now();
        button.wait_for_rising_edge().await;

        if pressed_at.elapsed() >= LONG_PRESS {
            SAVE_REQUEST.signal(());
        } else {
            let next = (CURRENT_PROFILE.load(Ordering::Relaxed) + 1) % MAX_PROFILE_COUNT as u8;
            PROFILE_CHANGE.signal(next);
        }
    }
}
