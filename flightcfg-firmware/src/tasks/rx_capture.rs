//! Receiver pulse capture
//!
//! Measures high-time on the receiver input. Edges are dropped while the
//! store has capture suspended.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;

use crate::rx::capture_suspended;

#[embassy_executor::task]
pub async fn rx_capture_task(mut input: Input<'static>) {
    info!("RX capture task started");

    let mut rising_at: Option<Instant> = None;

    loop {
        input.wait_for_any_edge().await;
        let now = Instant::now();

        if capture_suspended() {
            rising_at = None;
            continue;
        }

        if input.is_high() {
            rising_at = Some(now);
        } else if let Some(start) = rising_at.take() {
            trace!("RX pulse {} us", (now - start).as_micros());
        }
    }
}
