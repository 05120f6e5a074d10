//! Config task
//!
//! Owns the store after boot and serves profile-change and save requests.
//! Any storage failure ends here in the blinking failure mode.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::Delay;
use portable_atomic::Ordering;

use flightcfg_core::safety::failure_mode;

use crate::channels::{CURRENT_PROFILE, PROFILE_CHANGE, SAVE_REQUEST};
use crate::subsystems::LoggingSubsystems;
use crate::FirmwareStore;

#[embassy_executor::task]
pub async fn config_task(
    store: &'static mut FirmwareStore,
    mut subsystems: LoggingSubsystems,
    mut led: Output<'static>,
) {
    info!("Config task started");

    loop {
        let result = match select(PROFILE_CHANGE.wait(), SAVE_REQUEST.wait()).await {
            Either::First(index) => {
                info!("Profile change to slot {} requested", index);
                store
                    .change_profile(usize::from(index), &mut subsystems)
                    .map(|profile| CURRENT_PROFILE.store(profile as u8, Ordering::Relaxed))
            }
            Either::Second(()) => {
                info!("Save requested");
                store.save_and_reload(&mut subsystems)
            }
        };

        if let Err(reason) = result {
            failure_mode(reason, &mut led, &mut Delay);
        }

        let delay_ms = store.motor_restart_delay_ms();
        if delay_ms > 0 {
            warn!("Motor protocol changed, motor restart delay {} ms", delay_ms);
        }
    }
}
