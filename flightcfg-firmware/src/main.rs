//! Flightcfg - Flight-controller configuration firmware
//!
//! Boots the configuration store on an RP2040 board: validates the stored
//! record (restoring defaults if needed), loads it, fixes feature conflicts
//! and activates it, then hands the store to the config task.
//!
//! Any storage failure at boot blinks the failure code on the status LED
//! forever.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::Delay;
use portable_atomic::Ordering;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use flightcfg_core::safety::failure_mode;
use flightcfg_core::{ConfigStore, FailureReason, Target};
use flightcfg_hal_rp2040::Rp2040ConfigFlash;

mod channels;
mod rx;
mod subsystems;
mod tasks;

use crate::channels::CURRENT_PROFILE;
use crate::rx::CaptureGate;
use crate::subsystems::LoggingSubsystems;

/// Default table entry for this board
const TARGET: Target = Target::Rp2040;

pub type FirmwareStore = ConfigStore<Rp2040ConfigFlash<'static>, CaptureGate>;

// The store holds the record and a full image buffer; keep it off the stack
static STORE: StaticCell<FirmwareStore> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Flightcfg firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Pico on-board LED
    let mut led = Output::new(p.PIN_25, Level::Low);
    let mut subsystems = LoggingSubsystems::new();

    let flash = Rp2040ConfigFlash::new(p.FLASH);
    let store = match boot(flash, &mut subsystems) {
        Ok(store) => store,
        Err(reason) => failure_mode(reason, &mut led, &mut Delay),
    };

    // Board pin assignments: profile button on GPIO14, receiver on GPIO15
    let button = Input::new(p.PIN_14, Pull::Up);
    let rx_input = Input::new(p.PIN_15, Pull::Down);

    spawner.spawn(unwrap!(tasks::config_task(store, subsystems, led)));
    spawner.spawn(unwrap!(tasks::button_task(button)));
    spawner.spawn(unwrap!(tasks::rx_capture_task(rx_input)));

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Bring the store up: self-heal, load, latch
fn boot(
    flash: Rp2040ConfigFlash<'static>,
    subsystems: &mut LoggingSubsystems,
) -> Result<&'static mut FirmwareStore, FailureReason> {
    let board = TARGET.info();
    info!("Board {} ({:?})", board.name, board.mcu);

    let store = STORE.init(ConfigStore::new(flash, CaptureGate, TARGET)?);

    store.ensure_valid()?;
    let report = store.load(subsystems)?;
    if !report.is_empty() {
        warn!("Fixed {} feature conflict(s) in stored config", report.fixes().len());
    }

    // Motor protocol and similar features only change on reboot
    store.latch_active_features();
    CURRENT_PROFILE.store(store.selector().profile() as u8, Ordering::Relaxed);

    info!(
        "Config loaded: profile {}, rate profile {}",
        store.selector().profile(),
        store.selector().rate_profile()
    );
    Ok(store)
}
