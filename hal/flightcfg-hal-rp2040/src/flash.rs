//! Flash driver for RP2040
//!
//! The configuration image lives in the last erase sector of the external
//! QSPI flash. Addresses handed to [`ConfigFlash`] are offsets from the start
//! of flash, as embassy-rp expects.
//!
//! The RP2040 flash controller has no lock register or latched error flags,
//! so `lock`/`unlock` gate writes in software and `clear_fault_flags` only
//! resets the last recorded fault.

use embassy_rp::flash::{Blocking, Error, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use flightcfg_hal::{ConfigFlash, FlashError, FlashRegion, WORD_SIZE};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB on the Pico
pub const CONFIG_SECTOR_SIZE: usize = ERASE_SIZE; // one 4KB sector
pub const CONFIG_SECTOR_START: usize = FLASH_SIZE - CONFIG_SECTOR_SIZE;

/// Reserved configuration region
pub const CONFIG_REGION: FlashRegion = FlashRegion::new(
    CONFIG_SECTOR_START as u32,
    CONFIG_SECTOR_SIZE as u32,
    ERASE_SIZE as u32,
);

/// RP2040 configuration flash
pub struct Rp2040ConfigFlash<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    unlocked: bool,
    last_fault: Option<FlashError>,
}

impl<'d> Rp2040ConfigFlash<'d> {
    /// Create a new driver owning the flash peripheral
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
            unlocked: false,
            last_fault: None,
        }
    }

    /// Fault recorded by the most recent failed erase or program
    pub fn last_fault(&self) -> Option<FlashError> {
        self.last_fault
    }

    fn check_writable(&self, address: u32, len: u32) -> Result<(), FlashError> {
        if !self.unlocked {
            return Err(FlashError::WriteProtected);
        }
        if !CONFIG_REGION.contains(address, len) {
            return Err(FlashError::OutOfBounds);
        }
        Ok(())
    }

    fn record(&mut self, result: Result<(), FlashError>) -> Result<(), FlashError> {
        if let Err(e) = result {
            self.last_fault = Some(e);
        }
        result
    }
}

fn map_error(err: Error, fallback: FlashError) -> FlashError {
    match err {
        Error::OutOfBounds => FlashError::OutOfBounds,
        Error::Unaligned => FlashError::Alignment,
        _ => fallback,
    }
}

impl<'d> ConfigFlash for Rp2040ConfigFlash<'d> {
    fn region(&self) -> FlashRegion {
        CONFIG_REGION
    }

    fn unlock(&mut self) {
        self.unlocked = true;
    }

    fn lock(&mut self) {
        self.unlocked = false;
    }

    fn clear_fault_flags(&mut self) {
        self.last_fault = None;
    }

    fn erase_page(&mut self, address: u32) -> Result<(), FlashError> {
        self.check_writable(address, ERASE_SIZE as u32)?;
        let result = self
            .flash
            .blocking_erase(address, address + ERASE_SIZE as u32)
            .map_err(|e| map_error(e, FlashError::Erase));
        self.record(result)
    }

    fn program_word(&mut self, address: u32, word: u32) -> Result<(), FlashError> {
        if address % WORD_SIZE as u32 != 0 {
            return Err(FlashError::Alignment);
        }
        self.check_writable(address, WORD_SIZE as u32)?;
        let result = self
            .flash
            .blocking_write(address, &word.to_le_bytes())
            .map_err(|e| map_error(e, FlashError::Program));
        self.record(result)
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        if !CONFIG_REGION.contains(address, buf.len() as u32) {
            return Err(FlashError::OutOfBounds);
        }
        self.flash
            .blocking_read(address, buf)
            .map_err(|e| map_error(e, FlashError::Read))
    }
}
