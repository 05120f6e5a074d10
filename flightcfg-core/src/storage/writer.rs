//! Image writer
//!
//! Writes a complete image into the configuration region one flash
//! operation at a time:
//!
//! ```text
//! Idle ──► Erasing(page) ──► Programming(word) ──► ... ──► Complete
//!               │                   │
//!               └───────┬───────────┘
//!                       ▼
//!                 Fault(error) ──► (next attempt from offset 0, up to WRITE_ATTEMPTS)
//! ```
//!
//! A page is erased whenever the next word starts it. Any failed operation
//! abandons the attempt; the next attempt clears the fault flags and starts
//! over from the first page. The flash is unlocked for the whole sequence
//! and locked again once the writer finishes either way.

use flightcfg_hal::{ConfigFlash, FlashError, WORD_SIZE};

/// Full erase+program passes before giving up
pub const WRITE_ATTEMPTS: u8 = 3;

/// Writer progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteState {
    /// Nothing started yet
    Idle,
    /// Next operation erases the page at this address
    Erasing { page: u32 },
    /// Next operation programs the word at this image offset
    Programming { offset: u32 },
    /// Every word written
    Complete,
    /// The current attempt failed
    Fault(FlashError),
}

/// Every attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteError {
    /// Attempts made
    pub attempts: u8,
    /// Fault that ended the final attempt
    pub last_fault: FlashError,
}

/// Bounded-retry erase/program sequence for one image
pub struct ImageWriter<'a, F: ConfigFlash> {
    flash: &'a mut F,
    image: &'a [u8],
    state: WriteState,
    attempt: u8,
}

impl<'a, F: ConfigFlash> ImageWriter<'a, F> {
    /// Prepare to write `image` at the start of the flash region
    ///
    /// `image` length must be a multiple of [`WORD_SIZE`] and fit the region.
    pub fn new(flash: &'a mut F, image: &'a [u8]) -> Self {
        Self {
            flash,
            image,
            state: WriteState::Idle,
            attempt: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Attempts started so far
    pub fn attempt(&self) -> u8 {
        self.attempt
    }

    /// Whether no further [`step`](Self::step) will change the state
    pub fn is_finished(&self) -> bool {
        match self.state {
            WriteState::Complete => true,
            WriteState::Fault(_) => self.attempt >= WRITE_ATTEMPTS,
            _ => false,
        }
    }

    /// Perform the next flash operation and return the new state
    pub fn step(&mut self) -> WriteState {
        if self.is_finished() {
            return self.state;
        }

        let region = self.flash.region();
        let state = self.state;

        self.state = match state {
            WriteState::Idle | WriteState::Fault(_) => self.begin_attempt(region.start),
            WriteState::Erasing { page } => match self.flash.erase_page(page) {
                Ok(()) => WriteState::Programming {
                    offset: page - region.start,
                },
                Err(e) => WriteState::Fault(e),
            },
            WriteState::Programming { offset } => {
                let at = offset as usize;
                let mut word = [0u8; WORD_SIZE];
                word.copy_from_slice(&self.image[at..at + WORD_SIZE]);

                match self
                    .flash
                    .program_word(region.start + offset, u32::from_le_bytes(word))
                {
                    Ok(()) => {
                        self.after_word(offset + WORD_SIZE as u32, region.start, region.page_size)
                    }
                    Err(e) => WriteState::Fault(e),
                }
            }
            WriteState::Complete => WriteState::Complete,
        };

        if let WriteState::Fault(e) = self.state {
            log_warn!("Flash write attempt {} failed: {:?}", self.attempt, e);
        }
        if self.is_finished() {
            self.flash.lock();
        }

        self.state
    }

    /// Step until complete or out of attempts
    ///
    /// Returns the number of attempts used on success.
    pub fn run(mut self) -> Result<u8, WriteError> {
        while !self.is_finished() {
            self.step();
        }

        match self.state {
            WriteState::Fault(last_fault) => Err(WriteError {
                attempts: self.attempt,
                last_fault,
            }),
            _ => Ok(self.attempt),
        }
    }

    fn begin_attempt(&mut self, start: u32) -> WriteState {
        if self.attempt == 0 {
            self.flash.unlock();
        }
        self.attempt += 1;
        self.flash.clear_fault_flags();
        log_debug!("Flash write attempt {}", self.attempt);

        if self.image.is_empty() {
            WriteState::Complete
        } else {
            WriteState::Erasing { page: start }
        }
    }

    fn after_word(&self, next: u32, start: u32, page_size: u32) -> WriteState {
        if next as usize >= self.image.len() {
            WriteState::Complete
        } else if next % page_size == 0 {
            WriteState::Erasing { page: start + next }
        } else {
            WriteState::Programming { offset: next }
        }
    }
}
