//! Flash storage abstractions
//!
//! Models the reserved configuration region of on-chip flash: a fixed,
//! page-aligned block that is erased a page at a time and programmed a word
//! at a time.
//!
//! # Flash Characteristics
//!
//! - Erase sets every byte of a page to 0xFF
//! - Program can only change bits from 1 to 0 (erase first to get them back)
//! - Programming is word-granular (4 bytes, little-endian)
//! - A failed operation latches a hardware fault flag until it is cleared

/// Programming granularity in bytes
pub const WORD_SIZE: usize = 4;

/// Value of a freshly erased word
pub const ERASED_WORD: u32 = 0xFFFF_FFFF;

/// Location and geometry of the reserved configuration region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashRegion {
    /// Absolute address of the first byte of the region
    pub start: u32,
    /// Reserved size in bytes
    pub size: u32,
    /// Erase granularity in bytes
    pub page_size: u32,
}

impl FlashRegion {
    /// Create a region descriptor
    pub const fn new(start: u32, size: u32, page_size: u32) -> Self {
        Self {
            start,
            size,
            page_size,
        }
    }

    /// One past the last address of the region
    pub const fn end(&self) -> u32 {
        self.start + self.size
    }

    /// Check that `len` bytes starting at `address` lie inside the region
    pub const fn contains(&self, address: u32, len: u32) -> bool {
        address >= self.start && address + len <= self.end()
    }
}

/// Errors from flash operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Page erase did not complete
    Erase,
    /// Word program did not complete
    Program,
    /// Flash is locked or the page is write-protected
    WriteProtected,
    /// Address is not aligned to a word (program) or page (erase)
    Alignment,
    /// Access falls outside the reserved region
    OutOfBounds,
    /// Read-back failed
    Read,
}

/// Reserved configuration region in on-chip flash
///
/// Implementations talk to the flash controller directly. Callers are
/// expected to bracket a write sequence with [`unlock`](Self::unlock) and
/// [`lock`](Self::lock), and to call
/// [`clear_fault_flags`](Self::clear_fault_flags) before retrying after a
/// failure.
pub trait ConfigFlash {
    /// The reserved region this driver may touch
    fn region(&self) -> FlashRegion;

    /// Enable erase/program access to the flash controller
    fn unlock(&mut self);

    /// Disable erase/program access
    fn lock(&mut self);

    /// Clear latched end-of-operation and error flags
    fn clear_fault_flags(&mut self);

    /// Erase the page starting at `address`
    ///
    /// `address` must be page-aligned and inside [`region`](Self::region).
    fn erase_page(&mut self, address: u32) -> Result<(), FlashError>;

    /// Program one little-endian word at `address`
    ///
    /// `address` must be word-aligned. Only bits that are currently 1 can
    /// be changed.
    fn program_word(&mut self, address: u32, word: u32) -> Result<(), FlashError>;

    /// Read `buf.len()` bytes starting at `address`
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError>;
}

impl<T: ConfigFlash + ?Sized> ConfigFlash for &mut T {
    fn region(&self) -> FlashRegion {
        (**self).region()
    }

    fn unlock(&mut self) {
        (**self).unlock();
    }

    fn lock(&mut self) {
        (**self).lock();
    }

    fn clear_fault_flags(&mut self) {
        (**self).clear_fault_flags();
    }

    fn erase_page(&mut self, address: u32) -> Result<(), FlashError> {
        (**self).erase_page(address)
    }

    fn program_word(&mut self, address: u32, word: u32) -> Result<(), FlashError> {
        (**self).program_word(address, word)
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        (**self).read(address, buf)
    }
}

/// In-memory flash region
///
/// Behaves like a real NOR region (erase to 0xFF, program by AND-ing bits,
/// lock/unlock, sticky fault flag) and supports fault injection, so the
/// store's retry and verification paths can be exercised on the host.
///
/// # Example
///
/// ```
/// use flightcfg_hal::{ConfigFlash, RamFlash};
///
/// let mut flash = RamFlash::<2048>::new(0x0801_F800, 1024);
/// flash.unlock();
/// flash.erase_page(0x0801_F800).unwrap();
/// flash.program_word(0x0801_F800, 0x1234_5678).unwrap();
///
/// let mut buf = [0u8; 4];
/// flash.read(0x0801_F800, &mut buf).unwrap();
/// assert_eq!(buf, 0x1234_5678u32.to_le_bytes());
/// ```
#[derive(Debug, Clone)]
pub struct RamFlash<const N: usize> {
    region: FlashRegion,
    data: [u8; N],
    locked: bool,
    fault_latched: bool,
    failing_erases: u32,
    failing_programs: u32,
    always_fail: bool,
    stuck_bits: Option<(usize, u8)>,
    erase_count: u32,
    program_count: u32,
    clear_count: u32,
}

impl<const N: usize> RamFlash<N> {
    /// Create an erased, locked region of `N` bytes at `start`
    pub const fn new(start: u32, page_size: u32) -> Self {
        Self {
            region: FlashRegion::new(start, N as u32, page_size),
            data: [0xFF; N],
            locked: true,
            fault_latched: false,
            failing_erases: 0,
            failing_programs: 0,
            always_fail: false,
            stuck_bits: None,
            erase_count: 0,
            program_count: 0,
            clear_count: 0,
        }
    }

    /// Raw region contents
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Overwrite the whole region with `byte` (blank, zeroed or garbage flash)
    pub fn fill(&mut self, byte: u8) {
        self.data = [byte; N];
    }

    /// Overwrite region contents starting at `offset`, bypassing erase rules
    pub fn write_raw(&mut self, offset: usize, bytes: &[u8]) {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// XOR `mask` into the byte at `offset` (bit-rot)
    pub fn corrupt(&mut self, offset: usize, mask: u8) {
        self.data[offset] ^= mask;
    }

    /// Make the next `count` page erases fail
    pub fn fail_next_erases(&mut self, count: u32) {
        self.failing_erases = count;
    }

    /// Make the next `count` word programs fail
    pub fn fail_next_programs(&mut self, count: u32) {
        self.failing_programs = count;
    }

    /// Make every erase and program fail until cleared with `false`
    pub fn set_always_fail(&mut self, fail: bool) {
        self.always_fail = fail;
    }

    /// Bits in `mask` at `offset` can no longer be programmed to 0
    pub fn stick_bits(&mut self, offset: usize, mask: u8) {
        self.stuck_bits = Some((offset, mask));
    }

    /// Number of page erases performed
    pub fn erase_count(&self) -> u32 {
        self.erase_count
    }

    /// Number of word programs attempted
    pub fn program_count(&self) -> u32 {
        self.program_count
    }

    /// Number of fault-flag clears
    pub fn clear_count(&self) -> u32 {
        self.clear_count
    }

    /// Whether the controller is currently locked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn offset_of(&self, address: u32, len: usize) -> Result<usize, FlashError> {
        if !self.region.contains(address, len as u32) {
            return Err(FlashError::OutOfBounds);
        }
        Ok((address - self.region.start) as usize)
    }

    fn check_writable(&self) -> Result<(), FlashError> {
        if self.locked {
            return Err(FlashError::WriteProtected);
        }
        Ok(())
    }
}

impl<const N: usize> ConfigFlash for RamFlash<N> {
    fn region(&self) -> FlashRegion {
        self.region
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn lock(&mut self) {
        self.locked = true;
    }

    fn clear_fault_flags(&mut self) {
        self.fault_latched = false;
        self.clear_count += 1;
    }

    fn erase_page(&mut self, address: u32) -> Result<(), FlashError> {
        self.check_writable()?;
        let page = self.region.page_size as usize;
        if address < self.region.start {
            return Err(FlashError::OutOfBounds);
        }
        if (address - self.region.start) as usize % page != 0 {
            return Err(FlashError::Alignment);
        }
        let offset = self.offset_of(address, page)?;

        self.erase_count += 1;
        if self.always_fail || self.fault_latched || self.failing_erases > 0 {
            self.failing_erases = self.failing_erases.saturating_sub(1);
            self.fault_latched = true;
            return Err(FlashError::Erase);
        }

        self.data[offset..offset + page].fill(0xFF);
        Ok(())
    }

    fn program_word(&mut self, address: u32, word: u32) -> Result<(), FlashError> {
        self.check_writable()?;
        if address % WORD_SIZE as u32 != 0 {
            return Err(FlashError::Alignment);
        }
        let offset = self.offset_of(address, WORD_SIZE)?;

        self.program_count += 1;
        if self.always_fail || self.fault_latched || self.failing_programs > 0 {
            self.failing_programs = self.failing_programs.saturating_sub(1);
            self.fault_latched = true;
            return Err(FlashError::Program);
        }

        for (i, byte) in word.to_le_bytes().iter().enumerate() {
            self.data[offset + i] &= byte;
        }

        if let Some((stuck, mask)) = self.stuck_bits {
            if (offset..offset + WORD_SIZE).contains(&stuck) {
                self.data[stuck] |= mask;
            }
        }

        Ok(())
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        let offset = self.offset_of(address, buf.len())?;
        buf.copy_from_slice(&self.data[offset..offset + buf.len()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: u32 = 0x0801_F000;

    #[test]
    fn test_new_region_is_erased_and_locked() {
        let flash = RamFlash::<1024>::new(START, 512);
        assert!(flash.contents().iter().all(|&b| b == 0xFF));
        assert!(flash.is_locked());
        assert_eq!(flash.region().end(), START + 1024);
    }

    #[test]
    fn test_locked_flash_rejects_writes() {
        let mut flash = RamFlash::<1024>::new(START, 512);
        assert_eq!(flash.erase_page(START), Err(FlashError::WriteProtected));
        assert_eq!(
            flash.program_word(START, 0),
            Err(FlashError::WriteProtected)
        );
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut flash = RamFlash::<1024>::new(START, 512);
        flash.unlock();
        flash.program_word(START, 0x0000_00F0).unwrap();
        flash.program_word(START, 0x0000_000F).unwrap();

        let mut buf = [0u8; 4];
        flash.read(START, &mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), 0);

        flash.erase_page(START).unwrap();
        flash.read(START, &mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), ERASED_WORD);
    }

    #[test]
    fn test_alignment_and_bounds() {
        let mut flash = RamFlash::<1024>::new(START, 512);
        flash.unlock();
        assert_eq!(flash.erase_page(START + 4), Err(FlashError::Alignment));
        assert_eq!(flash.program_word(START + 2, 0), Err(FlashError::Alignment));
        assert_eq!(
            flash.program_word(START + 1024, 0),
            Err(FlashError::OutOfBounds)
        );
        let mut buf = [0u8; 8];
        assert_eq!(flash.read(START + 1020, &mut buf), Err(FlashError::OutOfBounds));
    }

    #[test]
    fn test_fault_flag_latches_until_cleared() {
        let mut flash = RamFlash::<1024>::new(START, 512);
        flash.unlock();
        flash.fail_next_programs(1);

        assert_eq!(flash.program_word(START, 0), Err(FlashError::Program));
        // Injected failure is spent, but the latched flag still blocks
        assert_eq!(flash.program_word(START, 0), Err(FlashError::Program));

        flash.clear_fault_flags();
        assert_eq!(flash.program_word(START, 0), Ok(()));
        assert_eq!(flash.clear_count(), 1);
    }

    #[test]
    fn test_stuck_bits_survive_programming() {
        let mut flash = RamFlash::<1024>::new(START, 512);
        flash.unlock();
        flash.stick_bits(1, 0x80);
        flash.program_word(START, 0).unwrap();
        assert_eq!(flash.contents()[1], 0x80);
    }
}
