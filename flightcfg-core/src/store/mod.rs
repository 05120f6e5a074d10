//! Configuration store
//!
//! [`ConfigStore`] owns the one in-memory [`ConfigRecord`], the flash region
//! it persists to and the receiver capture hook. Boot calls
//! [`ensure_valid`](ConfigStore::ensure_valid) then
//! [`load`](ConfigStore::load); every later change goes through
//! [`save`](ConfigStore::save) and usually a reload.
//!
//! Receiver capture is suspended for the whole of every load and save.

pub mod error;

pub use error::FailureReason;

use flightcfg_hal::{ConfigFlash, RxSignal};

use crate::activation;
use crate::config::{
    ConfigRecord, FeatureMask, Profile, RateProfile, Target, MAX_PROFILE_COUNT,
    MAX_RATE_PROFILE_COUNT,
};
use crate::resolver::{self, FixReport};
use crate::runtime::{FeatureLatch, ProfileSelector};
use crate::storage::image::{self, ImageBuffer, ImageError, IMAGE_SIZE};
use crate::storage::ImageWriter;
use crate::traits::Subsystems;

/// Bytes compared per read when verifying a write
const VERIFY_CHUNK: usize = 64;

/// Receiver capture paused until dropped
struct RxSuspended<'a, R: RxSignal> {
    rx: &'a mut R,
}

impl<'a, R: RxSignal> RxSuspended<'a, R> {
    fn new(rx: &'a mut R) -> Self {
        rx.suspend();
        Self { rx }
    }
}

impl<R: RxSignal> Drop for RxSuspended<'_, R> {
    fn drop(&mut self) {
        self.rx.resume();
    }
}

/// Persistent configuration for one board
pub struct ConfigStore<F: ConfigFlash, R: RxSignal> {
    flash: F,
    rx: R,
    target: Target,
    record: ConfigRecord,
    selector: ProfileSelector,
    latch: FeatureLatch,
    /// Scratch for encoding, reading and verifying
    image: ImageBuffer,
}

impl<F: ConfigFlash, R: RxSignal> ConfigStore<F, R> {
    /// Create a store holding `target` defaults
    ///
    /// Nothing is read from flash until [`ensure_valid`](Self::ensure_valid)
    /// or [`load`](Self::load).
    pub fn new(flash: F, rx: R, target: Target) -> Result<Self, FailureReason> {
        let info = target.info();
        log_info!("Config store for {} ({:?})", info.name, info.mcu);

        let region = flash.region();
        if (region.size as usize) < IMAGE_SIZE {
            log_error!("Config region of {} bytes cannot hold the image", region.size);
            return Err(FailureReason::RegionTooSmall);
        }

        Ok(Self {
            flash,
            rx,
            target,
            record: ConfigRecord::defaults(target),
            selector: ProfileSelector::new(),
            latch: FeatureLatch::new(),
            image: [0; IMAGE_SIZE],
        })
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Whether the stored image has the right version, size, magic and
    /// checksum, and decodes
    pub fn validate(&mut self) -> bool {
        match read_image(&mut self.flash, &mut self.image) {
            Ok(_) => true,
            Err(e) => {
                log_debug!("Stored config rejected: {:?}", e);
                false
            }
        }
    }

    /// Load the stored record, fix it up and activate it
    ///
    /// Out-of-range profile and rate profile indices are reset to slot 0 in
    /// every profile, not just the active one. Fails with
    /// [`FailureReason::InvalidStoredConfig`] if the image does not validate.
    pub fn load<S: Subsystems>(&mut self, subsystems: &mut S) -> Result<FixReport, FailureReason> {
        let _rx = RxSuspended::new(&mut self.rx);

        self.record = read_image(&mut self.flash, &mut self.image)?;

        if usize::from(self.record.current_profile_index) >= MAX_PROFILE_COUNT {
            log_warn!("Stored profile index {} out of range", self.record.current_profile_index);
            self.record.current_profile_index = 0;
        }
        for (slot, profile) in self.record.profiles.iter_mut().enumerate() {
            if usize::from(profile.default_rate_profile_index) >= MAX_RATE_PROFILE_COUNT {
                log_warn!(
                    "Profile {} rate profile index {} out of range",
                    slot,
                    profile.default_rate_profile_index
                );
                profile.default_rate_profile_index = 0;
            }
        }

        let profile = self
            .selector
            .select_profile(usize::from(self.record.current_profile_index));
        self.selector.select_rate_profile(usize::from(
            self.record.profiles[profile].default_rate_profile_index,
        ));

        let report = resolver::fix(&mut self.record, self.target);
        activation::apply(&mut self.record, self.target, &self.selector, subsystems);

        Ok(report)
    }

    /// Persist the record
    ///
    /// Writes the full image with bounded retries, then reads it back.
    pub fn save(&mut self) -> Result<(), FailureReason> {
        let _rx = RxSuspended::new(&mut self.rx);

        image::encode(&self.record, &mut self.image)?;
        let attempts = ImageWriter::new(&mut self.flash, &self.image).run()?;
        verify_written(&mut self.flash, &self.image)?;

        log_info!("Config saved after {} attempt(s)", attempts);
        Ok(())
    }

    /// Restore and persist defaults if the stored image is not valid
    pub fn ensure_valid(&mut self) -> Result<(), FailureReason> {
        if self.validate() {
            return Ok(());
        }

        log_warn!("Stored config invalid, restoring defaults");
        self.reset_and_save()
    }

    /// Replace the in-memory record with `target` defaults
    pub fn reset_to_defaults(&mut self) {
        self.record = ConfigRecord::defaults(self.target);
        self.selector = ProfileSelector::new();
    }

    pub fn reset_and_save(&mut self) -> Result<(), FailureReason> {
        self.reset_to_defaults();
        self.save()
    }

    /// Save, reload and acknowledge with one beep
    pub fn save_and_reload<S: Subsystems>(&mut self, subsystems: &mut S) -> Result<(), FailureReason> {
        self.save()?;
        self.load(subsystems)?;
        subsystems.confirmation_beeps(1);
        Ok(())
    }

    /// Switch tuning profile, persisting the choice
    ///
    /// Indices past the last slot select the last slot. Beeps once per slot
    /// number. Returns the slot selected.
    pub fn change_profile<S: Subsystems>(
        &mut self,
        index: usize,
        subsystems: &mut S,
    ) -> Result<usize, FailureReason> {
        let profile = self.selector.select_profile(index);
        self.record.current_profile_index = profile as u8;

        self.save()?;
        self.load(subsystems)?;

        subsystems.confirmation_beeps(profile as u8 + 1);
        Ok(profile)
    }

    /// Switch rate profile for this session only
    ///
    /// Only the lookup curves are regenerated; nothing is written to flash.
    pub fn change_rate_profile<S: Subsystems>(&mut self, index: usize, subsystems: &mut S) -> usize {
        let rate_profile = self.selector.select_rate_profile(index);
        activation::activate_rate_profile(&self.record, &self.selector, subsystems);
        rate_profile
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// Edit the record; changes take effect on the next save and reload
    pub fn record_mut(&mut self) -> &mut ConfigRecord {
        &mut self.record
    }

    pub fn selector(&self) -> &ProfileSelector {
        &self.selector
    }

    pub fn current_profile(&self) -> &Profile {
        &self.record.profiles[self.selector.profile()]
    }

    pub fn current_rate_profile(&self) -> &RateProfile {
        &self.record.rate_profiles[self.selector.rate_profile()]
    }

    pub fn current_min_throttle(&self) -> u16 {
        self.record.esc_servo.min_throttle
    }

    /// Whether any of `mask` is set in the record
    pub fn is_configured(&self, mask: FeatureMask) -> bool {
        self.record.features.intersects(mask)
    }

    /// Whether any of `mask` was set at the last latch
    pub fn is_active(&self, mask: FeatureMask) -> bool {
        self.latch.is_active(mask)
    }

    pub fn set_features(&mut self, mask: FeatureMask) {
        self.record.features.insert(mask);
    }

    pub fn clear_features(&mut self, mask: FeatureMask) {
        self.record.features.remove(mask);
    }

    /// Snapshot the configured features as the active set
    pub fn latch_active_features(&mut self) {
        self.latch.latch(self.record.features);
    }

    /// Delay before restarting motors after a soft reboot
    pub fn motor_restart_delay_ms(&self) -> u32 {
        self.latch.motor_restart_delay_ms(self.record.features)
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn rx(&self) -> &R {
        &self.rx
    }

    pub fn into_parts(self) -> (F, R) {
        (self.flash, self.rx)
    }
}

fn read_image<F: ConfigFlash>(flash: &mut F, image: &mut ImageBuffer) -> Result<ConfigRecord, ImageError> {
    let start = flash.region().start;
    flash.read(start, image).map_err(ImageError::Read)?;
    image::decode(image)
}

/// Read the region back and compare it with what was written
fn verify_written<F: ConfigFlash>(flash: &mut F, image: &ImageBuffer) -> Result<(), FailureReason> {
    let start = flash.region().start;
    let mut readback = [0u8; VERIFY_CHUNK];

    for (i, expected) in image.chunks(VERIFY_CHUNK).enumerate() {
        let readback = &mut readback[..expected.len()];
        let address = start + (i * VERIFY_CHUNK) as u32;

        if flash.read(address, readback).is_err() || readback != expected {
            log_error!("Config verify failed at {}", address);
            return Err(FailureReason::VerifyFailed);
        }
    }

    image::check(image).map_err(|_| FailureReason::VerifyFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightcfg_hal::{NoRxSignal, RamFlash};

    const START: u32 = 0x0801_F800;

    #[derive(Default)]
    struct CountingRx {
        suspended: bool,
        suspends: u32,
        resumes: u32,
    }

    impl RxSignal for CountingRx {
        fn suspend(&mut self) {
            self.suspended = true;
            self.suspends += 1;
        }

        fn resume(&mut self) {
            self.suspended = false;
            self.resumes += 1;
        }
    }

    #[test]
    fn test_region_too_small() {
        let flash = RamFlash::<1024>::new(START, 1024);
        let result = ConfigStore::new(flash, NoRxSignal, Target::Naze);
        assert!(matches!(result, Err(FailureReason::RegionTooSmall)));
    }

    #[test]
    fn test_rx_suspended_during_save_only() {
        let flash = RamFlash::<IMAGE_SIZE>::new(START, 1024);
        let mut store = ConfigStore::new(flash, CountingRx::default(), Target::Naze).unwrap();

        store.save().unwrap();

        assert_eq!(store.rx().suspends, 1);
        assert_eq!(store.rx().resumes, 1);
        assert!(!store.rx().suspended);
    }

    #[test]
    fn test_rx_resumed_after_failed_save() {
        let mut flash = RamFlash::<IMAGE_SIZE>::new(START, 1024);
        flash.set_always_fail(true);
        let mut store = ConfigStore::new(flash, CountingRx::default(), Target::Naze).unwrap();

        assert!(store.save().is_err());
        assert!(!store.rx().suspended);
    }

    #[test]
    fn test_feature_queries() {
        let flash = RamFlash::<IMAGE_SIZE>::new(START, 1024);
        let mut store = ConfigStore::new(flash, NoRxSignal, Target::Naze).unwrap();

        assert!(store.is_configured(FeatureMask::VBAT));
        assert!(!store.is_active(FeatureMask::VBAT));

        store.latch_active_features();
        store.clear_features(FeatureMask::VBAT | FeatureMask::ONESHOT125);

        assert!(!store.is_configured(FeatureMask::VBAT));
        assert!(store.is_active(FeatureMask::VBAT));
        assert_eq!(store.motor_restart_delay_ms(), 1500);

        store.set_features(FeatureMask::ONESHOT125);
        assert_eq!(store.motor_restart_delay_ms(), 0);
    }

    #[test]
    fn test_current_min_throttle_follows_record() {
        let flash = RamFlash::<IMAGE_SIZE>::new(START, 1024);
        let mut store = ConfigStore::new(flash, NoRxSignal, Target::Naze).unwrap();
        assert_eq!(store.current_min_throttle(), 1150);

        store.record_mut().esc_servo.min_throttle = 1070;
        assert_eq!(store.current_min_throttle(), 1070);
    }
}
