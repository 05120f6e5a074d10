mod common;

use common::{blank_flash, initialized_store, store_on, Recorder, TrackingRx, REGION};
use flightcfg_core::config::record::MixerMode;
use flightcfg_core::resolver::Rule;
use flightcfg_core::storage::image::ImageError;
use flightcfg_core::storage::{WriteError, WRITE_ATTEMPTS};
use flightcfg_core::{ConfigRecord, ConfigStore, FailureReason, FeatureMask, Target};
use flightcfg_hal::FlashError;

#[test]
fn test_save_then_load_round_trips() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();
    store.load(&mut subsystems).unwrap();

    let record = store.record_mut();
    record.profiles[1].pid.p8[0] = 55;
    record.rate_profiles[2].rc_expo = 70;
    record.features.insert(FeatureMask::GPS | FeatureMask::TELEMETRY);
    record.acc_zero.pitch = -12;
    record.custom_motor_mix[0].yaw = -1.0;
    let saved = store.record().clone();
    store.save().unwrap();

    let (flash, _) = store.into_parts();
    let mut reloaded = store_on(flash, Target::Naze);
    let report = reloaded.load(&mut subsystems).unwrap();

    assert!(report.is_empty());
    assert_eq!(reloaded.record(), &saved);
}

#[test]
fn test_ensure_valid_heals_zeroed_flash() {
    let mut flash = blank_flash();
    flash.fill(0x00);
    let mut store = store_on(flash, Target::Naze);

    assert!(!store.validate());
    store.ensure_valid().unwrap();

    assert!(store.validate());
    assert_eq!(store.record(), &ConfigRecord::defaults(Target::Naze));
}

#[test]
fn test_ensure_valid_heals_garbage_flash() {
    let mut flash = blank_flash();
    let garbage: Vec<u8> = (0..REGION).map(|i| (i * 31 + 7) as u8).collect();
    flash.write_raw(0, &garbage);
    let mut store = store_on(flash, Target::SpRacingF3);

    assert!(!store.validate());
    store.ensure_valid().unwrap();
    assert!(store.validate());
    assert_eq!(store.record(), &ConfigRecord::defaults(Target::SpRacingF3));
}

#[test]
fn test_ensure_valid_heals_wrong_version() {
    let mut store = initialized_store(Target::Naze);
    store.record_mut().small_angle = 40;
    store.save().unwrap();

    store.flash_mut().corrupt(0, 0x01);
    assert!(!store.validate());

    store.ensure_valid().unwrap();
    assert!(store.validate());
    assert_eq!(store.record().small_angle, 25);
    assert_eq!(store.record(), &ConfigRecord::defaults(Target::Naze));
}

#[test]
fn test_ensure_valid_leaves_valid_flash_alone() {
    let mut store = initialized_store(Target::Naze);
    let programs = store.flash().program_count();

    store.ensure_valid().unwrap();

    assert_eq!(store.flash().program_count(), programs);
}

#[test]
fn test_load_rejects_invalid_flash() {
    let mut store = store_on(blank_flash(), Target::Naze);
    let result = store.load(&mut Recorder::default());
    assert_eq!(
        result.unwrap_err(),
        FailureReason::InvalidStoredConfig(ImageError::Version(0xFF))
    );

    let mut store = initialized_store(Target::Naze);
    store.flash_mut().corrupt(700, 0x10);
    let result = store.load(&mut Recorder::default());
    assert_eq!(
        result.unwrap_err(),
        FailureReason::InvalidStoredConfig(ImageError::Checksum)
    );
}

#[test]
fn test_every_attempt_failing_is_fatal() {
    let mut flash = blank_flash();
    flash.set_always_fail(true);
    let mut store = store_on(flash, Target::Naze);

    assert_eq!(
        store.ensure_valid(),
        Err(FailureReason::FlashWriteFailed(WriteError {
            attempts: WRITE_ATTEMPTS,
            last_fault: FlashError::Erase,
        }))
    );
    assert!(store.flash().is_locked());
}

#[test]
fn test_transient_faults_are_retried() {
    let mut flash = blank_flash();
    flash.fail_next_programs(2);
    let mut store = store_on(flash, Target::Naze);

    store.ensure_valid().unwrap();

    assert!(store.validate());
    assert_eq!(store.flash().clear_count(), 3);
}

#[test]
fn test_stuck_cell_fails_verification() {
    let mut flash = blank_flash();
    // Version byte 115 has the top bit clear
    flash.stick_bits(0, 0x80);
    let mut store = store_on(flash, Target::Naze);

    assert_eq!(store.save(), Err(FailureReason::VerifyFailed));
}

#[test]
fn test_out_of_range_profile_index_resets_to_first() {
    let mut store = initialized_store(Target::Naze);
    store.record_mut().current_profile_index = 9;
    store.save().unwrap();

    store.load(&mut Recorder::default()).unwrap();

    assert_eq!(store.record().current_profile_index, 0);
    assert_eq!(store.selector().profile(), 0);
}

#[test]
fn test_out_of_range_rate_index_resets_to_first() {
    let mut store = initialized_store(Target::Naze);
    let record = store.record_mut();
    record.current_profile_index = 1;
    record.profiles[1].default_rate_profile_index = 5;
    store.save().unwrap();

    store.load(&mut Recorder::default()).unwrap();

    assert_eq!(store.selector().profile(), 1);
    assert_eq!(store.selector().rate_profile(), 0);
    assert_eq!(store.record().profiles[1].default_rate_profile_index, 0);
}

#[test]
fn test_out_of_range_rate_index_in_inactive_profile_is_reset() {
    let mut store = initialized_store(Target::Naze);
    let record = store.record_mut();
    record.current_profile_index = 0;
    record.profiles[1].default_rate_profile_index = 9;
    record.profiles[2].default_rate_profile_index = 3;
    store.save().unwrap();

    store.load(&mut Recorder::default()).unwrap();

    let profiles = &store.record().profiles;
    assert_eq!(store.selector().profile(), 0);
    assert_eq!(profiles[0].default_rate_profile_index, 0);
    assert_eq!(profiles[1].default_rate_profile_index, 0);
    assert_eq!(profiles[2].default_rate_profile_index, 0);
}

#[test]
fn test_profile_selects_its_default_rate_profile() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();

    let selected = store.change_profile(2, &mut subsystems).unwrap();

    assert_eq!(selected, 2);
    assert_eq!(store.selector().rate_profile(), 2);
    assert_eq!(subsystems.beeps, [3]);
}

#[test]
fn test_change_profile_persists_and_clamps() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();

    assert_eq!(store.change_profile(9, &mut subsystems).unwrap(), 2);

    let (flash, _) = store.into_parts();
    let mut reloaded = store_on(flash, Target::Naze);
    reloaded.load(&mut subsystems).unwrap();
    assert_eq!(reloaded.selector().profile(), 2);
    assert_eq!(reloaded.record().current_profile_index, 2);
}

#[test]
fn test_change_rate_profile_is_session_only() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();
    store.load(&mut subsystems).unwrap();
    store.record_mut().rate_profiles[2].rc_rate = 90;
    subsystems.clear_calls();
    let programs = store.flash().program_count();

    assert_eq!(store.change_rate_profile(7, &mut subsystems), 2);

    assert_eq!(subsystems.calls, ["curves"]);
    assert_eq!(subsystems.curves.unwrap().pitch_roll[5], 450);
    assert_eq!(store.flash().program_count(), programs);
    assert_eq!(store.current_rate_profile().rc_rate, 90);
}

#[test]
fn test_save_and_reload_beeps_once() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();

    store.save_and_reload(&mut subsystems).unwrap();

    assert_eq!(subsystems.beeps, [1]);
    assert!(subsystems.calls.contains(&"imu"));
}

#[test]
fn test_serial_receiver_beats_parallel_pwm_on_load() {
    let mut store = initialized_store(Target::Naze);
    store.record_mut().features =
        FeatureMask::RX_SERIAL | FeatureMask::RX_PARALLEL_PWM | FeatureMask::FAILSAFE;
    store.save().unwrap();

    let report = store.load(&mut Recorder::default()).unwrap();

    assert!(store.is_configured(FeatureMask::RX_SERIAL));
    assert!(!store.is_configured(FeatureMask::RX_PARALLEL_PWM));
    assert!(report.applied(Rule::RxPriority));
}

#[test]
fn test_load_activates_in_fixed_order() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();

    store.load(&mut subsystems).unwrap();

    assert_eq!(
        subsystems.calls,
        [
            "curves",
            "adjustments",
            "rc_controls",
            "gyro",
            "telemetry",
            "pid_controller",
            "gps",
            "failsafe",
            "acc_trims",
            "mixer",
            "imu",
            "alt_hold",
            "baro",
        ]
    );
}

#[test]
fn test_reapplying_overwrites_subsystem_state() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();
    store.load(&mut subsystems).unwrap();
    assert_eq!(subsystems.mixer_mode, Some(MixerMode::QuadX));

    let record = store.record_mut();
    record.mixer.mode = MixerMode::Hex6;
    record.failsafe.delay = 30;
    record.acc_zero.roll = 17;
    record.profiles[0].pid.gyro_soft_lpf = 2;
    subsystems.clear_calls();
    store.save_and_reload(&mut subsystems).unwrap();

    assert_eq!(subsystems.calls.len(), 13);
    assert_eq!(subsystems.mixer_mode, Some(MixerMode::Hex6));
    assert_eq!(subsystems.failsafe.unwrap().delay, 30);
    assert_eq!(subsystems.acc_trims.unwrap().roll, 17);
    assert!(subsystems.fir.unwrap().is_some());

    // Same record again: identical state
    let snapshot = (subsystems.curves, subsystems.imu, subsystems.telemetry);
    store.load(&mut subsystems).unwrap();
    assert_eq!((subsystems.curves, subsystems.imu, subsystems.telemetry), snapshot);
}

#[test]
fn test_receiver_capture_paused_only_during_store_operations() {
    let mut store = ConfigStore::new(blank_flash(), TrackingRx::default(), Target::Naze).unwrap();

    store.ensure_valid().unwrap();
    store.load(&mut Recorder::default()).unwrap();

    assert_eq!(store.rx().suspends, 2);
    assert!(!store.rx().suspended);
}

#[test]
fn test_active_features_stay_latched_until_relatched() {
    let mut store = initialized_store(Target::Naze);
    let mut subsystems = Recorder::default();
    store.load(&mut subsystems).unwrap();
    store.latch_active_features();

    store.clear_features(FeatureMask::ONESHOT125);
    store.set_features(FeatureMask::GPS);
    store.save_and_reload(&mut subsystems).unwrap();

    assert!(store.is_active(FeatureMask::ONESHOT125));
    assert!(!store.is_active(FeatureMask::GPS));
    assert!(store.is_configured(FeatureMask::GPS));
    assert_eq!(store.motor_restart_delay_ms(), 1500);

    store.latch_active_features();
    assert!(store.is_active(FeatureMask::GPS));
    assert_eq!(store.motor_restart_delay_ms(), 0);
}

#[test]
fn test_reset_to_defaults_restores_selection() {
    let mut store = initialized_store(Target::AlienWiiF3);
    let mut subsystems = Recorder::default();
    store.change_profile(1, &mut subsystems).unwrap();
    store.record_mut().esc_servo.min_throttle = 1200;

    store.reset_to_defaults();

    assert_eq!(store.selector().profile(), 0);
    assert_eq!(store.current_min_throttle(), 1000);
}
