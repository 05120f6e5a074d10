use flightcfg_core::config::record::CurrentMeterType;
use flightcfg_core::config::SerialFunction;
use flightcfg_core::resolver::fix;
use flightcfg_core::{ConfigRecord, FeatureMask, Target};
use proptest::prelude::*;

fn any_target() -> impl Strategy<Value = Target> {
    prop::sample::select(Target::ALL.to_vec())
}

fn any_meter() -> impl Strategy<Value = CurrentMeterType> {
    prop::sample::select(vec![
        CurrentMeterType::None,
        CurrentMeterType::Adc,
        CurrentMeterType::Virtual,
    ])
}

fn record_for(
    target: Target,
    features: u32,
    meter: CurrentMeterType,
    port_functions: [u16; 5],
) -> ConfigRecord {
    let mut record = ConfigRecord::defaults(target);
    record.features = FeatureMask::from_bits_retain(features);
    record.battery.current_meter_type = meter;
    for (port, bits) in record.serial.ports.iter_mut().zip(port_functions) {
        port.functions = SerialFunction::from_bits_truncate(bits);
    }
    record
}

proptest! {
    #[test]
    fn prop_fix_is_idempotent(
        target in any_target(),
        features in any::<u32>(),
        meter in any_meter(),
        ports in any::<[u16; 5]>(),
    ) {
        let mut record = record_for(target, features, meter, ports);
        fix(&mut record, target);
        let once = record.clone();

        let report = fix(&mut record, target);

        prop_assert!(report.is_empty(), "second pass applied {:?}", report.fixes());
        prop_assert_eq!(record, once);
    }

    #[test]
    fn prop_fix_leaves_one_receiver_method(
        target in any_target(),
        features in any::<u32>(),
        meter in any_meter(),
    ) {
        let mut record = record_for(target, features, meter, [0; 5]);
        record.serial = ConfigRecord::defaults(target).serial;
        fix(&mut record, target);
        prop_assert_eq!(record.features.rx_method_count(), 1);
    }

    #[test]
    fn prop_fix_leaves_valid_serial_config(
        target in any_target(),
        features in any::<u32>(),
        ports in any::<[u16; 5]>(),
    ) {
        let mut record = record_for(target, features, CurrentMeterType::Adc, ports);
        fix(&mut record, target);
        prop_assert!(record.serial.is_valid());
    }

    #[test]
    fn prop_fix_only_adds_parallel_pwm(
        target in any_target(),
        features in any::<u32>(),
    ) {
        let mut record = record_for(target, features, CurrentMeterType::Adc, [0; 5]);
        record.serial = ConfigRecord::defaults(target).serial;
        let before = record.features;
        fix(&mut record, target);
        let added = record.features.difference(before);
        prop_assert!(added.is_empty() || added == FeatureMask::RX_PARALLEL_PWM);
    }
}

#[test]
fn test_scenario_serial_and_parallel_pwm() {
    let mut record = ConfigRecord::defaults(Target::Naze);
    record.features = FeatureMask::RX_SERIAL | FeatureMask::RX_PARALLEL_PWM;
    fix(&mut record, Target::Naze);
    assert!(record.features.contains(FeatureMask::RX_SERIAL));
    assert!(!record.features.contains(FeatureMask::RX_PARALLEL_PWM));
}
