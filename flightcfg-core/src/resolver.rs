//! Feature conflict resolution
//!
//! [`fix`] makes one ordered pass over the record and clears features that
//! cannot coexist. The order below is part of the contract: a later rule may
//! clear something an earlier rule relied on, and nothing is re-checked.
//!
//! 1. No receiver input selected: select parallel PWM.
//! 2. Receiver priority MSP > serial > PPM > parallel PWM:
//!    PPM clears PWM; MSP clears serial, PWM, PPM; serial clears PWM, PPM.
//! 3. Parallel PWM takes the pins of RSSI ADC, an ADC current meter and the
//!    LED strip where the board shares them, and always those of soft serial.
//! 4. Board exclusion rules, in table order.
//! 5. Board adjustments: forced telemetry inversion, serial RX port pinning.
//! 6. An invalid serial port assignment is reset to the board default.
//!
//! Every rule only clears features, except rule 1 which runs before anything
//! reads receiver bits, so running [`fix`] on its own output changes nothing.

use heapless::Vec;

use crate::config::record::CurrentMeterType;
use crate::config::serial::{SerialConfig, SerialFunction, SerialPortId};
use crate::config::target::{ExclusionRule, SerialRxPinning, Target, TargetInfo};
use crate::config::{ConfigRecord, FeatureMask};

/// Fixes recorded per pass
pub const MAX_FIXES: usize = 16;

/// Rule that produced a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rule {
    NoRxMethod,
    RxPriority,
    ParallelPwmPins,
    Exclusion(ExclusionRule),
    TelemetryInversion,
    SerialRxPinning,
    SerialConfigReset,
}

/// What a rule changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Change {
    Set(FeatureMask),
    Cleared(FeatureMask),
    /// A non-feature setting was rewritten
    Setting,
}

/// One correction applied by [`fix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fix {
    pub rule: Rule,
    pub change: Change,
}

/// Corrections applied by one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixReport {
    fixes: Vec<Fix, MAX_FIXES>,
    truncated: bool,
}

impl FixReport {
    /// Whether the record was already consistent
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty() && !self.truncated
    }

    /// Recorded fixes, in application order
    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    /// Whether any fix came from `rule`
    pub fn applied(&self, rule: Rule) -> bool {
        self.fixes.iter().any(|f| f.rule == rule)
    }

    /// More fixes were applied than could be recorded
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    fn push(&mut self, rule: Rule, change: Change) {
        if self.fixes.push(Fix { rule, change }).is_err() {
            self.truncated = true;
        }
    }
}

struct Resolver<'a> {
    record: &'a mut ConfigRecord,
    info: &'static TargetInfo,
    report: FixReport,
}

impl Resolver<'_> {
    fn has(&self, mask: FeatureMask) -> bool {
        self.record.features.contains(mask)
    }

    fn set(&mut self, mask: FeatureMask, rule: Rule) {
        let added = mask.difference(self.record.features);
        if !added.is_empty() {
            self.record.features.insert(added);
            self.report.push(rule, Change::Set(added));
        }
    }

    fn clear(&mut self, mask: FeatureMask, rule: Rule) {
        let removed = mask.intersection(self.record.features);
        if !removed.is_empty() {
            self.record.features.remove(removed);
            self.report.push(rule, Change::Cleared(removed));
        }
    }

    fn adc_current_meter(&self) -> bool {
        self.record.battery.current_meter_type == CurrentMeterType::Adc
    }

    fn rx_method(&mut self) {
        if !self.record.features.intersects(FeatureMask::RX_METHODS) {
            self.set(FeatureMask::RX_PARALLEL_PWM, Rule::NoRxMethod);
        }
    }

    fn rx_priority(&mut self) {
        if self.has(FeatureMask::RX_PPM) {
            self.clear(FeatureMask::RX_PARALLEL_PWM, Rule::RxPriority);
        }
        if self.has(FeatureMask::RX_MSP) {
            self.clear(
                FeatureMask::RX_SERIAL | FeatureMask::RX_PARALLEL_PWM | FeatureMask::RX_PPM,
                Rule::RxPriority,
            );
        }
        if self.has(FeatureMask::RX_SERIAL) {
            self.clear(
                FeatureMask::RX_PARALLEL_PWM | FeatureMask::RX_PPM,
                Rule::RxPriority,
            );
        }
    }

    fn parallel_pwm_pins(&mut self) {
        if !self.has(FeatureMask::RX_PARALLEL_PWM) {
            return;
        }

        let contention = self.info.pwm_contention;
        if contention.rssi_adc {
            self.clear(FeatureMask::RSSI_ADC, Rule::ParallelPwmPins);
        }
        if contention.current_meter_adc && self.adc_current_meter() {
            self.clear(FeatureMask::CURRENT_METER, Rule::ParallelPwmPins);
        }
        if contention.led_strip {
            self.clear(FeatureMask::LED_STRIP, Rule::ParallelPwmPins);
        }
        self.clear(FeatureMask::SOFTSERIAL, Rule::ParallelPwmPins);
    }

    fn exclusions(&mut self) {
        for &exclusion in self.info.exclusions {
            let rule = Rule::Exclusion(exclusion);
            match exclusion {
                ExclusionRule::LedStripVsSoftSerial => {
                    if self.has(FeatureMask::SOFTSERIAL) {
                        self.clear(FeatureMask::LED_STRIP, rule);
                    }
                }
                ExclusionRule::SonarCurrentMeterOnParallelPwm => {
                    if self.has(
                        FeatureMask::RX_PARALLEL_PWM
                            | FeatureMask::SONAR
                            | FeatureMask::CURRENT_METER,
                    ) && self.adc_current_meter()
                    {
                        self.clear(FeatureMask::CURRENT_METER, rule);
                    }
                }
                ExclusionRule::SonarVsCurrentMeter => {
                    if self.has(FeatureMask::SONAR | FeatureMask::CURRENT_METER)
                        && self.adc_current_meter()
                    {
                        self.clear(FeatureMask::CURRENT_METER, rule);
                    }
                }
                ExclusionRule::DisplayVsUsart3 => {
                    if self.record.serial.uses_port(SerialPortId::Usart3) {
                        self.clear(FeatureMask::DISPLAY, rule);
                    }
                }
                ExclusionRule::SonarVsSoftSerial => {
                    if self.has(FeatureMask::SOFTSERIAL) {
                        self.clear(FeatureMask::SONAR, rule);
                    }
                }
            }
        }
    }

    fn board_adjustments(&mut self) {
        if self.info.forced_telemetry_inversion && !self.record.telemetry.inversion {
            self.record.telemetry.inversion = true;
            self.report.push(Rule::TelemetryInversion, Change::Setting);
        }

        if let Some(pinning) = self.info.serialrx_pinning {
            if pin_serial_rx(self.record, pinning) {
                self.report.push(Rule::SerialRxPinning, Change::Setting);
            }
        }
    }

    fn serial_config(&mut self) {
        if self.record.serial.is_valid() {
            return;
        }

        self.record.serial = crate::config::defaults::board_serial_config(self.info);
        if let Some(pinning) = self.info.serialrx_pinning {
            pin_serial_rx(self.record, pinning);
        }
        self.report.push(Rule::SerialConfigReset, Change::Setting);
    }
}

/// Force the board's fixed serial layout, returning whether anything changed
fn pin_serial_rx(record: &mut ConfigRecord, pinning: SerialRxPinning) -> bool {
    let before = (record.serial, record.rx.serialrx_provider);

    set_port_functions(&mut record.serial, pinning.msp_port, SerialFunction::MSP);
    if record.features.contains(FeatureMask::RX_SERIAL) {
        set_port_functions(&mut record.serial, pinning.rx_port, SerialFunction::RX_SERIAL);
        record.rx.serialrx_provider = pinning.provider;
    }

    before != (record.serial, record.rx.serialrx_provider)
}

fn set_port_functions(serial: &mut SerialConfig, index: usize, functions: SerialFunction) {
    if let Some(port) = serial.ports.get_mut(index) {
        port.functions = functions;
    }
}

/// Resolve feature conflicts in `record` for `target`
///
/// Single ordered pass; see the module docs for the rule order.
pub fn fix(record: &mut ConfigRecord, target: Target) -> FixReport {
    let mut resolver = Resolver {
        record,
        info: target.info(),
        report: FixReport::default(),
    };

    resolver.rx_method();
    resolver.rx_priority();
    resolver.parallel_pwm_pins();
    resolver.exclusions();
    resolver.board_adjustments();
    resolver.serial_config();

    for f in resolver.report.fixes() {
        log_info!("Config fix: {:?} {:?}", f.rule, f.change);
    }
    if resolver.report.is_truncated() {
        log_warn!("Config fix list truncated");
    }

    resolver.report
}
