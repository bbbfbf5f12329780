//! Lifecycle controller state
//!
//! [`Controller`] holds everything the lifecycle needs besides the driver:
//! configuration, clock, power pin, status byte, stage timestamps, the result
//! accumulator and the variable registry. Driver hooks receive it by mutable
//! reference and use the `mark_*` helpers to record what they did.
//!
//! ## Stage Timestamps
//!
//! ```text
//! power_on ──warm_up──► activated ──stabilization──► requested ──measurement──► ready
//! ```
//!
//! A stage timestamp of 0 means the stage has not started. The gate
//! predicates also consult the status byte, so a stage that never started
//! reads as "nothing to wait for" and a blocking wait cannot hang on it.

use embedded_hal::digital::StatefulOutputPin;
use fugit::MillisDurationU32;
use heapless::String;

use crate::{
    accumulator::ResultAccumulator,
    config::SensorConfig,
    constants::{MAX_NUMBER_VARS, SENSOR_NAME_LEN},
    errors::{SensorError, SensorResult},
    status::SensorStatus,
    time::{elapsed_ms, TimeSource, Timestamp},
    variable::{SensorId, VariableRegistry},
};

/// Mutable lifecycle state shared between the orchestrator and driver hooks
#[derive(Debug)]
pub struct Controller<'a, C, P> {
    id: SensorId,
    name: String<SENSOR_NAME_LEN>,
    num_variables: u8,
    data_pin: Option<u8>,
    warm_up: MillisDurationU32,
    stabilization: MillisDurationU32,
    measurement: MillisDurationU32,
    measurements_to_average: u8,

    clock: C,
    power_pin: Option<P>,

    status: SensorStatus,
    millis_power_on: Timestamp,
    millis_activated: Timestamp,
    millis_measurement_requested: Timestamp,

    values: ResultAccumulator<MAX_NUMBER_VARS>,
    pub(crate) variables: VariableRegistry<'a>,
}

impl<'a, C: TimeSource, P: StatefulOutputPin> Controller<'a, C, P> {
    pub(crate) fn new(config: SensorConfig, clock: C, power_pin: Option<P>) -> SensorResult<Self> {
        config.validate()?;

        Ok(Self {
            id: SensorId::next(),
            name: config.name,
            num_variables: config.num_variables,
            data_pin: config.data_pin,
            warm_up: config.timing.warm_up(),
            stabilization: config.timing.stabilization(),
            measurement: config.timing.measurement(),
            measurements_to_average: config.measurements_to_average,
            clock,
            power_pin,
            status: SensorStatus::empty(),
            millis_power_on: 0,
            millis_activated: 0,
            millis_measurement_requested: 0,
            values: ResultAccumulator::new(usize::from(config.num_variables)),
            variables: VariableRegistry::new(config.num_variables),
        })
    }

    // ===== IDENTITY AND CONFIGURATION =====

    pub fn id(&self) -> SensorId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn num_variables(&self) -> u8 {
        self.num_variables
    }

    pub fn data_pin(&self) -> Option<u8> {
        self.data_pin
    }

    pub fn has_power_pin(&self) -> bool {
        self.power_pin.is_some()
    }

    pub fn power_pin(&self) -> Option<&P> {
        self.power_pin.as_ref()
    }

    /// Direct access to the power pin, for drivers with a custom power sequence
    pub fn power_pin_mut(&mut self) -> Option<&mut P> {
        self.power_pin.as_mut()
    }

    pub fn warm_up_time(&self) -> MillisDurationU32 {
        self.warm_up
    }

    pub fn stabilization_time(&self) -> MillisDurationU32 {
        self.stabilization
    }

    pub fn measurement_time(&self) -> MillisDurationU32 {
        self.measurement
    }

    pub fn measurements_to_average(&self) -> u8 {
        self.measurements_to_average
    }

    /// Change the number of samples per cycle
    pub fn set_measurements_to_average(&mut self, count: u8) -> SensorResult<()> {
        if count == 0 {
            return Err(SensorError::InvalidAveragingCount);
        }
        self.measurements_to_average = count;
        Ok(())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ===== STATUS =====

    pub fn status(&self) -> SensorStatus {
        self.status
    }

    /// Raw status access for drivers with device-specific bookkeeping
    pub fn status_mut(&mut self) -> &mut SensorStatus {
        &mut self.status
    }

    /// Record a failure without changing any other milestone
    pub fn mark_error(&mut self) {
        self.status.set(SensorStatus::ERROR);
    }

    pub fn mark_setup(&mut self) {
        self.status.set(SensorStatus::SETUP);
    }

    /// Power-on time, 0 if unpowered
    pub fn powered_on_at(&self) -> Timestamp {
        self.millis_power_on
    }

    /// Activation time, 0 if not awake
    pub fn activated_at(&self) -> Timestamp {
        self.millis_activated
    }

    /// Time of the pending measurement request, 0 if none
    pub fn measurement_requested_at(&self) -> Timestamp {
        self.millis_measurement_requested
    }

    // ===== POWER =====

    /// Whether the device currently has power
    ///
    /// Reads the pin back; devices without a power pin are always powered.
    pub fn check_power_on(&mut self) -> SensorResult<bool> {
        let Some(pin) = self.power_pin.as_mut() else {
            return Ok(true);
        };

        match pin.is_set_high() {
            Ok(high) => Ok(high),
            Err(e) => {
                self.status.set(SensorStatus::ERROR);
                Err(SensorError::power_pin(e))
            }
        }
    }

    /// Drive the power pin high and start the warm-up clock
    pub fn power_up(&mut self) -> SensorResult<()> {
        self.status.set(SensorStatus::POWER_ATTEMPTED);

        if let Some(pin) = self.power_pin.as_mut() {
            if let Err(e) = pin.set_high() {
                self.status.set(SensorStatus::ERROR);
                sensor_warn!("{}: power pin could not be driven high", self.name.as_str());
                return Err(SensorError::power_pin(e));
            }
        }

        self.millis_power_on = self.clock.now();
        self.status.set(SensorStatus::POWER_SUCCEEDED);
        sensor_debug!("{}: powered at {}", self.name.as_str(), self.millis_power_on);
        Ok(())
    }

    /// Drive the power pin low and forget every stage timestamp
    ///
    /// Setup and error bits survive; all power, activation and measurement
    /// bits are cleared.
    pub fn power_down(&mut self) -> SensorResult<()> {
        if let Some(pin) = self.power_pin.as_mut() {
            if let Err(e) = pin.set_low() {
                self.status.set(SensorStatus::ERROR);
                sensor_warn!("{}: power pin could not be driven low", self.name.as_str());
                return Err(SensorError::power_pin(e));
            }
        }

        self.millis_power_on = 0;
        self.millis_activated = 0;
        self.millis_measurement_requested = 0;
        self.status.clear(SensorStatus::POWER_CYCLE_MASK);
        sensor_debug!("{}: powered down", self.name.as_str());
        Ok(())
    }

    /// Take over a power state established elsewhere
    ///
    /// Used when the device is found powered without this controller having
    /// powered it (always-on devices, a rail shared with another sensor). The
    /// warm-up clock starts now if it was not running.
    pub(crate) fn adopt_power(&mut self) {
        if self.power_pin.is_some() && self.millis_power_on == 0 {
            self.millis_power_on = self.clock.now();
        }
        self.status
            .set(SensorStatus::POWER_ATTEMPTED.union(SensorStatus::POWER_SUCCEEDED));
    }

    // ===== ACTIVATION =====

    /// Default wake: succeeds only if power was established
    ///
    /// A device without a power pin is always powered.
    pub fn default_wake(&mut self) -> bool {
        self.status.set(SensorStatus::WAKE_ATTEMPTED);

        if self.power_pin.is_some() && !self.status.is_powered() {
            sensor_warn!("{}: wake attempted without power", self.name.as_str());
            self.mark_activation_failed();
            return false;
        }

        self.mark_activated();
        true
    }

    /// Record a successful activation at the current time
    pub fn mark_activated(&mut self) {
        self.millis_activated = self.clock.now();
        self.status
            .set(SensorStatus::WAKE_ATTEMPTED.union(SensorStatus::AWAKE));
        sensor_debug!("{}: activated at {}", self.name.as_str(), self.millis_activated);
    }

    /// Record a failed activation: no timestamp, no awake bit, error bit set
    pub fn mark_activation_failed(&mut self) {
        self.millis_activated = 0;
        self.status.clear(SensorStatus::AWAKE);
        self.status
            .set(SensorStatus::WAKE_ATTEMPTED.union(SensorStatus::ERROR));
    }

    /// Record that the device was put to sleep
    pub fn mark_asleep(&mut self) {
        self.millis_activated = 0;
        self.millis_measurement_requested = 0;
        self.status.clear(SensorStatus::ACTIVATION_MASK);
        sensor_debug!("{}: asleep", self.name.as_str());
    }

    // ===== MEASUREMENT =====

    /// Record a measurement request at the current time
    ///
    /// `dispatched` tells whether the device confirmed the request. An
    /// unconfirmed request sets the error bit and leaves nothing pending.
    pub fn mark_measurement_requested(&mut self, dispatched: bool) {
        self.millis_measurement_requested = self.clock.now();
        self.status.set(SensorStatus::MEASUREMENT_REQUESTED);

        if dispatched {
            self.status.set(SensorStatus::MEASUREMENT_SUCCEEDED);
        } else {
            self.status.clear(SensorStatus::MEASUREMENT_SUCCEEDED);
            self.status.set(SensorStatus::ERROR);
            sensor_warn!("{}: measurement request not confirmed", self.name.as_str());
        }
    }

    /// Forget the pending measurement once its result has been collected
    pub fn finish_measurement(&mut self) {
        self.millis_measurement_requested = 0;
        self.status.clear(SensorStatus::MEASUREMENT_MASK);
    }

    // ===== TIMING GATES =====

    /// Warm-up time has passed since power-on (inclusive)
    ///
    /// Always true without a power pin, or when the device is not powered
    /// and there is nothing to wait for.
    pub fn warm_up_elapsed(&self) -> bool {
        if self.power_pin.is_none() || !self.status.is_powered() {
            return true;
        }
        self.elapsed_since(self.millis_power_on) >= u64::from(self.warm_up.ticks())
    }

    /// Stabilization time has passed since activation (inclusive)
    pub fn stabilization_elapsed(&self) -> bool {
        if !self.status.is_awake() {
            return true;
        }
        self.elapsed_since(self.millis_activated) >= u64::from(self.stabilization.ticks())
    }

    /// Measurement time has passed since the request (inclusive)
    ///
    /// True immediately when no confirmed measurement is pending.
    pub fn measurement_elapsed(&self) -> bool {
        if !self.status.is_measurement_pending() {
            return true;
        }
        self.elapsed_since(self.millis_measurement_requested) >= u64::from(self.measurement.ticks())
    }

    fn elapsed_since(&self, start: Timestamp) -> u64 {
        elapsed_ms(start, self.clock.now())
    }

    // ===== RESULTS =====

    /// Reset every declared channel to the sentinel
    pub fn clear_values(&mut self) {
        self.values.clear_values();
    }

    /// Add one sample for `slot`; invalid readings and slots are ignored
    ///
    /// Returns whether the sample was accepted.
    pub fn verify_and_add_measurement_result(&mut self, slot: u8, value: impl Into<f32>) -> bool {
        let accepted = self.values.verify_and_add(usize::from(slot), value);
        if !accepted {
            sensor_trace!("{}: sample for slot {} rejected", self.name.as_str(), slot);
        }
        accepted
    }

    /// Turn each channel's sum into its mean
    pub fn average_measurements(&mut self) {
        self.values.average_measurements();
    }

    pub fn value(&self, slot: u8) -> Option<f32> {
        self.values.value(usize::from(slot))
    }

    pub fn good_samples(&self, slot: u8) -> Option<u8> {
        self.values.good_samples(usize::from(slot))
    }

    pub fn values(&self) -> &[f32] {
        self.values.values()
    }

    /// Push final channel values into the registered variables
    pub fn notify_variables(&self) -> usize {
        self.variables.notify(|slot| self.values.value(slot))
    }
}
