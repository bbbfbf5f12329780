//! Sensor Lifecycle Orchestrator
//!
//! ## Overview
//!
//! [`Sensor`] pairs a device driver with its [`Controller`] and runs the
//! measurement cycle:
//!
//! ```text
//! Unpowered ─power_up─► PoweredWarming ─warm_up─► PoweredReady
//!     ─wake─► Activating ─► Stabilizing ─stabilization─► Stable
//!     ─► (MeasurementPending ─measurement─► MeasurementReady) × N
//!     ─► Averaged ─► Notified
//! ```
//!
//! A failed wake ends the cycle with [`SensorError::ActivationFailed`]. A
//! failed sample only costs that sample: the loop continues, the error bit is
//! set and the [`CycleReport`] counts it.
//!
//! ## Blocking and Non-Blocking Use
//!
//! [`Sensor::update`] blocks, spinning on the timing gates and calling the
//! clock's idle primitive between polls. Schedulers that cannot block drive
//! the stages themselves and poll the gates with [`Sensor::poll_warm_up`],
//! [`Sensor::poll_stability`] and [`Sensor::poll_measurement`], which return
//! `nb::Error::WouldBlock` until ready.
//!
//! ## Usage Example
//!
//! ```rust
//! use embedded_hal::digital::StatefulOutputPin;
//! use modsense_core::{
//!     config::SensorConfig,
//!     sensor::{Controller, Sensor},
//!     time::MockTimeSource,
//!     traits::{SensorDriver, TimeSource},
//!     variable::Variable,
//! };
//!
//! struct BoardTemp;
//!
//! impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for BoardTemp {
//!     fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
//!         ctl.verify_and_add_measurement_result(0, 23.5f32)
//!     }
//! }
//!
//! let temp = Variable::new(0, "temperatureRTC", "degreeCelsius", 2, "BoardTemp");
//! let clock = MockTimeSource::new(1).with_idle_step(1);
//! let config = SensorConfig::new("MaximDS3231", 1)?.with_measurements_to_average(4);
//!
//! let mut sensor = Sensor::new(BoardTemp, config, &clock)?;
//! sensor.register_variable(0, &temp)?;
//!
//! let report = sensor.update()?;
//! assert!(report.is_complete());
//! assert_eq!(temp.value(), 23.5);
//! # Ok::<(), modsense_core::SensorError>(())
//! ```

mod controller;

pub use controller::Controller;

use core::convert::Infallible;
use core::fmt::Write;

use embedded_hal::digital::StatefulOutputPin;
use heapless::String;

use crate::{
    config::SensorConfig,
    constants::{LOCATION_LEN, NAME_AND_LOCATION_LEN},
    errors::{SensorError, SensorResult},
    power::NoPowerPin,
    status::SensorStatus,
    traits::{SensorDriver, TimeSource},
    variable::{SensorId, Variable},
};

/// Outcome of one completed measurement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Sampling iterations run
    pub iterations: u8,

    /// Iterations whose dispatch or read failed
    pub failed_iterations: u8,

    /// Most recent per-iteration failure
    pub last_failure: Option<SensorError>,

    /// Variables that received a value
    pub notified: u8,

    /// Status byte at the end of the cycle
    pub status: SensorStatus,
}

impl CycleReport {
    /// Every iteration dispatched and read successfully
    pub fn is_complete(&self) -> bool {
        self.failed_iterations == 0
    }
}

/// A device driver bound to its lifecycle state
///
/// ## Type Parameters
///
/// - `D`: The device driver
/// - `C`: Clock used by the timing gates
/// - `P`: Power pin, [`NoPowerPin`] for always-powered devices
///
/// The lifetime `'a` is the lifetime of the registered [`Variable`]s.
#[derive(Debug)]
pub struct Sensor<'a, D, C, P = NoPowerPin> {
    driver: D,
    ctl: Controller<'a, C, P>,
}

impl<'a, D, C> Sensor<'a, D, C, NoPowerPin>
where
    D: SensorDriver<C, NoPowerPin>,
    C: TimeSource,
{
    /// Sensor without power control
    pub fn new(driver: D, config: SensorConfig, clock: C) -> SensorResult<Self> {
        Ok(Self {
            driver,
            ctl: Controller::new(config, clock, None)?,
        })
    }
}

impl<'a, D, C, P> Sensor<'a, D, C, P>
where
    D: SensorDriver<C, P>,
    C: TimeSource,
    P: StatefulOutputPin,
{
    /// Sensor switched by `power_pin`
    pub fn with_power_pin(driver: D, config: SensorConfig, clock: C, power_pin: P) -> SensorResult<Self> {
        Ok(Self {
            driver,
            ctl: Controller::new(config, clock, Some(power_pin))?,
        })
    }

    // ===== ACCESSORS =====

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn controller(&self) -> &Controller<'a, C, P> {
        &self.ctl
    }

    pub fn controller_mut(&mut self) -> &mut Controller<'a, C, P> {
        &mut self.ctl
    }

    pub fn id(&self) -> SensorId {
        self.ctl.id()
    }

    pub fn name(&self) -> &str {
        self.ctl.name()
    }

    pub fn data_pin(&self) -> Option<u8> {
        self.ctl.data_pin()
    }

    /// Power pin, `None` for always-powered devices
    pub fn power_pin(&self) -> Option<&P> {
        self.ctl.power_pin()
    }

    pub fn location(&self) -> String<LOCATION_LEN> {
        self.driver.location(&self.ctl)
    }

    /// `"<name> at <location>"`
    pub fn name_and_location(&self) -> String<NAME_AND_LOCATION_LEN> {
        let mut out = String::new();
        // Sized to hold the longest name plus the longest location
        let _ = write!(out, "{} at {}", self.ctl.name(), self.location().as_str());
        out
    }

    /// Lifecycle status byte for diagnostics
    pub fn status(&self) -> SensorStatus {
        self.ctl.status()
    }

    pub fn measurements_to_average(&self) -> u8 {
        self.ctl.measurements_to_average()
    }

    pub fn set_measurements_to_average(&mut self, count: u8) -> SensorResult<()> {
        self.ctl.set_measurements_to_average(count)
    }

    /// Final (or in-progress) value of a declared channel
    pub fn value(&self, slot: u8) -> Option<f32> {
        self.ctl.value(slot)
    }

    pub fn good_samples(&self, slot: u8) -> Option<u8> {
        self.ctl.good_samples(slot)
    }

    pub fn values(&self) -> &[f32] {
        self.ctl.values()
    }

    // ===== VARIABLES =====

    /// Bind `variable` to channel `slot`, replacing any previous binding
    ///
    /// `slot` must equal [`Variable::slot`], and the variable must not be held
    /// by another sensor.
    pub fn register_variable(&mut self, slot: u8, variable: &'a Variable) -> SensorResult<()> {
        let owner = self.ctl.id();
        self.ctl.variables.register(owner, slot, variable)?;
        sensor_debug!("{}: registered {} at slot {}", self.ctl.name(), variable.name(), slot);
        Ok(())
    }

    pub fn unregister_variable(&mut self, slot: u8) -> SensorResult<Option<&'a Variable>> {
        self.ctl.variables.unregister(slot)
    }

    pub fn variable(&self, slot: u8) -> Option<&'a Variable> {
        self.ctl.variables.get(slot)
    }

    /// Push final channel values into the registered variables
    pub fn notify_variables(&self) -> usize {
        self.ctl.notify_variables()
    }

    // ===== LIFECYCLE STAGES =====

    /// One-time preparation; sets the setup bit on success
    pub fn setup(&mut self) -> SensorResult<()> {
        if self.driver.setup(&mut self.ctl) {
            self.ctl.mark_setup();
            sensor_debug!("{}: setup complete", self.ctl.name());
            Ok(())
        } else {
            self.ctl.mark_error();
            sensor_warn!("{}: setup failed", self.ctl.name());
            Err(SensorError::SetupFailed)
        }
    }

    pub fn check_power_on(&mut self) -> SensorResult<bool> {
        self.ctl.check_power_on()
    }

    pub fn power_up(&mut self) -> SensorResult<()> {
        self.driver.power_up(&mut self.ctl)
    }

    pub fn power_down(&mut self) -> SensorResult<()> {
        self.driver.power_down(&mut self.ctl)
    }

    /// Activate the device
    ///
    /// A failure always leaves it marked not awake. A success always leaves it
    /// marked awake, with the activation stamp taken now if the driver did not
    /// record one.
    pub fn wake(&mut self) -> bool {
        if self.driver.wake(&mut self.ctl) {
            if !self.ctl.status().is_awake() {
                sensor_warn!("{}: wake succeeded without marking activation", self.ctl.name());
                self.ctl.mark_activated();
            }
            true
        } else {
            self.ctl.mark_activation_failed();
            false
        }
    }

    pub fn sleep(&mut self) -> bool {
        self.driver.sleep(&mut self.ctl)
    }

    /// Request one reading; a failure always leaves nothing pending
    pub fn start_single_measurement(&mut self) -> bool {
        if self.driver.start_single_measurement(&mut self.ctl) {
            true
        } else {
            self.ctl.status_mut().clear(SensorStatus::MEASUREMENT_SUCCEEDED);
            self.ctl.mark_error();
            false
        }
    }

    pub fn add_single_measurement_result(&mut self) -> bool {
        self.driver.add_single_measurement_result(&mut self.ctl)
    }

    pub fn clear_values(&mut self) {
        self.ctl.clear_values();
    }

    pub fn verify_and_add_measurement_result(&mut self, slot: u8, value: impl Into<f32>) -> bool {
        self.ctl.verify_and_add_measurement_result(slot, value)
    }

    pub fn average_measurements(&mut self) {
        self.ctl.average_measurements();
    }

    // ===== TIMING GATES =====

    pub fn is_warmed_up(&self) -> bool {
        self.driver.is_warmed_up(&self.ctl)
    }

    pub fn is_stable(&self) -> bool {
        self.driver.is_stable(&self.ctl)
    }

    pub fn is_measurement_complete(&self) -> bool {
        self.driver.is_measurement_complete(&self.ctl)
    }

    pub fn poll_warm_up(&self) -> nb::Result<(), Infallible> {
        gate(self.is_warmed_up())
    }

    pub fn poll_stability(&self) -> nb::Result<(), Infallible> {
        gate(self.is_stable())
    }

    pub fn poll_measurement(&self) -> nb::Result<(), Infallible> {
        gate(self.is_measurement_complete())
    }

    /// Block until the device accepts commands
    pub fn wait_for_warm_up(&self) {
        self.block_on(Self::poll_warm_up);
    }

    /// Block until readings are stable
    pub fn wait_for_stability(&self) {
        self.block_on(Self::poll_stability);
    }

    /// Block until the pending reading is ready
    pub fn wait_for_measurement_completion(&self) {
        self.block_on(Self::poll_measurement);
    }

    fn block_on(&self, poll: impl Fn(&Self) -> nb::Result<(), Infallible>) {
        loop {
            match poll(self) {
                Ok(()) => return,
                Err(nb::Error::WouldBlock) => self.ctl.clock().idle(),
                Err(nb::Error::Other(never)) => match never {},
            }
        }
    }

    // ===== CYCLE =====

    /// Run one full measurement cycle
    ///
    /// Powers and wakes the device if needed, waits for stability, takes
    /// `measurements_to_average` samples, averages them, returns the device
    /// to the power and activation state it was found in, and notifies the
    /// registered variables.
    ///
    /// Fails only if power could not be established or the device could not
    /// be woken; in that case no sample is taken and the accumulator keeps its
    /// previous contents. Per-sample failures are reported in the
    /// [`CycleReport`].
    pub fn update(&mut self) -> SensorResult<CycleReport> {
        self.ctl.status_mut().clear(SensorStatus::ERROR);
        sensor_debug!("{}: update started", self.ctl.name());

        let was_powered = self.ctl.check_power_on()?;
        if !was_powered {
            self.power_up()?;
        } else if !self.ctl.status().is_powered() {
            self.ctl.adopt_power();
        }

        let was_awake = self.ctl.status().is_awake();
        if !was_awake {
            self.wait_for_warm_up();

            if !self.wake() {
                sensor_warn!("{}: activation failed, cycle aborted", self.ctl.name());
                if !was_powered {
                    self.restore_power();
                }
                return Err(SensorError::ActivationFailed);
            }
        }

        self.wait_for_stability();
        self.clear_values();

        let iterations = self.ctl.measurements_to_average();
        let mut failed_iterations = 0u8;
        let mut last_failure = None;

        for iteration in 0..iterations {
            let collected = if self.start_single_measurement() {
                self.wait_for_measurement_completion();
                self.add_single_measurement_result()
            } else {
                false
            };
            self.ctl.finish_measurement();

            if !collected {
                self.ctl.mark_error();
                failed_iterations += 1;
                last_failure = Some(SensorError::MeasurementFailed { iteration });
                sensor_warn!("{}: measurement {} failed", self.ctl.name(), iteration);
            }
        }

        self.average_measurements();

        if !was_awake && !self.sleep() {
            self.ctl.mark_error();
            sensor_warn!("{}: sleep failed", self.ctl.name());
        }
        if !was_powered {
            self.restore_power();
        }

        let notified = self.notify_variables();
        let report = CycleReport {
            iterations,
            failed_iterations,
            last_failure,
            notified: notified as u8,
            status: self.ctl.status(),
        };

        sensor_debug!(
            "{}: update finished, {} of {} samples ok, status {}",
            self.ctl.name(),
            iterations - failed_iterations,
            iterations,
            report.status.bits()
        );
        Ok(report)
    }

    fn restore_power(&mut self) {
        if self.power_down().is_err() {
            sensor_warn!("{}: could not power down after cycle", self.ctl.name());
        }
    }
}

fn gate(ready: bool) -> nb::Result<(), Infallible> {
    if ready {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}
