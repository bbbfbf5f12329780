//! Common test utilities for lifecycle integration tests
//!
//! This module provides:
//! - A power pin double whose level can be observed after it is moved into a sensor
//! - A scripted driver that replays per-iteration readings and can be told to fail
//! - Clock and config fixtures

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin, StatefulOutputPin};
use modsense_core::{
    config::SensorConfig,
    constants::SENSOR_FAILURE_VALUE,
    sensor::Controller,
    time::MockTimeSource,
    traits::{SensorDriver, TimeSource},
};

/// Start time for mock clocks; nonzero so no stage stamp reads as unset
pub const T0: u64 = 1_000;

/// Mock clock that advances 1 ms per idle call
pub fn test_clock() -> MockTimeSource {
    MockTimeSource::new(T0).with_idle_step(1)
}

/// Config with the given timing (ms) and averaging count
pub fn config(name: &str, channels: u8, timing: (u32, u32, u32), average: u8) -> SensorConfig {
    SensorConfig::new(name, channels)
        .unwrap()
        .with_timing(timing.0, timing.1, timing.2)
        .with_measurements_to_average(average)
}

// ===== POWER PIN =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPinError;

impl digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Power pin whose level is shared with the test through [`PinProbe`]
#[derive(Debug)]
pub struct MockPin {
    level: Rc<Cell<bool>>,
    broken: bool,
}

/// Observer half of a [`MockPin`]
#[derive(Debug, Clone)]
pub struct PinProbe {
    level: Rc<Cell<bool>>,
}

impl PinProbe {
    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    /// Simulate another sensor on the same rail switching it
    pub fn drive(&self, high: bool) {
        self.level.set(high);
    }
}

impl MockPin {
    /// A working pin, initially low
    pub fn new() -> (Self, PinProbe) {
        Self::build(false)
    }

    /// A pin whose writes always fail
    pub fn broken() -> (Self, PinProbe) {
        Self::build(true)
    }

    fn build(broken: bool) -> (Self, PinProbe) {
        let level = Rc::new(Cell::new(false));
        let probe = PinProbe { level: Rc::clone(&level) };
        (Self { level, broken }, probe)
    }

    fn write(&mut self, high: bool) -> Result<(), MockPinError> {
        if self.broken {
            return Err(MockPinError);
        }
        self.level.set(high);
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = MockPinError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

// ===== DRIVER =====

/// Driver replaying one row of channel readings per sampling iteration
///
/// A row is reported as successful only if every reading in it was accepted,
/// so a sentinel reading counts as a failed iteration.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    readings: Vec<Vec<f32>>,
    cursor: usize,
    fail_wake: bool,
    unmarked_wake: bool,
    fail_start_on: Vec<usize>,
    real_sleep: bool,

    pub setup_ok: bool,
    pub wake_calls: usize,
    pub sleep_calls: usize,
    pub start_calls: usize,
    pub read_calls: usize,
}

impl ScriptedDriver {
    /// Single-channel script
    pub fn single(values: &[f32]) -> Self {
        Self::rows(values.iter().map(|v| vec![*v]).collect())
    }

    /// Multi-channel script, one row per iteration
    pub fn rows(readings: Vec<Vec<f32>>) -> Self {
        Self {
            readings,
            setup_ok: true,
            ..Self::default()
        }
    }

    pub fn failing_wake(mut self) -> Self {
        self.fail_wake = true;
        self
    }

    /// Report a successful wake without recording the activation
    pub fn with_unmarked_wake(mut self) -> Self {
        self.unmarked_wake = true;
        self
    }

    /// Make `start_single_measurement` fail on the given iteration
    pub fn failing_start_on(mut self, iteration: usize) -> Self {
        self.fail_start_on.push(iteration);
        self
    }

    /// Clear the activation state on sleep, like a device with a stop command
    pub fn with_real_sleep(mut self) -> Self {
        self.real_sleep = true;
        self
    }
}

impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for ScriptedDriver {
    fn setup(&mut self, _ctl: &mut Controller<'_, C, P>) -> bool {
        self.setup_ok
    }

    fn wake(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        self.wake_calls += 1;
        if self.fail_wake {
            return false;
        }
        if self.unmarked_wake {
            return true;
        }
        ctl.default_wake()
    }

    fn sleep(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        self.sleep_calls += 1;
        if self.real_sleep {
            ctl.mark_asleep();
        }
        true
    }

    fn start_single_measurement(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        let iteration = self.start_calls;
        self.start_calls += 1;

        if self.fail_start_on.contains(&iteration) {
            // The skipped iteration still consumes its scripted row
            self.cursor += 1;
            return false;
        }
        ctl.mark_measurement_requested(true);
        true
    }

    fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        self.read_calls += 1;

        let Some(row) = self.readings.get(self.cursor) else {
            return false;
        };
        self.cursor += 1;

        let mut all_accepted = true;
        for (slot, value) in row.iter().enumerate() {
            all_accepted &= ctl.verify_and_add_measurement_result(slot as u8, *value);
        }
        all_accepted
    }
}

/// Readings of a healthy device with one dropout
pub fn readings_with_dropout() -> [f32; 3] {
    [10.0, SENSOR_FAILURE_VALUE, 12.0]
}
