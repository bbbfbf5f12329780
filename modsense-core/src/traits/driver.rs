//! Driver Hook Contract
//!
//! A concrete device plugs into the lifecycle by implementing
//! [`SensorDriver`]. Only [`add_single_measurement_result`] is mandatory;
//! every other hook has the generic behavior of a passive device that needs
//! nothing but power and time.
//!
//! ## Hook Rules
//!
//! Overrides talk to the device and then record the outcome on the
//! [`Controller`]:
//!
//! | Hook                        | On success                          | On failure                        |
//! |-----------------------------|-------------------------------------|-----------------------------------|
//! | `wake`                      | `mark_activated()`                  | `mark_activation_failed()`        |
//! | `sleep`                     | `mark_asleep()`                     | leave state, return `false`       |
//! | `start_single_measurement`  | `mark_measurement_requested(true)`  | `mark_measurement_requested(false)` |
//! | `add_single_measurement_result` | `verify_and_add_measurement_result(..)` per channel | add the sentinel or nothing |
//!
//! The orchestrator enforces the failure column itself when a hook returns
//! `false`, so a forgetful driver cannot leave a failed stage marked as
//! reached.
//!
//! ## Example Implementation
//!
//! ```rust
//! use embedded_hal::digital::StatefulOutputPin;
//! use modsense_core::sensor::Controller;
//! use modsense_core::traits::{SensorDriver, TimeSource};
//!
//! /// Reports the number of completed cycles
//! struct SampleCounter {
//!     count: u16,
//! }
//!
//! impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for SampleCounter {
//!     fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
//!         self.count += 1;
//!         ctl.verify_and_add_measurement_result(0, self.count)
//!     }
//! }
//! ```
//!
//! [`add_single_measurement_result`]: SensorDriver::add_single_measurement_result

use core::fmt::Write;

use embedded_hal::digital::StatefulOutputPin;
use heapless::String;

use crate::{
    constants::LOCATION_LEN,
    errors::SensorResult,
    sensor::Controller,
    traits::TimeSource,
};

/// Device-specific hooks called by the lifecycle orchestrator
pub trait SensorDriver<C: TimeSource, P: StatefulOutputPin> {
    /// How the device is attached to the MCU
    ///
    /// Defaults to `Pin<n>` from the configured data pin.
    fn location(&self, ctl: &Controller<'_, C, P>) -> String<LOCATION_LEN> {
        let mut location = String::new();
        // Both forms are far shorter than LOCATION_LEN
        let _ = match ctl.data_pin() {
            Some(pin) => write!(location, "Pin{}", pin),
            None => write!(location, "Unknown"),
        };
        location
    }

    /// One-time preparation before the first cycle
    fn setup(&mut self, _ctl: &mut Controller<'_, C, P>) -> bool {
        true
    }

    /// Switch the device on
    fn power_up(&mut self, ctl: &mut Controller<'_, C, P>) -> SensorResult<()> {
        ctl.power_up()
    }

    /// Switch the device off
    fn power_down(&mut self, ctl: &mut Controller<'_, C, P>) -> SensorResult<()> {
        ctl.power_down()
    }

    /// Bring a powered device into a measuring state
    fn wake(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        ctl.default_wake()
    }

    /// Stop measuring without removing power
    ///
    /// The default takes no action and leaves the activation stamp in place.
    fn sleep(&mut self, _ctl: &mut Controller<'_, C, P>) -> bool {
        true
    }

    /// Ask the device for one reading
    ///
    /// The default assumes dispatch is instant and always confirmed.
    fn start_single_measurement(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        ctl.mark_measurement_requested(true);
        true
    }

    /// Collect one reading and feed it to the accumulator
    fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool;

    /// Ready to accept commands after power-on
    fn is_warmed_up(&self, ctl: &Controller<'_, C, P>) -> bool {
        ctl.warm_up_elapsed()
    }

    /// Readings are trustworthy after activation
    fn is_stable(&self, ctl: &Controller<'_, C, P>) -> bool {
        ctl.stabilization_elapsed()
    }

    /// The pending reading is ready
    fn is_measurement_complete(&self, ctl: &Controller<'_, C, P>) -> bool {
        ctl.measurement_elapsed()
    }
}
