//! Sensor lifecycle controller for ModSense
//!
//! Drives environmental sensors through power-up, warm-up, activation,
//! stabilization, repeated sampling and averaging, then pushes the result
//! into application-owned variables.
//!
//! Key constraints:
//! - Runs on small MCUs (`no_std`, no heap)
//! - Fixed capacity of 8 result channels per sensor
//! - One logical owner drives a sensor; no locks
//!
//! ```no_run
//! use embedded_hal::digital::StatefulOutputPin;
//! use modsense_core::{
//!     Controller, Sensor, SensorConfig, SensorDriver, TimeSource, Variable,
//!     time::MonotonicClock,
//! };
//!
//! struct Thermistor;
//!
//! impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for Thermistor {
//!     fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
//!         ctl.verify_and_add_measurement_result(0, 18.25f32)
//!     }
//! }
//!
//! let water_temp = Variable::new(0, "temperature", "degreeCelsius", 2, "WaterTemp");
//! let config = SensorConfig::new("Thermistor", 1)?
//!     .with_timing(0, 100, 50)
//!     .with_measurements_to_average(5);
//!
//! let mut sensor = Sensor::new(Thermistor, config, MonotonicClock::new())?;
//! sensor.register_variable(0, &water_temp)?;
//!
//! // Blocks for the stabilization time plus five measurement times
//! let report = sensor.update()?;
//! println!("{} samples failed, value {}", report.failed_iterations, water_temp.formatted_value());
//! # Ok::<(), modsense_core::SensorError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

#[macro_use]
mod logging;

pub mod accumulator;
pub mod config;
pub mod constants;
pub mod errors;
pub mod power;
pub mod sensor;
pub mod status;
pub mod time;
pub mod traits;
pub mod variable;

// Public API
pub use accumulator::ResultAccumulator;
pub use config::{SensorConfig, SensorTiming};
pub use errors::{SensorError, SensorResult};
pub use power::NoPowerPin;
pub use sensor::{Controller, CycleReport, Sensor};
pub use status::SensorStatus;
pub use traits::{SensorDriver, TimeSource};
pub use variable::{SensorId, Variable};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
