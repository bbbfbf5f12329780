//! Error Types for Sensor Lifecycle Failures
//!
//! ## Design Philosophy
//!
//! The controller runs on small microcontrollers, so its errors follow the
//! same rules as the rest of the crate:
//!
//! 1. **Small Size**: Every variant carries at most a few bytes of context.
//!
//! 2. **No Heap Allocation**: No `String`; messages are static.
//!
//! 3. **Copy Semantics**: Errors are `Copy` so they can be returned from hot
//!    paths and stored in cycle reports.
//!
//! ## Error Categories
//!
//! ### Lifecycle Failures
//! - `SetupFailed`: The driver's one-time preparation failed.
//! - `ActivationFailed`: The wake hook failed. The cycle is aborted before any
//!   sampling and the accumulator is left untouched.
//! - `MeasurementFailed`: One sampling iteration failed. The iteration adds no
//!   data; the cycle continues. Surfaced through [`CycleReport`] rather than
//!   as the return value of `update()`.
//!
//! ### Configuration Errors
//! - `SlotOutOfRange`, `TooManyVariables`, `InvalidAveragingCount`,
//!   `NameTooLong`
//! - `SlotMismatch`, `AlreadyRegistered`: a variable may be bound only to its
//!   own slot of a single sensor
//!
//! ### Hardware Errors
//! - `PowerPin`: The power control pin could not be driven or read.
//!
//! A reading equal to the sentinel is not an error at all: it is silently
//! excluded from averaging.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use modsense_core::SensorError;
//!
//! fn handle_cycle(result: Result<(), SensorError>) {
//!     match result {
//!         Ok(()) => {}
//!         Err(SensorError::ActivationFailed) => {
//!             // Device did not respond; try again on the next logging interval
//!         }
//!         Err(SensorError::PowerPin { .. }) => {
//!             // Board-level fault
//!         }
//!         Err(_) => {}
//!     }
//! }
//! ```
//!
//! [`CycleReport`]: crate::sensor::CycleReport

use embedded_hal::digital::ErrorKind;
use thiserror_no_std::Error;

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Sensor lifecycle errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The driver's one-time setup reported failure
    #[error("Sensor setup failed")]
    SetupFailed,

    /// The wake hook reported failure; no measurement was attempted
    #[error("Sensor activation failed")]
    ActivationFailed,

    /// A single sampling iteration failed to dispatch or read
    #[error("Measurement {iteration} failed")]
    MeasurementFailed {
        /// Zero-based iteration within the averaging cycle
        iteration: u8,
    },

    /// Slot index beyond the channels the sensor declares
    #[error("Slot {slot} outside declared range 0..{declared}")]
    SlotOutOfRange {
        /// Requested slot
        slot: u8,
        /// Number of declared channels
        declared: u8,
    },

    /// Variable was built for a different slot than the one requested
    #[error("Variable for slot {expected} cannot be registered at slot {slot}")]
    SlotMismatch {
        /// Requested slot
        slot: u8,
        /// Slot the variable was built for
        expected: u8,
    },

    /// Variable is already bound to another sensor
    #[error("Variable for slot {slot} is registered with another sensor")]
    AlreadyRegistered {
        /// Slot of the variable
        slot: u8,
    },

    /// Configuration declares more channels than the controller can hold
    #[error("Sensor declares {requested} variables, maximum is {max}")]
    TooManyVariables {
        /// Declared channel count
        requested: u8,
        /// Capacity bound
        max: u8,
    },

    /// At least one measurement must be taken per cycle
    #[error("Measurements to average must be at least 1")]
    InvalidAveragingCount,

    /// Sensor name does not fit the fixed-size name buffer
    #[error("Sensor name exceeds {max} bytes")]
    NameTooLong {
        /// Maximum name length in bytes
        max: u8,
    },

    /// The power control pin returned an error
    #[error("Power pin error: {kind:?}")]
    PowerPin {
        /// Error category reported by the HAL
        kind: ErrorKind,
    },
}

impl SensorError {
    /// Wrap an embedded-hal pin error
    pub fn power_pin<E: embedded_hal::digital::Error>(error: E) -> Self {
        Self::PowerPin { kind: error.kind() }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SetupFailed =>
                defmt::write!(fmt, "Setup failed"),
            Self::ActivationFailed =>
                defmt::write!(fmt, "Activation failed"),
            Self::MeasurementFailed { iteration } =>
                defmt::write!(fmt, "Measurement {} failed", iteration),
            Self::SlotOutOfRange { slot, declared } =>
                defmt::write!(fmt, "Slot {} outside 0..{}", slot, declared),
            Self::SlotMismatch { slot, expected } =>
                defmt::write!(fmt, "Slot {} requested, variable is for {}", slot, expected),
            Self::AlreadyRegistered { slot } =>
                defmt::write!(fmt, "Variable for slot {} owned elsewhere", slot),
            Self::TooManyVariables { requested, max } =>
                defmt::write!(fmt, "{} variables, max {}", requested, max),
            Self::InvalidAveragingCount =>
                defmt::write!(fmt, "Averaging count must be >= 1"),
            Self::NameTooLong { max } =>
                defmt::write!(fmt, "Name exceeds {} bytes", max),
            Self::PowerPin { kind } =>
                defmt::write!(fmt, "Power pin error: {}", kind),
        }
    }
}
