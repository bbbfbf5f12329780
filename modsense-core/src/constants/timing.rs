//! Default Timing Constants
//!
//! Defaults used when a configuration leaves a timing value unset. All
//! durations are in milliseconds.

/// Time from power-on until the device accepts commands (ms).
///
/// Zero for devices that are always powered or respond instantly.
pub const DEFAULT_WARM_UP_MS: u32 = 0;

/// Time from activation until readings are stable (ms).
pub const DEFAULT_STABILIZATION_MS: u32 = 0;

/// Time from a measurement request until the result is ready (ms).
pub const DEFAULT_MEASUREMENT_MS: u32 = 0;

/// Number of samples averaged into one result.
pub const DEFAULT_MEASUREMENTS_TO_AVERAGE: u8 = 1;
