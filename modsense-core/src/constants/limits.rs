//! Capacity and Sentinel Limits
//!
//! Sizes for every fixed-capacity table in the controller. Nothing here
//! allocates; all storage is sized at compile time.

/// Largest number of result channels a single sensor can report.
///
/// Bounds the accumulator and the variable registry. Multi-parameter
/// sondes report at most 8 values per measurement.
pub const MAX_NUMBER_VARS: usize = 8;

/// Marker for "no valid reading".
///
/// Drivers report this for failed reads. It is never averaged in, and a
/// channel with no good samples keeps this value after averaging. A genuine
/// reading of exactly -9999 is indistinguishable and is treated as invalid.
pub const SENSOR_FAILURE_VALUE: f32 = -9999.0;

/// Maximum length of a sensor name (bytes).
pub const SENSOR_NAME_LEN: usize = 24;

/// Maximum length of a sensor location string (bytes).
///
/// Fits `modbus_0x0a`, `I2C_0x76`, `Pin127` and similar descriptions.
pub const LOCATION_LEN: usize = 32;

/// Maximum length of the combined `"<name> at <location>"` string (bytes).
pub const NAME_AND_LOCATION_LEN: usize = SENSOR_NAME_LEN + 4 + LOCATION_LEN;

/// Maximum length of a formatted variable value (bytes).
pub const FORMATTED_VALUE_LEN: usize = 24;
