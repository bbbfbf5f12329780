//! Constants for ModSense Core
//!
//! Centralized numeric values used across the lifecycle controller. Each
//! constant documents its unit and where the value comes from.
//!
//! ## Organization
//!
//! - **Limits**: Channel capacity, sentinel value, string sizes
//! - **Timing**: Default timing constants and status bit positions

/// Capacity bounds, sentinel value and identifier sizes.
pub mod limits;

/// Default timing constants for the lifecycle gates.
pub mod timing;

pub use limits::{
    MAX_NUMBER_VARS, SENSOR_FAILURE_VALUE, SENSOR_NAME_LEN, LOCATION_LEN,
    NAME_AND_LOCATION_LEN, FORMATTED_VALUE_LEN,
};

pub use timing::{
    DEFAULT_WARM_UP_MS, DEFAULT_STABILIZATION_MS, DEFAULT_MEASUREMENT_MS,
    DEFAULT_MEASUREMENTS_TO_AVERAGE,
};
