//! Sensor Configuration
//!
//! Everything fixed at construction time: identity, channel count, timing
//! constants and the averaging count. Drivers usually build their config
//! from datasheet constants; deployments can also load it with serde.
//!
//! ```rust
//! use modsense_core::config::SensorConfig;
//!
//! // Turbidity sonde: 500 ms warm-up, 22 s stabilization, 1.7 s per reading
//! let config = SensorConfig::new("YosemitechY511", 2)?
//!     .with_timing(500, 22_000, 1_700)
//!     .with_measurements_to_average(3);
//!
//! config.validate()?;
//! assert_eq!(config.timing.stabilization().ticks(), 22_000);
//! # Ok::<(), modsense_core::SensorError>(())
//! ```

use fugit::MillisDurationU32;
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MEASUREMENTS_TO_AVERAGE, DEFAULT_MEASUREMENT_MS, DEFAULT_STABILIZATION_MS,
    DEFAULT_WARM_UP_MS, MAX_NUMBER_VARS, SENSOR_NAME_LEN,
};
use crate::errors::{SensorError, SensorResult};

/// Timing constants of one device, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorTiming {
    /// Power-on until the device accepts commands
    pub warm_up_ms: u32,

    /// Activation until readings are stable
    pub stabilization_ms: u32,

    /// Measurement request until the result is ready
    pub measurement_ms: u32,
}

impl SensorTiming {
    pub const fn new(warm_up_ms: u32, stabilization_ms: u32, measurement_ms: u32) -> Self {
        Self {
            warm_up_ms,
            stabilization_ms,
            measurement_ms,
        }
    }

    pub const fn warm_up(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.warm_up_ms)
    }

    pub const fn stabilization(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.stabilization_ms)
    }

    pub const fn measurement(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.measurement_ms)
    }
}

impl Default for SensorTiming {
    fn default() -> Self {
        Self::new(DEFAULT_WARM_UP_MS, DEFAULT_STABILIZATION_MS, DEFAULT_MEASUREMENT_MS)
    }
}

/// Construction-time configuration of a sensor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// Human-readable sensor name
    pub name: String<SENSOR_NAME_LEN>,

    /// Number of result channels the device reports
    pub num_variables: u8,

    /// MCU pin (or bus position) the data line is attached to
    pub data_pin: Option<u8>,

    /// Samples averaged into one result
    pub measurements_to_average: u8,

    pub timing: SensorTiming,
}

impl SensorConfig {
    /// Configuration with default timing and a single sample per cycle
    pub fn new(name: &str, num_variables: u8) -> SensorResult<Self> {
        let mut stored = String::new();
        stored.push_str(name).map_err(|_| SensorError::NameTooLong {
            max: SENSOR_NAME_LEN as u8,
        })?;

        Ok(Self {
            name: stored,
            num_variables,
            ..Self::default()
        })
    }

    pub fn with_timing(mut self, warm_up_ms: u32, stabilization_ms: u32, measurement_ms: u32) -> Self {
        self.timing = SensorTiming::new(warm_up_ms, stabilization_ms, measurement_ms);
        self
    }

    pub fn with_data_pin(mut self, pin: u8) -> Self {
        self.data_pin = Some(pin);
        self
    }

    pub fn with_measurements_to_average(mut self, count: u8) -> Self {
        self.measurements_to_average = count;
        self
    }

    /// Check the channel bound and the averaging count
    pub fn validate(&self) -> SensorResult<()> {
        if usize::from(self.num_variables) > MAX_NUMBER_VARS {
            return Err(SensorError::TooManyVariables {
                requested: self.num_variables,
                max: MAX_NUMBER_VARS as u8,
            });
        }

        if self.measurements_to_average == 0 {
            return Err(SensorError::InvalidAveragingCount);
        }

        Ok(())
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        let mut name = String::new();
        // "Unknown" always fits
        let _ = name.push_str("Unknown");

        Self {
            name,
            num_variables: 1,
            data_pin: None,
            measurements_to_average: DEFAULT_MEASUREMENTS_TO_AVERAGE,
            timing: SensorTiming::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generic_sensor() {
        let config = SensorConfig::default();
        assert_eq!(config.name.as_str(), "Unknown");
        assert_eq!(config.num_variables, 1);
        assert_eq!(config.measurements_to_average, 1);
        assert_eq!(config.timing, SensorTiming::new(0, 0, 0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = SensorConfig::new("BoschBME280", 4)
            .unwrap()
            .with_timing(100, 0, 1000)
            .with_data_pin(7)
            .with_measurements_to_average(5);

        assert_eq!(config.timing.warm_up().ticks(), 100);
        assert_eq!(config.timing.measurement().ticks(), 1000);
        assert_eq!(config.data_pin, Some(7));
        assert_eq!(config.measurements_to_average, 5);
    }

    #[test]
    fn long_name_is_rejected() {
        let err = SensorConfig::new("AVeryLongSensorNameThatDoesNotFit", 1).unwrap_err();
        assert_eq!(err, SensorError::NameTooLong { max: 24 });
    }

    #[test]
    fn too_many_variables() {
        let config = SensorConfig::new("Sonde", 9).unwrap();
        assert_eq!(
            config.validate(),
            Err(SensorError::TooManyVariables { requested: 9, max: 8 })
        );
    }

    #[test]
    fn zero_averaging_is_invalid() {
        let config = SensorConfig::default().with_measurements_to_average(0);
        assert_eq!(config.validate(), Err(SensorError::InvalidAveragingCount));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "name": "MaximDS3231",
            "timing": { "measurement_ms": 250 }
        }"#;

        let config: SensorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name.as_str(), "MaximDS3231");
        assert_eq!(config.num_variables, 1);
        assert_eq!(config.timing, SensorTiming::new(0, 0, 250));
        assert!(config.validate().is_ok());
    }
}
