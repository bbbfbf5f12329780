//! Basic Measurement Cycle Example
//!
//! This example runs a switched temperature/humidity sensor through complete
//! update cycles against the host clock.
//!
//! ## What You'll Learn
//!
//! - Writing a driver: only `add_single_measurement_result` is required
//! - Giving a sensor a power pin and datasheet timing
//! - Registering variables and reading formatted results
//! - Reading the cycle report and status byte
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_basic_cycle
//! ```

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use modsense_core::{
    config::SensorConfig,
    constants::SENSOR_FAILURE_VALUE,
    sensor::{Controller, Sensor},
    time::MonotonicClock,
    traits::{SensorDriver, TimeSource},
    variable::Variable,
    SensorError,
};

/// Load switch feeding the sensor's supply rail
struct SwitchedRail {
    on: bool,
}

impl ErrorType for SwitchedRail {
    type Error = Infallible;
}

impl OutputPin for SwitchedRail {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.on = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.on = true;
        Ok(())
    }
}

impl StatefulOutputPin for SwitchedRail {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.on)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.on)
    }
}

/// Simulated temperature/humidity probe
///
/// Every fifth humidity read times out and reports the sentinel.
struct HygroProbe {
    reads: u32,
}

impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for HygroProbe {
    fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        self.reads += 1;
        let temperature = 21.0 + (self.reads % 3) as f32 * 0.1;
        let humidity = if self.reads % 5 == 0 {
            SENSOR_FAILURE_VALUE
        } else {
            48.0 + (self.reads % 4) as f32 * 0.5
        };

        let temp_ok = ctl.verify_and_add_measurement_result(0, temperature);
        let humid_ok = ctl.verify_and_add_measurement_result(1, humidity);
        temp_ok && humid_ok
    }
}

fn main() -> Result<(), SensorError> {
    println!("ModSense Basic Cycle Example");
    println!("============================\n");

    let temperature = Variable::new(0, "temperature", "degreeCelsius", 2, "ProbeTemp");
    let humidity = Variable::new(1, "relativeHumidity", "percent", 1, "ProbeRH").with_uuid("12345678-abcd-1234-ef00-1234567890ab");

    // 100 ms warm-up, 50 ms stabilization, 20 ms per reading, 5 readings
    let config = SensorConfig::new("HygroProbe", 2)?
        .with_data_pin(5)
        .with_timing(100, 50, 20)
        .with_measurements_to_average(5);

    let mut sensor = Sensor::with_power_pin(
        HygroProbe { reads: 0 },
        config,
        MonotonicClock::new(),
        SwitchedRail { on: false },
    )?;
    sensor.register_variable(0, &temperature)?;
    sensor.register_variable(1, &humidity)?;
    sensor.setup()?;

    println!("Sensor: {}", sensor.name_and_location());
    println!("Status before first cycle: {}\n", sensor.status());

    for cycle in 1..=3 {
        let report = sensor.update()?;

        println!("Cycle {}:", cycle);
        println!("  samples ok:   {}/{}", report.iterations - report.failed_iterations, report.iterations);
        println!("  status:       {}", report.status);
        println!(
            "  {} = {} {} ({} good samples)",
            temperature.var_code(),
            temperature.formatted_value(),
            temperature.unit(),
            sensor.good_samples(0).unwrap_or(0),
        );
        println!(
            "  {} = {} {} ({} good samples)",
            humidity.var_code(),
            humidity.formatted_value(),
            humidity.unit(),
            sensor.good_samples(1).unwrap_or(0),
        );
        if let Some(failure) = report.last_failure {
            println!("  last failure: {}", failure);
        }
        println!();
    }

    let rail_on = sensor.power_pin().is_some_and(|rail| rail.on);
    println!("Rail switched off between cycles: {}", !rail_on);
    Ok(())
}
