//! Non-Blocking Polling Example
//!
//! This example drives two sensors through their stages from one
//! cooperative loop instead of calling the blocking `update()`. Each tick the
//! scheduler advances every sensor as far as its timing gates allow and
//! moves on when a gate returns `WouldBlock`.
//!
//! ## What You'll Learn
//!
//! - Polling `poll_warm_up`, `poll_stability` and `poll_measurement`
//! - A driver with real wake/sleep commands using the `mark_*` helpers
//! - Interleaving a slow sonde with a fast on-board sensor
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_nonblocking_poll
//! ```

use embedded_hal::digital::StatefulOutputPin;
use modsense_core::{
    config::SensorConfig,
    sensor::{Controller, Sensor},
    time::MockTimeSource,
    traits::{SensorDriver, TimeSource},
    variable::Variable,
    NoPowerPin, SensorError,
};

/// Stages of one hand-driven cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    WarmingUp,
    Stabilizing,
    Measuring { remaining: u8 },
    Done,
}

/// Optical sonde that must be told to start and stop measuring
struct Sonde {
    running: bool,
    reading: f32,
}

impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for Sonde {
    fn wake(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        if !ctl.status().is_powered() {
            ctl.mark_activation_failed();
            return false;
        }
        // "start measurement" command accepted
        self.running = true;
        ctl.mark_activated();
        true
    }

    fn sleep(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        self.running = false;
        ctl.mark_asleep();
        true
    }

    fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        if !self.running {
            return false;
        }
        self.reading += 0.4;
        ctl.verify_and_add_measurement_result(0, self.reading)
    }
}

/// Processor voltage monitor, always on and instant
struct SupplyMonitor;

impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for SupplyMonitor {
    fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        ctl.verify_and_add_measurement_result(0, 4.12f32)
    }
}

/// Advance one sensor as far as its gates allow
fn step<D, C>(sensor: &mut Sensor<'_, D, C, NoPowerPin>, stage: Stage) -> Stage
where
    D: SensorDriver<C, NoPowerPin>,
    C: TimeSource,
{
    match stage {
        Stage::WarmingUp => {
            if sensor.poll_warm_up().is_err() {
                return stage;
            }
            if !sensor.wake() {
                return Stage::Done;
            }
            Stage::Stabilizing
        }
        Stage::Stabilizing => {
            if sensor.poll_stability().is_err() {
                return stage;
            }
            sensor.clear_values();
            sensor.start_single_measurement();
            Stage::Measuring {
                remaining: sensor.measurements_to_average(),
            }
        }
        Stage::Measuring { remaining } => {
            if sensor.poll_measurement().is_err() {
                return stage;
            }
            sensor.add_single_measurement_result();
            sensor.controller_mut().finish_measurement();

            if remaining > 1 {
                sensor.start_single_measurement();
                return Stage::Measuring { remaining: remaining - 1 };
            }
            sensor.average_measurements();
            sensor.sleep();
            sensor.notify_variables();
            Stage::Done
        }
        Stage::Done => Stage::Done,
    }
}

fn main() -> Result<(), SensorError> {
    println!("ModSense Non-Blocking Polling Example");
    println!("=====================================\n");

    let clock = MockTimeSource::new(1);
    let turbidity = Variable::new(0, "turbidity", "nephelometricTurbidityUnit", 2, "SondeTurb");
    let battery = Variable::new(0, "batteryVoltage", "volt", 3, "Battery");

    let mut sonde = Sensor::new(
        Sonde { running: false, reading: 2.0 },
        SensorConfig::new("OpticalSonde", 1)?
            .with_data_pin(3)
            .with_timing(0, 1_500, 400)
            .with_measurements_to_average(3),
        &clock,
    )?;
    let mut monitor = Sensor::new(SupplyMonitor, SensorConfig::new("SupplyMonitor", 1)?, &clock)?;

    sonde.register_variable(0, &turbidity)?;
    monitor.register_variable(0, &battery)?;

    // Neither has a power pin; this only records the power-on time
    sonde.power_up()?;
    monitor.power_up()?;

    let mut sonde_stage = Stage::WarmingUp;
    let mut monitor_stage = Stage::WarmingUp;
    let mut ticks = 0u32;

    // 100 ms scheduler tick
    while sonde_stage != Stage::Done || monitor_stage != Stage::Done {
        let before = (sonde_stage, monitor_stage);
        sonde_stage = step(&mut sonde, sonde_stage);
        monitor_stage = step(&mut monitor, monitor_stage);

        if (sonde_stage, monitor_stage) != before {
            println!(
                "t={:>5} ms  {:<12} {:?}\n            {:<12} {:?}",
                clock.now(),
                sonde.name(),
                sonde_stage,
                monitor.name(),
                monitor_stage
            );
        } else {
            clock.advance(100);
            ticks += 1;
        }
    }

    println!("\nFinished after {} idle ticks", ticks);
    println!("{} = {} {}", turbidity.var_code(), turbidity.formatted_value(), turbidity.unit());
    println!("{} = {} {}", battery.var_code(), battery.formatted_value(), battery.unit());
    println!("Sonde status after sleep: {}", sonde.status());
    Ok(())
}
