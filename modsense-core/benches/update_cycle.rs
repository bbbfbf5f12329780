//! Benchmarks for the sampling hot path.
//!
//! Run with: cargo bench -p modsense-core
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p modsense-core -- --save-baseline main
//! 2. After changes: cargo bench -p modsense-core -- --baseline main

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use embedded_hal::digital::StatefulOutputPin;
use modsense_core::{
    accumulator::ResultAccumulator,
    config::SensorConfig,
    constants::{MAX_NUMBER_VARS, SENSOR_FAILURE_VALUE},
    sensor::{Controller, Sensor},
    time::MockTimeSource,
    traits::{SensorDriver, TimeSource},
    variable::Variable,
};

/// Reports a slowly varying reading on every channel
struct RampDriver {
    step: f32,
}

impl<C: TimeSource, P: StatefulOutputPin> SensorDriver<C, P> for RampDriver {
    fn add_single_measurement_result(&mut self, ctl: &mut Controller<'_, C, P>) -> bool {
        self.step += 0.25;
        let mut ok = true;
        for slot in 0..ctl.num_variables() {
            ok &= ctl.verify_and_add_measurement_result(slot, self.step + f32::from(slot));
        }
        ok
    }
}

fn bench_accumulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulator");

    for samples in [1usize, 10, 50] {
        group.throughput(Throughput::Elements((samples * MAX_NUMBER_VARS) as u64));
        group.bench_with_input(BenchmarkId::new("add_and_average", samples), &samples, |b, &n| {
            let mut acc: ResultAccumulator<MAX_NUMBER_VARS> = ResultAccumulator::new(MAX_NUMBER_VARS);
            b.iter(|| {
                acc.clear_values();
                for i in 0..n {
                    for slot in 0..MAX_NUMBER_VARS {
                        // Every tenth sample is a dropout
                        let value = if i % 10 == 9 { SENSOR_FAILURE_VALUE } else { i as f32 };
                        acc.verify_and_add(slot, black_box(value));
                    }
                }
                acc.average_measurements();
                black_box(acc.values());
            });
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");

    for average in [1u8, 10, 50] {
        let clock = MockTimeSource::new(1).with_idle_step(1);
        let variables: [Variable; MAX_NUMBER_VARS] =
            core::array::from_fn(|slot| Variable::new(slot as u8, "ramp", "dimensionless", 2, "Ramp"));

        let config = SensorConfig::new("Ramp", MAX_NUMBER_VARS as u8)
            .expect("name fits")
            .with_timing(0, 5, 2)
            .with_measurements_to_average(average);
        let mut sensor = Sensor::new(RampDriver { step: 0.0 }, config, &clock).expect("valid config");
        for (slot, variable) in variables.iter().enumerate() {
            sensor.register_variable(slot as u8, variable).expect("declared slot");
        }

        group.throughput(Throughput::Elements(u64::from(average)));
        group.bench_function(BenchmarkId::new("full_cycle", average), |b| {
            b.iter(|| black_box(sensor.update()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_accumulator, bench_update);
criterion_main!(benches);
