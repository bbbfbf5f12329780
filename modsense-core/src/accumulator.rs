//! Fixed-Capacity Result Accumulator
//!
//! ## Overview
//!
//! Each measurement cycle takes N samples and reports their mean for every
//! channel the sensor declares. The accumulator keeps one running sum and one
//! good-sample counter per channel, in fixed arrays sized at compile time.
//!
//! ## Sentinel Semantics
//!
//! Drivers report a failed read as [`SENSOR_FAILURE_VALUE`] (-9999). Such a
//! value is never added, so one bad sample among N cannot skew the mean as
//! long as one good sample exists. A channel with no good samples keeps the
//! sentinel after averaging, which downstream consumers read as "no valid
//! reading". Non-finite input (NaN, infinity) is rejected the same way.
//!
//! ```text
//! cycle:   clear ──► add × N ──► average
//! ch0:     -9999     10, -9999, 12      11.0   (2 good)
//! ch1:     -9999     -9999 × 3          -9999  (0 good)
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use modsense_core::accumulator::ResultAccumulator;
//! use modsense_core::constants::SENSOR_FAILURE_VALUE;
//!
//! let mut acc: ResultAccumulator<8> = ResultAccumulator::new(2);
//! acc.clear_values();
//!
//! acc.verify_and_add(0, 10.0f32);
//! acc.verify_and_add(0, SENSOR_FAILURE_VALUE);
//! acc.verify_and_add(0, 12i16);
//! acc.average_measurements();
//!
//! assert_eq!(acc.value(0), Some(11.0));
//! assert_eq!(acc.good_samples(0), Some(2));
//! assert_eq!(acc.value(1), Some(SENSOR_FAILURE_VALUE));
//! ```

use crate::constants::SENSOR_FAILURE_VALUE;

/// Per-channel sums and good-sample counts
///
/// ## Type Parameter
///
/// - `N`: Storage capacity. Only the first `declared` channels are used.
///
/// ## Internal Invariants
///
/// - `declared <= N`
/// - A channel with `good[i] == 0` holds the sentinel
#[derive(Debug, Clone)]
pub struct ResultAccumulator<const N: usize> {
    /// Running sum during sampling, mean after averaging
    values: [f32; N],

    /// Accepted samples this cycle
    good: [u8; N],

    /// Number of channels in use
    declared: usize,
}

impl<const N: usize> ResultAccumulator<N> {
    /// Creates an accumulator with every channel at the sentinel
    ///
    /// `declared` is clamped to `N`.
    pub const fn new(declared: usize) -> Self {
        Self {
            values: [SENSOR_FAILURE_VALUE; N],
            good: [0; N],
            declared: if declared > N { N } else { declared },
        }
    }

    /// Number of channels in use
    pub const fn declared(&self) -> usize {
        self.declared
    }

    /// Reset every declared channel to the sentinel with no good samples
    pub fn clear_values(&mut self) {
        for (value, good) in self.values.iter_mut().zip(self.good.iter_mut()).take(self.declared) {
            *value = SENSOR_FAILURE_VALUE;
            *good = 0;
        }
    }

    /// Add a sample if it is a valid reading for a declared channel
    ///
    /// Out-of-range slots, the sentinel, and non-finite values are ignored,
    /// as is any sample past the 255th for a channel in one cycle.
    /// Returns whether the sample was accepted.
    pub fn verify_and_add(&mut self, slot: usize, value: impl Into<f32>) -> bool {
        let value = value.into();

        if slot >= self.declared || value == SENSOR_FAILURE_VALUE || !value.is_finite() {
            return false;
        }

        let (Some(stored), Some(good)) = (self.values.get_mut(slot), self.good.get_mut(slot)) else {
            return false;
        };

        if *good == u8::MAX {
            return false;
        }
        if *good == 0 {
            *stored = value;
        } else {
            *stored += value;
        }
        *good += 1;
        true
    }

    /// Turn each channel's sum into its mean
    ///
    /// Channels without good samples stay at the sentinel.
    pub fn average_measurements(&mut self) {
        for (value, &good) in self.values.iter_mut().zip(self.good.iter()).take(self.declared) {
            if good > 0 {
                *value /= f32::from(good);
            }
        }
    }

    /// Current value of a declared channel
    pub fn value(&self, slot: usize) -> Option<f32> {
        if slot >= self.declared {
            return None;
        }
        self.values.get(slot).copied()
    }

    /// Good samples accepted this cycle for a declared channel
    pub fn good_samples(&self, slot: usize) -> Option<u8> {
        if slot >= self.declared {
            return None;
        }
        self.good.get(slot).copied()
    }

    /// Values of all declared channels
    pub fn values(&self) -> &[f32] {
        self.values.get(..self.declared).unwrap_or(&[])
    }
}

impl<const N: usize> Default for ResultAccumulator<N> {
    fn default() -> Self {
        Self::new(N)
    }
}
