//! Time management for edge devices
//!
//! Provides the clocks the lifecycle controller can run against:
//! - Monotonic host clock (when `std` is available)
//! - Mock clock (deterministic tests and host-side simulation)
//!
//! Bare-metal targets implement [`TimeSource`] over their tick counter.

use core::cell::Cell;

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since device boot
///
/// Zero is reserved for "not yet happened" in the controller's stage markers.
pub type Timestamp = u64;

/// Elapsed milliseconds between two timestamps, never negative
pub fn elapsed_ms(since: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(since)
}

/// Monotonic time source for hosted builds (requires std)
///
/// Counts milliseconds since construction, starting at 1 so the first
/// reading is never mistaken for an unset stage marker.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp + 1
    }

    fn idle(&self) {
        std::thread::yield_now();
    }
}

/// Controllable time source for testing
///
/// Time only moves when told to: through [`set`](Self::set),
/// [`advance`](Self::advance), or by `idle_step` milliseconds on every
/// [`TimeSource::idle`] call. A non-zero step lets the blocking waits run to
/// completion in simulated time.
#[derive(Debug, Clone)]
pub struct MockTimeSource {
    timestamp: Cell<Timestamp>,
    idle_step: Timestamp,
}

impl MockTimeSource {
    /// Frozen clock at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
            idle_step: 0,
        }
    }

    /// Clock that advances `step_ms` on each idle call
    pub fn with_idle_step(mut self, step_ms: Timestamp) -> Self {
        self.idle_step = step_ms;
        self
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get() + ms);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }

    fn idle(&self) {
        self.advance(self.idle_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_advances() {
        let time = MockTimeSource::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.set(10);
        assert_eq!(time.now(), 10);
    }

    #[test]
    fn idle_step_moves_simulated_time() {
        let time = MockTimeSource::new(1).with_idle_step(5);
        time.idle();
        time.idle();
        assert_eq!(time.now(), 11);

        // Frozen clock stays put
        let frozen = MockTimeSource::new(1);
        frozen.idle();
        assert_eq!(frozen.now(), 1);
    }

    #[test]
    fn elapsed_saturates() {
        assert_eq!(elapsed_ms(100, 250), 150);
        assert_eq!(elapsed_ms(250, 100), 0);
    }

    #[test]
    fn clock_by_reference() {
        fn read<C: TimeSource>(clock: C) -> Timestamp {
            clock.now()
        }

        let time = MockTimeSource::new(42);
        assert_eq!(read(&time), 42);
        time.advance(1);
        assert_eq!(read(&time), 43);
    }

    #[cfg(feature = "std")]
    #[test]
    fn monotonic_clock_never_reads_zero() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        assert!(first >= 1);
        assert!(clock.now() >= first);
        assert!(!clock.is_wall_clock());
    }
}
