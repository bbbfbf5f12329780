//! Time Source Abstraction for Embedded Systems
//!
//! This module provides the `TimeSource` trait used by every timing gate of
//! the lifecycle controller.
//!
//! ## Design Goals
//!
//! - **Platform Independence**: Works on bare metal, RTOS, and Linux
//! - **Testability**: Easy to mock for deterministic testing
//! - **Replaceable Waiting**: Blocking waits call [`TimeSource::idle`] between
//!   polls, so a cooperative target can yield instead of spinning
//!
//! ## Common Implementations
//!
//! - `MonotonicClock`: `Instant`-based clock for hosted builds
//! - `MockTimeSource`: Controllable time for testing and simulation

use crate::time::Timestamp;

/// Source of time for the controller
///
/// ## Implementation Requirements
///
/// - `now()` must be monotonic; the gates compute `now - start` with
///   saturating arithmetic, so a clock going backwards only delays them
/// - `now()` must not return 0 once the device is running. A zero timestamp
///   means "stage not started" throughout the controller
///
/// ## Example Implementation
///
/// ```rust
/// use modsense_core::traits::TimeSource;
/// use modsense_core::time::Timestamp;
///
/// struct SysTick {
///     // ... tick counter peripheral
/// }
///
/// impl TimeSource for SysTick {
///     fn now(&self) -> Timestamp {
///         // Read the millisecond tick counter
///         1
///     }
///
///     fn idle(&self) {
///         // Sleep until the next interrupt instead of spinning
///     }
/// }
/// ```
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool {
        false
    }

    /// Get precision in milliseconds
    fn precision_ms(&self) -> u32 {
        1
    }

    /// Called between polls of a blocking wait
    ///
    /// The default spins. Targets with a scheduler override this with a
    /// yield or a low-power wait; the deadline arithmetic is unaffected.
    fn idle(&self) {
        core::hint::spin_loop();
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }

    fn precision_ms(&self) -> u32 {
        (**self).precision_ms()
    }

    fn idle(&self) {
        (**self).idle()
    }
}
