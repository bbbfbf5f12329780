//! Core Traits and Abstractions for ModSense
//!
//! The two extension points of the lifecycle controller:
//!
//! - [`time`] - Clock abstraction with a replaceable idle primitive
//! - [`driver`] - Device hooks the orchestrator calls during a cycle
//!
//! Both are used through static dispatch: a `Sensor` is generic over its
//! driver and clock, so unused hooks compile away.

pub mod driver;
pub mod time;

pub use driver::SensorDriver;
pub use time::TimeSource;
