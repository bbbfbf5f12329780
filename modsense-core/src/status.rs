//! Sensor Status Bitfield
//!
//! One byte records which lifecycle milestones the sensor has reached in the
//! current cycle. External telemetry reads it through `Sensor::status()`.
//!
//! ```text
//! bit 7  6  5  4  3  2  1  0
//!     │  │  │  │  │  │  │  └── setup complete
//!     │  │  │  │  │  │  └───── power attempted
//!     │  │  │  │  │  └──────── power succeeded
//!     │  │  │  │  └─────────── wake attempted
//!     │  │  │  └────────────── awake
//!     │  │  └───────────────── measurement requested
//!     │  └──────────────────── measurement succeeded
//!     └─────────────────────── error
//! ```
//!
//! Within one cycle bits only get set. Power-down and sleep retract the
//! activation and measurement bits; the setup and error bits survive them.

use core::fmt;

/// Bit flags for lifecycle milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorStatus(u8);

impl SensorStatus {
    pub const SETUP: Self = Self(1 << 0);
    pub const POWER_ATTEMPTED: Self = Self(1 << 1);
    pub const POWER_SUCCEEDED: Self = Self(1 << 2);
    pub const WAKE_ATTEMPTED: Self = Self(1 << 3);
    pub const AWAKE: Self = Self(1 << 4);
    pub const MEASUREMENT_REQUESTED: Self = Self(1 << 5);
    pub const MEASUREMENT_SUCCEEDED: Self = Self(1 << 6);
    pub const ERROR: Self = Self(1 << 7);

    /// Bits cleared by power-down: everything except setup and error
    pub const POWER_CYCLE_MASK: Self = Self(0b0111_1110);

    /// Bits cleared by sleep: activation and measurement
    pub const ACTIVATION_MASK: Self = Self(0b0111_1000);

    /// Bits cleared once a measurement result has been collected
    pub const MEASUREMENT_MASK: Self = Self(0b0110_0000);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw byte for diagnostics
    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub fn set(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn clear(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Setup has completed at least once
    pub const fn is_setup(&self) -> bool {
        self.contains(Self::SETUP)
    }

    pub const fn is_powered(&self) -> bool {
        self.contains(Self::POWER_SUCCEEDED)
    }

    pub const fn is_awake(&self) -> bool {
        self.contains(Self::AWAKE)
    }

    /// A measurement was dispatched and has not been collected yet
    pub const fn is_measurement_pending(&self) -> bool {
        self.contains(Self::MEASUREMENT_SUCCEEDED)
    }

    pub const fn has_error(&self) -> bool {
        self.contains(Self::ERROR)
    }
}

impl From<SensorStatus> for u8 {
    fn from(status: SensorStatus) -> Self {
        status.0
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0b{:08b}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u8:b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_positions_match_layout() {
        assert_eq!(SensorStatus::SETUP.bits(), 0b0000_0001);
        assert_eq!(SensorStatus::AWAKE.bits(), 0b0001_0000);
        assert_eq!(SensorStatus::ERROR.bits(), 0b1000_0000);
    }

    #[test]
    fn set_and_clear() {
        let mut status = SensorStatus::empty();
        status.set(SensorStatus::POWER_ATTEMPTED.union(SensorStatus::POWER_SUCCEEDED));
        assert!(status.is_powered());
        assert_eq!(status.bits(), 0b0000_0110);

        status.clear(SensorStatus::POWER_SUCCEEDED);
        assert!(!status.is_powered());
        assert!(status.contains(SensorStatus::POWER_ATTEMPTED));
    }

    #[test]
    fn power_cycle_mask_keeps_setup_and_error() {
        let mut status = SensorStatus::from_bits(0xFF);
        status.clear(SensorStatus::POWER_CYCLE_MASK);
        assert_eq!(status.bits(), 0b1000_0001);
        assert!(status.is_setup());
        assert!(status.has_error());
    }

    #[test]
    fn activation_mask_keeps_power() {
        let mut status = SensorStatus::from_bits(0b0111_1111);
        status.clear(SensorStatus::ACTIVATION_MASK);
        assert_eq!(status.bits(), 0b0000_0111);
    }

    #[test]
    fn display_as_binary() {
        let status = SensorStatus::from_bits(0b1000_0101);
        assert_eq!(std::format!("{}", status), "0b10000101");
    }
}
