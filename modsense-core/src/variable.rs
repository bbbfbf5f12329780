//! Result Variables and the Slot Registry
//!
//! A [`Variable`] is one reported quantity of a sensor (temperature,
//! turbidity, battery voltage...). It is owned by the application, not by the
//! sensor. The sensor keeps a shared borrow of each registered variable in a
//! fixed slot table and pushes the final value of every cycle into it.
//!
//! ## Ownership
//!
//! ```text
//! application ──owns──► Variable ◄──&'a── Sensor.registry[slot]
//!                          │
//!                          └── parent: SensorId token + slot
//! ```
//!
//! Neither side owns the other. The borrow checker guarantees a variable
//! outlives the sensor that holds it; the variable only remembers which
//! sensor registered it, as a copyable [`SensorId`].
//!
//! The value lives in a `Cell`, so a `Variable` is written through a shared
//! reference by exactly one writer (its sensor) and is not `Sync`.

use core::cell::Cell;
use core::fmt::Write;
use core::sync::atomic::{AtomicU16, Ordering};

use heapless::String;

use crate::constants::{FORMATTED_VALUE_LEN, MAX_NUMBER_VARS, SENSOR_FAILURE_VALUE};
use crate::errors::{SensorError, SensorResult};

static NEXT_SENSOR_ID: AtomicU16 = AtomicU16::new(1);

/// Registration token identifying one sensor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorId(u16);

impl SensorId {
    /// Allocate a fresh token
    pub(crate) fn next() -> Self {
        Self(NEXT_SENSOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// One reported quantity of a sensor
#[derive(Debug)]
pub struct Variable {
    slot: u8,
    name: &'static str,
    unit: &'static str,
    resolution: u8,
    var_code: &'static str,
    uuid: Option<&'static str>,
    value: Cell<f32>,
    parent: Cell<Option<SensorId>>,
}

impl Variable {
    /// Create an unregistered variable for `slot`
    ///
    /// `resolution` is the number of decimal places reported.
    pub const fn new(
        slot: u8,
        name: &'static str,
        unit: &'static str,
        resolution: u8,
        var_code: &'static str,
    ) -> Self {
        Self {
            slot,
            name,
            unit,
            resolution,
            var_code,
            uuid: None,
            value: Cell::new(SENSOR_FAILURE_VALUE),
            parent: Cell::new(None),
        }
    }

    /// Attach a UUID assigned by a data portal
    pub const fn with_uuid(mut self, uuid: &'static str) -> Self {
        self.uuid = Some(uuid);
        self
    }

    pub const fn slot(&self) -> u8 {
        self.slot
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn unit(&self) -> &'static str {
        self.unit
    }

    pub const fn resolution(&self) -> u8 {
        self.resolution
    }

    pub const fn var_code(&self) -> &'static str {
        self.var_code
    }

    pub const fn uuid(&self) -> Option<&'static str> {
        self.uuid
    }

    /// Sensor this variable is registered with, if any
    pub fn parent(&self) -> Option<SensorId> {
        self.parent.get()
    }

    /// Last value pushed by the parent sensor
    ///
    /// The sentinel until the first completed cycle.
    pub fn value(&self) -> f32 {
        self.value.get()
    }

    /// Whether the last value is a real reading
    pub fn has_valid_value(&self) -> bool {
        self.value.get() != SENSOR_FAILURE_VALUE
    }

    /// Value rounded to the variable's resolution
    ///
    /// The sentinel is returned unchanged.
    pub fn rounded_value(&self) -> f32 {
        let value = self.value.get();
        if value == SENSOR_FAILURE_VALUE {
            return value;
        }
        let scale = libm::powf(10.0, f32::from(self.resolution));
        libm::roundf(value * scale) / scale
    }

    /// Value printed with `resolution` decimal places
    ///
    /// The sentinel prints as `-9999` regardless of resolution.
    pub fn formatted_value(&self) -> String<FORMATTED_VALUE_LEN> {
        let mut out = String::new();
        let value = self.value.get();
        // A 24-byte buffer holds any f32 at the resolutions in use; on
        // overflow the string is truncated rather than reported.
        let _ = if value == SENSOR_FAILURE_VALUE {
            write!(out, "{}", SENSOR_FAILURE_VALUE as i32)
        } else {
            write!(out, "{:.*}", usize::from(self.resolution), value)
        };
        out
    }

    pub(crate) fn attach(&self, parent: SensorId) {
        self.parent.set(Some(parent));
    }

    pub(crate) fn detach(&self) {
        self.parent.set(None);
    }

    pub(crate) fn push(&self, value: f32) {
        self.value.set(value);
    }
}

/// Fixed slot table of borrowed variables
///
/// Each slot holds at most one variable; registering again overwrites.
#[derive(Debug)]
pub struct VariableRegistry<'a> {
    slots: [Option<&'a Variable>; MAX_NUMBER_VARS],
    declared: u8,
}

impl<'a> VariableRegistry<'a> {
    pub const fn new(declared: u8) -> Self {
        Self {
            slots: [None; MAX_NUMBER_VARS],
            declared,
        }
    }

    /// Bind `variable` to `slot` on behalf of sensor `owner`
    ///
    /// The slot must be the one the variable was built for, and the variable
    /// must not be held by another sensor. Returns the variable previously
    /// held by the slot.
    pub fn register(
        &mut self,
        owner: SensorId,
        slot: u8,
        variable: &'a Variable,
    ) -> SensorResult<Option<&'a Variable>> {
        let entry = self.entry_mut(slot)?;
        if variable.slot() != slot {
            return Err(SensorError::SlotMismatch {
                slot,
                expected: variable.slot(),
            });
        }
        if variable.parent().is_some_and(|parent| parent != owner) {
            return Err(SensorError::AlreadyRegistered { slot });
        }

        let previous = entry.replace(variable);
        if let Some(old) = previous {
            if !core::ptr::eq(old, variable) {
                old.detach();
            }
        }
        variable.attach(owner);
        Ok(previous)
    }

    /// Remove the variable bound to `slot`
    pub fn unregister(&mut self, slot: u8) -> SensorResult<Option<&'a Variable>> {
        let previous = self.entry_mut(slot)?.take();
        if let Some(old) = previous {
            old.detach();
        }
        Ok(previous)
    }

    pub fn get(&self, slot: u8) -> Option<&'a Variable> {
        self.slots.get(usize::from(slot)).copied().flatten()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push each declared channel's value into its registered variable
    ///
    /// `value_of` maps a slot to the channel's final value. Returns the number
    /// of variables notified.
    pub fn notify(&self, mut value_of: impl FnMut(usize) -> Option<f32>) -> usize {
        let mut notified = 0;
        for (slot, entry) in self.slots.iter().enumerate().take(usize::from(self.declared)) {
            if let (Some(variable), Some(value)) = (entry, value_of(slot)) {
                variable.push(value);
                notified += 1;
            }
        }
        notified
    }

    fn entry_mut(&mut self, slot: u8) -> SensorResult<&mut Option<&'a Variable>> {
        let declared = self.declared;
        if slot >= declared {
            return Err(SensorError::SlotOutOfRange { slot, declared });
        }
        self.slots
            .get_mut(usize::from(slot))
            .ok_or(SensorError::SlotOutOfRange { slot, declared })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature() -> Variable {
        Variable::new(0, "temperature", "degreeCelsius", 2, "BoardTemp")
    }

    #[test]
    fn new_variable_reads_sentinel() {
        let var = temperature();
        assert_eq!(var.value(), SENSOR_FAILURE_VALUE);
        assert!(!var.has_valid_value());
        assert!(var.parent().is_none());
        assert_eq!(var.formatted_value().as_str(), "-9999");
    }

    #[test]
    fn formatting_follows_resolution() {
        let var = temperature();
        var.push(21.456);
        assert_eq!(var.formatted_value().as_str(), "21.46");
        assert!((var.rounded_value() - 21.46).abs() < 1e-4);

        let count = Variable::new(2, "sequenceNumber", "Dimensionless", 0, "SampNum");
        count.push(41.7);
        assert_eq!(count.formatted_value().as_str(), "42");
    }

    #[test]
    fn register_and_notify() {
        let a = temperature();
        let b = Variable::new(1, "relativeHumidity", "percent", 3, "RH");
        let owner = SensorId::next();

        let mut registry = VariableRegistry::new(2);
        registry.register(owner, 0, &a).unwrap();
        registry.register(owner, 1, &b).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(a.parent(), Some(owner));

        let values = [20.5, SENSOR_FAILURE_VALUE];
        let notified = registry.notify(|slot| values.get(slot).copied());
        assert_eq!(notified, 2);
        assert_eq!(a.value(), 20.5);
        assert_eq!(b.value(), SENSOR_FAILURE_VALUE);
    }

    #[test]
    fn reregistration_overwrites_slot() {
        let first = temperature();
        let second = temperature();
        let owner = SensorId::next();

        let mut registry = VariableRegistry::new(1);
        registry.register(owner, 0, &first).unwrap();
        let previous = registry.register(owner, 0, &second).unwrap();

        assert!(previous.is_some_and(|p| core::ptr::eq(p, &first)));
        assert!(first.parent().is_none());
        assert_eq!(second.parent(), Some(owner));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn slot_beyond_declared_is_rejected() {
        let var = temperature();
        let mut registry = VariableRegistry::new(2);
        let err = registry.register(SensorId::next(), 2, &var).unwrap_err();
        assert_eq!(err, SensorError::SlotOutOfRange { slot: 2, declared: 2 });
        assert!(var.parent().is_none());
    }

    #[test]
    fn slot_must_match_variable() {
        let humidity = Variable::new(1, "relativeHumidity", "percent", 3, "RH");
        let mut registry = VariableRegistry::new(2);

        let err = registry.register(SensorId::next(), 0, &humidity).unwrap_err();
        assert_eq!(err, SensorError::SlotMismatch { slot: 0, expected: 1 });
        assert!(registry.is_empty());
        assert!(humidity.parent().is_none());
    }

    #[test]
    fn variable_has_single_owner() {
        let var = temperature();
        let (first, second) = (SensorId::next(), SensorId::next());

        let mut a = VariableRegistry::new(1);
        let mut b = VariableRegistry::new(1);
        a.register(first, 0, &var).unwrap();
        let err = b.register(second, 0, &var).unwrap_err();
        assert_eq!(err, SensorError::AlreadyRegistered { slot: 0 });
        assert!(b.is_empty());
        assert_eq!(var.parent(), Some(first));

        // Same owner again is a no-op
        a.register(first, 0, &var).unwrap();
        assert_eq!(var.parent(), Some(first));

        a.unregister(0).unwrap();
        b.register(second, 0, &var).unwrap();
        assert_eq!(var.parent(), Some(second));
    }

    #[test]
    fn unregister_detaches() {
        let var = temperature();
        let mut registry = VariableRegistry::new(1);
        registry.register(SensorId::next(), 0, &var).unwrap();
        registry.unregister(0).unwrap();
        assert!(registry.is_empty());
        assert!(var.parent().is_none());
    }

    #[test]
    fn sensor_ids_are_unique() {
        assert_ne!(SensorId::next(), SensorId::next());
    }
}
