//! Power Control Pins
//!
//! Sensors switched by a GPIO take any embedded-hal 1.0
//! [`StatefulOutputPin`]; the controller drives it high to power the device
//! and reads it back to see whether a shared rail is already on.
//!
//! Always-powered devices (on-board RTCs, the processor itself) use
//! [`NoPowerPin`], which is never driven. With it the warm-up gate is always
//! open.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

/// Placeholder pin for sensors without power control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPowerPin;

impl ErrorType for NoPowerPin {
    type Error = Infallible;
}

impl OutputPin for NoPowerPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl StatefulOutputPin for NoPowerPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}
