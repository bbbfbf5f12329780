//! Optional logging
//!
//! Lifecycle transitions go to `log` on hosted builds and to `defmt` on
//! embedded builds. With neither feature the macros compile to nothing.
//! Only `{}` placeholders with primitive or `&str` arguments are used so the
//! same call site works for both backends.

#[cfg(feature = "log")]
macro_rules! sensor_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! sensor_trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! sensor_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! sensor_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! sensor_debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! sensor_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! sensor_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! sensor_warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! sensor_warn {
    ($($arg:tt)*) => {};
}
