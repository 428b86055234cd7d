//! Host (std) platform implementation
//!
//! Thread-based implementations of the platform traits for Linux-class hosts:
//! a shared bus wrapper, a bus table resolver, a sleeping delay and a timer
//! thread signal source.
//!
//! # Example
//!
//! ```no_run
//! use i2c_sensors::platform::host::{BusTable, SharedI2c};
//! use i2c_sensors::platform::mock::MockI2c;
//!
//! let mut buses = BusTable::new();
//! buses.insert(2, SharedI2c::new(MockI2c::new()));
//! ```

mod delay;
mod shared;
mod timer;

pub use delay::StdDelay;
pub use shared::{BusTable, SharedI2c};
pub use timer::PeriodicSignal;
