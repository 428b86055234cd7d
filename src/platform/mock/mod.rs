//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the platform traits that can
//! be used for unit and integration testing without hardware. The mocks are
//! always compiled so downstream crates can test against them too.
//!
//! # Example
//!
//! ```
//! use embedded_hal::i2c::I2c;
//! use i2c_sensors::platform::mock::MockI2c;
//!
//! let bus = MockI2c::new();
//! bus.set_register(0x3C, 0x01, 0xA0);
//!
//! let mut handle = bus.clone();
//! let mut id = [0u8; 1];
//! handle.write_read(0x3C, &[0x01], &mut id).unwrap();
//! assert_eq!(id, [0xA0]);
//! ```

mod delay;
mod i2c;
mod signal;

pub use delay::MockDelay;
pub use i2c::{I2cTransaction, MockI2c, MockI2cError};
pub use signal::MockSignalLine;
