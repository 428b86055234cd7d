//! STTS22H temperature sensor driver
//!
//! Session-oriented driver: many sessions share one [`Stts22hDriver`] and each
//! binds at most one (bus, address) pair. A pair is bound by at most one
//! session across the whole driver.
//!
//! # Acquisition modes
//!
//! | Mode     | CTRL bits                    | Read path                        |
//! |----------|------------------------------|----------------------------------|
//! | One-shot | run bits clear               | trigger, poll STATUS, read data  |
//! | Free-run | FREERUN                      | read data                        |
//! | Low-rate | LOW_ODR_START + ODR field    | read data                        |
//!
//! Every mode change passes through the idle baseline first.
//!
//! # Example
//!
//! ```
//! use i2c_sensors::devices::stts22h::{BindRequest, Stts22hDriver};
//! use i2c_sensors::platform::host::BusTable;
//! use i2c_sensors::platform::mock::{MockDelay, MockI2c};
//!
//! let bus = MockI2c::new();
//! bus.set_register(0x3C, 0x01, 0xA0); // WHOAMI
//! bus.set_register(0x3C, 0x06, 0xE8); // TEMP_L
//! bus.set_register(0x3C, 0x07, 0x03); // TEMP_H
//!
//! let driver = Stts22hDriver::new(BusTable::new().with_bus(2, bus), MockDelay::new());
//! let session = driver.open();
//! session.bind(BindRequest::new(0x3C, 2)?)?;
//!
//! let sample = session.read_sample()?;
//! assert_eq!(sample.centi_celsius(), 1000);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod control;
mod driver;

pub use control::ControlResponse;
pub use driver::{Stts22hConfig, Stts22hDriver, Stts22hSession};
pub use i2c_sensors_core::stts22h::{
    registers, AcquisitionMode, ControlRequest, ModeSelector, OutputDataRate, CMD_LIST,
    CMD_SET_MODE, CMD_SET_RATE, MAX_ATTEMPTS,
};
pub use i2c_sensors_core::{BindRequest, TemperatureSample};
