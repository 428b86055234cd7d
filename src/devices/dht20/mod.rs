//! DHT20 humidity and temperature sensor driver
//!
//! The DHT20 has no data-ready line. Measurements are taken from a periodic
//! signal that goes through the same work queue as the interrupt-driven
//! sensors.

mod driver;

pub use driver::{Dht20, Dht20Config, Dht20Device};
pub use i2c_sensors_core::dht20::{Measurement, DEFAULT_ADDRESS};
