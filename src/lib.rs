//! i2c_sensors - Linux-class I2C sensor driver cores
//!
//! This library provides the platform abstraction, the deferred-work runtime
//! and device drivers for the STTS22H, BMA400, ISL29125 and DHT20 sensors.
//! Register maps and decoding live in the `no_std` [`sensors`] crate.

// Platform abstraction layer (buses, delays, signal sources)
pub mod platform;

// Runtime core (logging, work queue, interrupt dispatch)
pub mod core;

// Device drivers using platform abstraction
pub mod devices;

pub mod error;

pub use error::{ConfigError, DeviceError, Result};
pub use i2c_sensors_core as sensors;
