//! i2c_sensors_core - Pure no_std sensor logic
//!
//! This crate contains the hardware-independent half of the sensor drivers:
//! register maps, configuration encodings, selector validation, user-facing
//! payload codecs and numeric sample decoding. Everything here can be tested
//! on host without a bus.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Validate then act**: Every selector and payload is decoded into a typed
//!   value here, before any driver touches hardware
//!
//! # Modules
//!
//! - [`register`]: Register configuration step type shared by all drivers
//! - [`decode`]: Temperature and acceleration sample decoding
//! - [`payload`]: Bind payload and ioctl-style command encoding
//! - [`stts22h`]: STTS22H register map, acquisition modes and control requests
//! - [`bma400`]: BMA400 register map and mode configuration sequences
//! - [`isl29125`]: ISL29125 register map and interrupt configuration
//! - [`dht20`]: DHT20 commands and measurement decoding
//! - [`error`]: Selector and payload errors

#![no_std]

pub mod bma400;
pub mod decode;
pub mod dht20;
pub mod error;
pub mod isl29125;
pub mod payload;
pub mod register;
pub mod stts22h;

pub use decode::{AccelSample, TemperatureSample};
pub use error::{PayloadError, SelectorError};
pub use payload::BindRequest;
pub use register::ConfigStep;
