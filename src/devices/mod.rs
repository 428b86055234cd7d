//! Device drivers
//!
//! This module contains device drivers that use platform abstraction traits.
//!
//! ## Modules
//!
//! - `register`: verified register writes shared by all drivers
//! - `registry`: (bus, address) admission for session-bound drivers
//! - `sink`: delivery of samples produced by interrupt work
//! - `stts22h`: temperature sensor, session driven
//! - `bma400`: accelerometer, interrupt driven
//! - `isl29125`: RGB light sensor, interrupt driven
//! - `dht20`: humidity and temperature sensor, timer driven

pub mod bma400;
pub mod dht20;
pub mod isl29125;
pub mod register;
pub mod registry;
pub mod sink;
pub mod stts22h;

pub use register::VerifiedWrite;
pub use registry::{DeviceInfo, DeviceRegistry, Registration, RegistrationId};
pub use sink::{LogSink, SampleSink};
