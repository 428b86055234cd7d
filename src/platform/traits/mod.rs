//! Platform abstraction traits
//!
//! This module defines the traits that bus, interrupt and timer providers
//! must implement.

pub mod bus;
pub mod i2c;
pub mod signal;

// Re-export trait interfaces
pub use bus::{BusId, BusResolver};
pub use i2c::{I2cDevice, RegisterTransport};
pub use signal::{Edge, SignalHandler, SignalSource};
