//! Platform abstraction layer
//!
//! This module isolates everything that depends on the host: buses, delays
//! and interrupt-like signal sources. Drivers only see the traits.

pub mod error;
pub mod host;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod traits;

// Re-export commonly used types
pub use error::{SignalError, TransportError};
pub use traits::{
    BusId, BusResolver, Edge, I2cDevice, RegisterTransport, SignalHandler, SignalSource,
};
