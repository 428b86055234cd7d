//! Driver error types

use crate::platform::error::{SignalError, TransportError};
use crate::platform::traits::BusId;
use i2c_sensors_core::{PayloadError, SelectorError};
use thiserror::Error;

/// Failure of a verified register write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The write or the read-back failed on the bus
    #[error("transport error on register {register:#04x}: {source}")]
    Transport {
        register: u8,
        #[source]
        source: TransportError,
    },

    /// The read-back value differs from the written value
    #[error("register {register:#04x} reads {actual:#04x} after writing {expected:#04x}")]
    VerificationMismatch { register: u8, expected: u8, actual: u8 },
}

/// Driver errors
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("device {address:#04x} on bus {bus} is already bound")]
    AddressInUse { bus: BusId, address: u8 },

    #[error("unexpected id {actual:#04x} in register {register:#04x} (expected {expected:#04x})")]
    IdentityMismatch { register: u8, expected: u8, actual: u8 },

    #[error("no such bus: {0}")]
    NoSuchBus(BusId),

    #[error("session is not bound to a device")]
    NotBound,

    #[error("session is already bound to {address:#04x} on bus {bus}")]
    AlreadyBound { bus: BusId, address: u8 },

    #[error("conversion still in progress after {attempts} polls")]
    ConversionTimeout { attempts: u32 },

    #[error(transparent)]
    InvalidSelector(#[from] SelectorError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("sensor not ready (status {status:#04x})")]
    NotReady { status: u8 },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("wait interrupted")]
    Interrupted,

    /// An operation panicked while holding the device; the binding was released
    #[error("device state lost after a panic; the session was unbound")]
    Poisoned,

    #[error("signal source error: {0}")]
    Signal(#[from] SignalError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl DeviceError {
    /// Whether retrying the whole operation from scratch may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeviceError::Interrupted
                | DeviceError::ConversionTimeout { .. }
                | DeviceError::NotReady { .. }
                | DeviceError::Config(ConfigError::VerificationMismatch { .. })
        )
    }
}

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, DeviceError>;
