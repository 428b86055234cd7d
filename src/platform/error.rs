//! Platform error types
//!
//! Bus implementations report `embedded_hal::i2c::Error`s; drivers only ever
//! see them mapped to [`TransportError`].

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use thiserror::Error;

/// I2C transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Device did not acknowledge its address or a data byte
    #[error("no acknowledge")]
    Nack,
    /// Bus error (misplaced START/STOP)
    #[error("bus error")]
    Bus,
    /// Arbitration lost to another controller
    #[error("arbitration lost")]
    ArbitrationLost,
    /// Controller receive buffer overrun
    #[error("overrun")]
    Overrun,
    /// Any other bus failure
    #[error("I2C transfer failed")]
    Other,
}

impl From<ErrorKind> for TransportError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address
                | NoAcknowledgeSource::Data
                | NoAcknowledgeSource::Unknown,
            ) => TransportError::Nack,
            ErrorKind::Bus => TransportError::Bus,
            ErrorKind::ArbitrationLoss => TransportError::ArbitrationLost,
            ErrorKind::Overrun => TransportError::Overrun,
            _ => TransportError::Other,
        }
    }
}

impl TransportError {
    /// Map any `embedded_hal` I2C error
    pub fn from_hal<E: embedded_hal::i2c::Error>(error: E) -> Self {
        error.kind().into()
    }
}

/// Signal source errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    /// A handler is already attached to this source
    #[error("signal handler already attached")]
    AlreadyAttached,
    /// The source could not be enabled
    #[error("signal source unavailable")]
    Unavailable,
}
