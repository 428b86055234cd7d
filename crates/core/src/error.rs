//! Errors raised while decoding user-supplied selectors and payloads
//!
//! Both error types are produced before any register access, so a caller
//! receiving one knows the hardware state is untouched.

use core::fmt;

/// An integer selector or command did not name a known variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorError {
    /// Unknown acquisition mode selector
    Mode(i32),
    /// Unknown output data rate selector
    Rate(i32),
    /// Unknown control command number
    Command(u32),
    /// Unknown driver operating mode (module-parameter style selector)
    DriverMode(i32),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Mode(v) => write!(f, "invalid mode selector: {}", v),
            SelectorError::Rate(v) => write!(f, "invalid rate selector: {}", v),
            SelectorError::Command(c) => write!(f, "unknown control command: {:#x}", c),
            SelectorError::DriverMode(v) => write!(f, "invalid driver mode: {}", v),
        }
    }
}

impl core::error::Error for SelectorError {}

/// A user payload had the wrong shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// Payload length differs from the fixed layout
    Length { expected: usize, actual: usize },
    /// Address does not fit in 7 bits
    Address(u8),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::Length { expected, actual } => {
                write!(f, "payload must be {} bytes, got {}", expected, actual)
            }
            PayloadError::Address(a) => write!(f, "address {:#04x} is not a 7-bit address", a),
        }
    }
}

impl core::error::Error for PayloadError {}
