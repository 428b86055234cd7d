//! User-facing payload layouts
//!
//! The control path exchanges three shapes with user space:
//! a 2-byte (address, bus) pair to bind a device, a 2-byte little-endian
//! sample on read, and ioctl-style command numbers carrying an integer
//! selector.

use crate::error::PayloadError;

/// Highest valid 7-bit I2C address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Request to bind a session to a device at `address` on `bus`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindRequest {
    /// 7-bit device address
    pub address: u8,
    /// Bus index
    pub bus: u8,
}

impl BindRequest {
    /// Payload length in bytes
    pub const LEN: usize = 2;

    /// Create a bind request, rejecting addresses wider than 7 bits
    pub const fn new(address: u8, bus: u8) -> Result<Self, PayloadError> {
        if address > MAX_ADDRESS {
            return Err(PayloadError::Address(address));
        }
        Ok(Self { address, bus })
    }

    /// Decode the `[address, bus]` payload
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        match bytes {
            [address, bus] => Self::new(*address, *bus),
            _ => Err(PayloadError::Length {
                expected: Self::LEN,
                actual: bytes.len(),
            }),
        }
    }

    /// Encode as the `[address, bus]` payload
    pub const fn encode(self) -> [u8; Self::LEN] {
        [self.address, self.bus]
    }
}

// ============================================================================
// ioctl command numbers (Linux asm-generic encoding)
// ============================================================================

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_NONE: u32 = 0;
const IOC_WRITE: u32 = 1;

const fn ioc(dir: u32, ty: u8, nr: u8, size: u32) -> u32 {
    (dir << IOC_DIRSHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | (size << IOC_SIZESHIFT)
}

/// Command without argument (`_IO`)
pub const fn io(ty: u8, nr: u8) -> u32 {
    ioc(IOC_NONE, ty, nr, 0)
}

/// Command carrying a C `int` from user space (`_IOW(ty, nr, int)`)
pub const fn iow_int(ty: u8, nr: u8) -> u32 {
    ioc(IOC_WRITE, ty, nr, core::mem::size_of::<i32>() as u32)
}
