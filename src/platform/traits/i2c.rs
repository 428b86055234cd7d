//! Register transport trait
//!
//! Drivers talk to their device through [`RegisterTransport`], a blocking
//! register-level view of one device on one I2C bus. [`I2cDevice`] provides it
//! for any `embedded_hal::i2c::I2c` bus.

use crate::platform::error::TransportError;
use embedded_hal::i2c::I2c;

/// Result type for transport operations
pub type Result<T> = core::result::Result<T, TransportError>;

/// Register-level access to one device
///
/// # Invariants
///
/// - Every call is one complete bus transaction; calls are individually atomic
///   but not atomic with respect to each other
/// - Calls may block and must only be made from contexts that can sleep
pub trait RegisterTransport {
    /// 7-bit address of the device
    fn address(&self) -> u8;

    /// Read one register
    ///
    /// START - ADDR(W) - REG - REPEATED_START - ADDR(R) - DATA - STOP
    fn read_byte(&mut self, register: u8) -> Result<u8>;

    /// Write one register
    ///
    /// START - ADDR(W) - REG - DATA - STOP
    fn write_byte(&mut self, register: u8, value: u8) -> Result<()>;

    /// Read consecutive registers starting at `register` in one transaction
    ///
    /// Relies on the device auto-incrementing its register pointer.
    fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<()>;

    /// Send raw bytes without a register prefix
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Receive raw bytes without a register prefix
    fn receive(&mut self, buffer: &mut [u8]) -> Result<()>;
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    fn address(&self) -> u8 {
        (**self).address()
    }

    fn read_byte(&mut self, register: u8) -> Result<u8> {
        (**self).read_byte(register)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<()> {
        (**self).write_byte(register, value)
    }

    fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        (**self).read_block(register, buffer)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<()> {
        (**self).receive(buffer)
    }
}

/// One device on an `embedded_hal` I2C bus
#[derive(Debug)]
pub struct I2cDevice<B> {
    bus: B,
    address: u8,
}

impl<B: I2c> I2cDevice<B> {
    /// Bind `bus` to the device at `address`
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Release the bus handle
    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: I2c> RegisterTransport for I2cDevice<B> {
    fn address(&self) -> u8 {
        self.address
    }

    fn read_byte(&mut self, register: u8) -> Result<u8> {
        let mut value = [0u8; 1];
        self.bus
            .write_read(self.address, &[register], &mut value)
            .map_err(TransportError::from_hal)?;
        Ok(value[0])
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<()> {
        self.bus
            .write(self.address, &[register, value])
            .map_err(TransportError::from_hal)
    }

    fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.bus
            .write_read(self.address, &[register], buffer)
            .map_err(TransportError::from_hal)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.bus
            .write(self.address, bytes)
            .map_err(TransportError::from_hal)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.bus
            .read(self.address, buffer)
            .map_err(TransportError::from_hal)
    }
}
