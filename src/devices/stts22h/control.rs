//! STTS22H byte-payload interface
//!
//! The character-device view of a session: a 2-byte write binds, a read
//! returns one little-endian sample, and control commands list devices or
//! switch mode and rate.
//!
//! Control commands are decoded before any lock is taken or any register is
//! touched, so an invalid selector never reaches the hardware.

use super::driver::Stts22hSession;
use crate::devices::registry::DeviceInfo;
use crate::error::{DeviceError, Result};
use crate::platform::traits::BusResolver;
use embedded_hal::delay::DelayNs;
use i2c_sensors_core::stts22h::{AcquisitionMode, ControlRequest};
use i2c_sensors_core::BindRequest;

/// Reply to a control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlResponse {
    /// Registry snapshot in bind order
    Devices(Vec<DeviceInfo>),
    /// Mode now in effect
    Mode(AcquisitionMode),
    /// Rate changed
    Done,
}

impl<R: BusResolver, D: DelayNs + Clone> Stts22hSession<'_, R, D> {
    /// Bind from a `[address, bus]` payload
    ///
    /// Returns the number of bytes consumed.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        let request = BindRequest::decode(payload)?;
        self.bind(request)?;
        Ok(BindRequest::LEN)
    }

    /// Read one sample into `buffer` as little-endian hundredths of a degree
    ///
    /// Returns the number of bytes written. A buffer shorter than a sample is
    /// rejected before any bus traffic.
    pub fn read(&self, buffer: &mut [u8]) -> Result<usize> {
        let needed = std::mem::size_of::<i16>();
        if buffer.len() < needed {
            return Err(DeviceError::BufferTooSmall {
                needed,
                actual: buffer.len(),
            });
        }

        let sample = self.read_sample()?;
        buffer[..needed].copy_from_slice(&sample.to_le_bytes());
        Ok(needed)
    }

    /// Execute a control command
    ///
    /// # Errors
    ///
    /// - `InvalidSelector` for unknown commands or out-of-range arguments
    /// - `NotBound` for mode and rate changes on an unbound session
    pub fn control(&self, command: u32, arg: i32) -> Result<ControlResponse> {
        match ControlRequest::decode(command, arg)? {
            ControlRequest::ListDevices => {
                let devices = self.driver.list();
                for (index, device) in devices.iter().enumerate() {
                    crate::log_info!(
                        "STTS22H: device {}: address {:#04x}, bus {}, mode {:?}",
                        index,
                        device.address,
                        device.bus,
                        device.mode
                    );
                }
                Ok(ControlResponse::Devices(devices))
            }
            ControlRequest::SetMode(selector) => {
                self.set_mode_selector(selector).map(ControlResponse::Mode)
            }
            ControlRequest::SetRate(rate) => {
                self.set_rate(rate)?;
                Ok(ControlResponse::Done)
            }
        }
    }
}
