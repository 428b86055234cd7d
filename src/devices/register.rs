//! Verified register configuration
//!
//! [`VerifiedWrite::configure`] is the only way drivers change device
//! registers: every write is immediately read back and compared, so a
//! configured register is one that was observed to hold the value.
//! There is no retry; callers restart the whole operation if they want one.

use crate::error::{ConfigError, DeviceError};
use crate::platform::traits::RegisterTransport;
use i2c_sensors_core::ConfigStep;

/// Verified writes for any register transport
pub trait VerifiedWrite: RegisterTransport {
    /// Write `value` to `register` and confirm it by reading it back
    ///
    /// # Errors
    ///
    /// - `ConfigError::Transport` if the write or the read-back fails
    /// - `ConfigError::VerificationMismatch` if the read-back differs
    fn configure(&mut self, register: u8, value: u8) -> Result<(), ConfigError> {
        self.write_byte(register, value)
            .map_err(|source| ConfigError::Transport { register, source })?;
        let actual = self
            .read_byte(register)
            .map_err(|source| ConfigError::Transport { register, source })?;
        if actual != value {
            return Err(ConfigError::VerificationMismatch {
                register,
                expected: value,
                actual,
            });
        }
        Ok(())
    }

    /// Apply a configuration table in order, stopping at the first failure
    ///
    /// `device` prefixes the log line naming the failed step.
    fn configure_all(&mut self, device: &str, steps: &[ConfigStep]) -> Result<(), ConfigError> {
        for step in steps {
            if let Err(err) = self.configure(step.register, step.value) {
                crate::log_error!("{}: failed to configure {}: {}", device, step.what, err);
                return Err(err);
            }
            crate::log_trace!(
                "{}: {} = {:#04x} (reg {:#04x})",
                device,
                step.what,
                step.value,
                step.register
            );
        }
        Ok(())
    }

    /// Read an identity register and compare it against `expected`
    fn check_identity(&mut self, register: u8, expected: u8) -> Result<(), DeviceError> {
        let actual = self.read_byte(register)?;
        if actual != expected {
            return Err(DeviceError::IdentityMismatch {
                register,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl<T: RegisterTransport + ?Sized> VerifiedWrite for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::error::TransportError;
    use crate::platform::mock::MockI2c;
    use crate::platform::traits::I2cDevice;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    #[test]
    fn test_configure_writes_then_reads_back() {
        let expectations = [
            Transaction::write(0x3C, vec![0x04, 0x0C]),
            Transaction::write_read(0x3C, vec![0x04], vec![0x0C]),
        ];
        let mut device = I2cDevice::new(I2cMock::new(&expectations), 0x3C);

        device.configure(0x04, 0x0C).unwrap();
        device.into_inner().done();
    }

    #[test]
    fn test_configure_mismatch_is_terminal() {
        // A single mismatch fails without a second write attempt.
        let expectations = [
            Transaction::write(0x3C, vec![0x04, 0x0C]),
            Transaction::write_read(0x3C, vec![0x04], vec![0x08]),
        ];
        let mut device = I2cDevice::new(I2cMock::new(&expectations), 0x3C);

        assert_eq!(
            device.configure(0x04, 0x0C),
            Err(ConfigError::VerificationMismatch {
                register: 0x04,
                expected: 0x0C,
                actual: 0x08
            })
        );
        device.into_inner().done();
    }

    #[test]
    fn test_configure_write_failure_skips_read_back() {
        let expectations =
            [Transaction::write(0x3C, vec![0x04, 0x0C]).with_error(ErrorKind::Other)];
        let mut device = I2cDevice::new(I2cMock::new(&expectations), 0x3C);

        assert_eq!(
            device.configure(0x04, 0x0C),
            Err(ConfigError::Transport {
                register: 0x04,
                source: TransportError::Other
            })
        );
        device.into_inner().done();
    }

    #[test]
    fn test_configure_read_back_failure() {
        let expectations = [
            Transaction::write(0x3C, vec![0x04, 0x0C]),
            Transaction::write_read(0x3C, vec![0x04], vec![0x00]).with_error(ErrorKind::Bus),
        ];
        let mut device = I2cDevice::new(I2cMock::new(&expectations), 0x3C);

        assert!(matches!(
            device.configure(0x04, 0x0C),
            Err(ConfigError::Transport {
                source: TransportError::Bus,
                ..
            })
        ));
        device.into_inner().done();
    }

    #[test]
    fn test_configure_twice_is_idempotent() {
        let bus = MockI2c::new();
        bus.add_device(0x3C);
        let mut device = I2cDevice::new(bus.clone(), 0x3C);

        device.configure(0x04, 0x0C).unwrap();
        device.configure(0x04, 0x0C).unwrap();

        assert_eq!(bus.register(0x3C, 0x04), 0x0C);
        assert_eq!(bus.writes_to(0x3C, 0x04), vec![0x0C, 0x0C]);
    }

    #[test]
    fn test_configure_all_stops_at_first_failure() {
        let bus = MockI2c::new();
        bus.pin_register(0x44, 0x03, 0x00);
        let mut device = I2cDevice::new(bus.clone(), 0x44);

        let steps = [
            ConfigStep::new(0x01, 0x0A, "mode"),
            ConfigStep::new(0x03, 0x0E, "interrupt"),
            ConfigStep::new(0x04, 0x00, "low threshold LSB"),
        ];
        let err = device.configure_all("TEST", &steps).unwrap_err();

        assert_eq!(
            err,
            ConfigError::VerificationMismatch {
                register: 0x03,
                expected: 0x0E,
                actual: 0x00
            }
        );
        assert!(bus.writes_to(0x44, 0x04).is_empty());
    }

    #[test]
    fn test_check_identity() {
        let bus = MockI2c::new();
        bus.set_register(0x3C, 0x01, 0xA0);
        let mut device = I2cDevice::new(bus, 0x3C);

        device.check_identity(0x01, 0xA0).unwrap();
        assert!(matches!(
            device.check_identity(0x01, 0x90),
            Err(DeviceError::IdentityMismatch {
                register: 0x01,
                expected: 0x90,
                actual: 0xA0
            })
        ));
    }
}
