//! ISL29125 RGB light sensor driver
//!
//! Configured for red-only 16-bit sensing with a threshold interrupt; the
//! interrupt work reads the red channel and reports it.

mod driver;

pub use driver::{Isl29125, Isl29125Config, Isl29125Device};
pub use i2c_sensors_core::isl29125::{registers, ColorSample, Thresholds};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeviceError;
    use crate::platform::mock::{MockDelay, MockI2c, MockSignalLine};
    use crate::platform::traits::{Edge, I2cDevice};
    use std::sync::mpsc;
    use std::time::Duration;

    const ADDR: u8 = registers::DEFAULT_ADDRESS;

    fn light_bus() -> MockI2c {
        let bus = MockI2c::new();
        bus.set_register(ADDR, registers::DEVICE_ID, registers::CHIP_ID);
        bus.set_register(ADDR, registers::RED_L, 0x34);
        bus.set_register(ADDR, registers::RED_L + 1, 0x12);
        bus
    }

    fn probe(bus: &MockI2c) -> crate::error::Result<Isl29125<I2cDevice<MockI2c>>> {
        Isl29125::probe(
            I2cDevice::new(bus.clone(), ADDR),
            &mut MockDelay::new(),
            Isl29125Config::default(),
        )
    }

    #[test]
    fn test_probe_configures_in_order() {
        let bus = light_bus();
        let mut delay = MockDelay::new();
        Isl29125::probe(
            I2cDevice::new(bus.clone(), ADDR),
            &mut delay,
            Isl29125Config::default(),
        )
        .unwrap();

        assert_eq!(delay.total(), Duration::from_millis(10));
        assert_eq!(bus.register(ADDR, registers::CONFIG1), 0x0A);
        assert_eq!(bus.register(ADDR, registers::CONFIG3), 0x0E);
        assert_eq!(bus.writes_to(ADDR, registers::LOW_THRESHOLD_L), vec![0x00]);
        assert_eq!(bus.writes_to(ADDR, registers::LOW_THRESHOLD_H), vec![0x00]);
        assert_eq!(bus.writes_to(ADDR, registers::HIGH_THRESHOLD_L), vec![0x00]);
        assert_eq!(bus.writes_to(ADDR, registers::HIGH_THRESHOLD_H), vec![0x01]);
        assert_eq!(bus.reads_of(ADDR, registers::STATUS), 1);
    }

    #[test]
    fn test_probe_rejects_wrong_device_id() {
        let bus = light_bus();
        bus.set_register(ADDR, registers::DEVICE_ID, 0x00);

        assert!(matches!(
            probe(&bus),
            Err(DeviceError::IdentityMismatch { expected: 0x7D, .. })
        ));
    }

    #[test]
    fn test_interrupt_reports_red_channel() {
        let bus = light_bus();
        let line = MockSignalLine::new();
        let (tx, rx) = mpsc::channel();
        let device = probe(&bus).unwrap().arm(line.clone(), tx).unwrap();
        assert_eq!(line.edge(), Some(Edge::Falling));
        bus.clear_transactions();

        line.fire();
        let sample = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        device.flush();

        assert_eq!(sample, ColorSample { red: 0x1234 });
        assert_eq!(bus.reads_of(ADDR, registers::RED_L), 1);
        assert_eq!(bus.reads_of(ADDR, registers::STATUS), 1);

        device.remove();
        assert!(!line.is_attached());
    }
}
