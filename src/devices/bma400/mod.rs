//! BMA400 accelerometer driver
//!
//! Interrupt-driven: [`Bma400::probe`] programs one of three operating modes
//! and [`Bma400::arm`] wires the INT1 line to a work item that reads and
//! reports on every edge.
//!
//! | Mode      | Interrupt          | Work item                                  |
//! |-----------|--------------------|--------------------------------------------|
//! | Low-power | wake-up motion     | burst read, report, back to low power      |
//! | Normal    | data ready         | burst read, report, clear INT_STAT0        |
//! | Tap       | single tap         | report timestamp, clear INT_STAT1          |

mod driver;
mod event;

pub use driver::{Bma400, Bma400Config, Bma400Device};
pub use event::{to_m_s2, Bma400Event};
pub use i2c_sensors_core::bma400::{registers, AccelRange, Bma400Mode};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, DeviceError};
    use crate::platform::mock::{I2cTransaction, MockDelay, MockI2c, MockSignalLine};
    use crate::platform::traits::{Edge, I2cDevice};
    use embedded_hal::i2c::ErrorKind;
    use i2c_sensors_core::AccelSample;
    use std::sync::mpsc;
    use std::time::Duration;

    const ADDR: u8 = registers::DEFAULT_ADDRESS;

    fn accel_bus() -> MockI2c {
        let bus = MockI2c::new();
        bus.set_register(ADDR, registers::CHIPID, registers::CHIP_ID);
        for (offset, value) in [0xFF, 0x0F, 0x00, 0x02, 0x01, 0x00].into_iter().enumerate() {
            bus.set_register(ADDR, registers::ACC_X_LSB + offset as u8, value);
        }
        bus
    }

    fn probe(
        bus: &MockI2c,
        mode: Bma400Mode,
    ) -> crate::error::Result<Bma400<I2cDevice<MockI2c>, MockDelay>> {
        let config = Bma400Config {
            mode,
            ..Bma400Config::default()
        };
        Bma400::probe(I2cDevice::new(bus.clone(), ADDR), MockDelay::new(), config)
    }

    fn burst_reads(bus: &MockI2c) -> usize {
        bus.transactions()
            .iter()
            .filter(|t| {
                matches!(t, I2cTransaction::WriteRead { write_data, read_len: 6, .. }
                    if write_data.as_slice() == [registers::ACC_X_LSB])
            })
            .count()
    }

    #[test]
    fn test_probe_normal_mode_sequence() {
        let bus = accel_bus();
        let delay = MockDelay::new();
        Bma400::probe(
            I2cDevice::new(bus.clone(), ADDR),
            delay.clone(),
            Bma400Config::default(),
        )
        .unwrap();

        let writes: Vec<_> = bus
            .transactions()
            .into_iter()
            .filter_map(|t| match t {
                I2cTransaction::Write { data, .. } => Some((data[0], data[1])),
                _ => None,
            })
            .collect();
        assert_eq!(
            writes,
            vec![
                (registers::ACC_CONFIG0, registers::POWER_NORMAL),
                (registers::ACC_CONFIG1, 0x59),
                (registers::ACC_CONFIG2, registers::DATA_SRC_FILT2),
                (registers::INT_CONFIG0, registers::INT_DRDY_EN),
                (registers::INT_CONFIG1, registers::INT_LATCH_EN),
                (registers::INT1_MAP, registers::INT1_MAP_DRDY),
            ]
        );
        assert_eq!(delay.total(), Duration::from_millis(2));
        assert!(bus.transactions().contains(&I2cTransaction::WriteRead {
            addr: ADDR,
            write_data: vec![registers::INT_STAT0],
            read_len: 3,
        }));
    }

    #[test]
    fn test_probe_low_power_mode() {
        let bus = accel_bus();
        probe(&bus, Bma400Mode::LowPower).unwrap();

        assert_eq!(bus.register(ADDR, registers::ACC_CONFIG0), registers::POWER_LOW);
        assert_eq!(bus.register(ADDR, registers::ACC_CONFIG1), 0x46);
        assert_eq!(bus.register(ADDR, registers::WKUP_INT_CONFIG0), 0xE1);
        assert_eq!(bus.register(ADDR, registers::WKUP_INT_CONFIG1), 0x02);
    }

    #[test]
    fn test_probe_rejects_wrong_chip() {
        let bus = accel_bus();
        bus.set_register(ADDR, registers::CHIPID, 0x00);

        assert!(matches!(
            probe(&bus, Bma400Mode::Normal),
            Err(DeviceError::IdentityMismatch { actual: 0x00, .. })
        ));
        assert!(bus.writes_to(ADDR, registers::ACC_CONFIG0).is_empty());
    }

    #[test]
    fn test_probe_stops_at_unverified_step() {
        let bus = accel_bus();
        bus.pin_register(ADDR, registers::INT_CONFIG0, 0x00);

        assert!(matches!(
            probe(&bus, Bma400Mode::Normal),
            Err(DeviceError::Config(ConfigError::VerificationMismatch {
                register: registers::INT_CONFIG0,
                ..
            }))
        ));
        assert!(bus.writes_to(ADDR, registers::INT_CONFIG1).is_empty());
    }

    #[test]
    fn test_normal_interrupt_reads_burst_and_clears_status() {
        let bus = accel_bus();
        let line = MockSignalLine::new();
        let (tx, rx) = mpsc::channel();
        let device = probe(&bus, Bma400Mode::Normal)
            .unwrap()
            .arm(line.clone(), tx)
            .unwrap();
        assert_eq!(line.edge(), Some(Edge::Rising));
        bus.clear_transactions();

        line.fire();
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        device.flush();

        assert_eq!(
            event,
            Bma400Event::DataReady(AccelSample { x: -1, y: 512, z: 1 })
        );
        assert_eq!(burst_reads(&bus), 1);
        assert_eq!(bus.reads_of(ADDR, registers::INT_STAT0), 1);
        assert_eq!(bus.transactions().len(), 2);
        assert_eq!(device.stats().runs, 1);
    }

    #[test]
    fn test_wake_up_returns_to_low_power() {
        let bus = accel_bus();
        let line = MockSignalLine::new();
        let (tx, rx) = mpsc::channel();
        let device = probe(&bus, Bma400Mode::LowPower)
            .unwrap()
            .arm(line.clone(), tx)
            .unwrap();
        // Wake-up switched the device to normal power
        bus.set_register(ADDR, registers::ACC_CONFIG0, registers::POWER_NORMAL);

        line.fire();
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        device.flush();

        assert!(matches!(event, Bma400Event::WakeUp(_)));
        assert_eq!(
            bus.writes_to(ADDR, registers::ACC_CONFIG0),
            vec![registers::POWER_LOW, registers::POWER_LOW]
        );
        assert_eq!(bus.register(ADDR, registers::ACC_CONFIG0), registers::POWER_LOW);
    }

    #[test]
    fn test_tap_reports_and_clears_int_stat1() {
        let bus = accel_bus();
        let line = MockSignalLine::new();
        let (tx, rx) = mpsc::channel();
        let device = probe(&bus, Bma400Mode::Tap)
            .unwrap()
            .arm(line.clone(), tx)
            .unwrap();
        bus.clear_transactions();

        line.fire();
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        device.flush();

        assert!(matches!(event, Bma400Event::Tap { .. }));
        assert_eq!(burst_reads(&bus), 0);
        assert_eq!(bus.reads_of(ADDR, registers::INT_STAT1), 1);
    }

    #[test]
    fn test_failed_run_is_not_retried() {
        let bus = accel_bus();
        let line = MockSignalLine::new();
        let (tx, rx) = mpsc::channel();
        let device = probe(&bus, Bma400Mode::Normal)
            .unwrap()
            .arm(line.clone(), tx)
            .unwrap();
        bus.fail_register(ADDR, registers::ACC_X_LSB, ErrorKind::Bus);
        bus.clear_transactions();

        line.fire();
        device.flush();
        assert_eq!(device.stats().failures, 1);
        assert_eq!(bus.transactions().len(), 1);
        assert!(rx.try_recv().is_err());

        // The next edge is serviced normally
        bus.clear_faults();
        line.fire();
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        device.flush();
        assert_eq!(device.stats().runs, 2);
    }

    #[test]
    fn test_remove_detaches_line() {
        let bus = accel_bus();
        let line = MockSignalLine::new();
        let (tx, _rx) = mpsc::channel();
        let device = probe(&bus, Bma400Mode::Normal)
            .unwrap()
            .arm(line.clone(), tx)
            .unwrap();

        let stats = device.remove();

        assert_eq!(stats.runs, 0);
        assert!(!line.is_attached());
        assert!(!line.fire());
    }
}
