//! STTS22H session integration tests
//!
//! Several sessions share one driver and one simulated bus, as independent
//! users of the character device would.

use i2c_sensors::devices::stts22h::{
    registers, AcquisitionMode, BindRequest, ControlResponse, Stts22hDriver, CMD_LIST,
    CMD_SET_MODE, MAX_ATTEMPTS,
};
use i2c_sensors::platform::host::{BusTable, SharedI2c};
use i2c_sensors::platform::mock::{MockDelay, MockI2c};
use i2c_sensors::DeviceError;

const BUS: u8 = 2;

fn add_sensor(bus: &MockI2c, address: u8, centi_celsius: i16) {
    let [lsb, msb] = centi_celsius.to_le_bytes();
    bus.set_register(address, registers::WHOAMI, registers::CHIP_ID);
    bus.set_register(address, registers::TEMP_L, lsb);
    bus.set_register(address, registers::TEMP_H, msb);
}

fn driver(bus: &MockI2c) -> Stts22hDriver<BusTable<SharedI2c<MockI2c>>, MockDelay> {
    let buses = BusTable::new().with_bus(BUS, SharedI2c::new(bus.clone()));
    Stts22hDriver::new(buses, MockDelay::new())
}

#[test]
fn one_shot_cycle_at_0x3c_on_bus_2() {
    let bus = MockI2c::new();
    add_sensor(&bus, 0x3C, 2150);
    let driver = driver(&bus);
    let session = driver.open();

    session.write(&[0x3C, BUS]).unwrap();
    session.control(CMD_SET_MODE, 0).unwrap();
    let mut buf = [0u8; 2];
    let len = session.read(&mut buf).unwrap();

    assert_eq!(len, 2);
    assert_eq!(i16::from_le_bytes(buf), 2150);
    assert!(bus.reads_of(0x3C, registers::STATUS) as u32 <= MAX_ATTEMPTS);
}

#[test]
fn racing_binds_admit_exactly_one_session() {
    let bus = MockI2c::new();
    add_sensor(&bus, 0x3C, 0);
    let driver = driver(&bus);
    let sessions: Vec<_> = (0..8).map(|_| driver.open()).collect();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = sessions
            .iter()
            .map(|session| s.spawn(move || session.bind(BindRequest::new(0x3C, BUS).unwrap())))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, DeviceError::AddressInUse { bus: BUS, address: 0x3C })));
    assert_eq!(driver.list().len(), 1);
}

#[test]
fn sessions_on_different_devices_read_concurrently() {
    let bus = MockI2c::new();
    let addresses = [0x38u8, 0x3C, 0x3E, 0x3F];
    for (i, address) in addresses.iter().enumerate() {
        add_sensor(&bus, *address, 1000 + i as i16);
    }
    let driver = driver(&bus);

    std::thread::scope(|s| {
        for (i, address) in addresses.iter().enumerate() {
            let driver = &driver;
            s.spawn(move || {
                let session = driver.open();
                session.bind(BindRequest::new(*address, BUS).unwrap()).unwrap();
                for _ in 0..20 {
                    let sample = session.read_sample().unwrap();
                    assert_eq!(sample.centi_celsius(), 1000 + i as i32);
                }
            });
        }
    });

    // Every session was dropped at the end of its thread
    assert!(driver.registry().is_empty());
}

#[test]
fn failed_identity_leaves_pair_unlisted() {
    let bus = MockI2c::new();
    add_sensor(&bus, 0x3C, 0);
    bus.set_register(0x3D, registers::WHOAMI, 0x55);
    let driver = driver(&bus);
    let good = driver.open();
    let bad = driver.open();

    good.bind(BindRequest::new(0x3C, BUS).unwrap()).unwrap();
    assert!(matches!(
        bad.bind(BindRequest::new(0x3D, BUS).unwrap()),
        Err(DeviceError::IdentityMismatch { actual: 0x55, .. })
    ));

    let ControlResponse::Devices(devices) = bad.control(CMD_LIST, 0).unwrap() else {
        panic!("expected device list");
    };
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].address, 0x3C);
}

#[test]
fn busy_sensor_times_out_after_exactly_max_attempts() {
    let bus = MockI2c::new();
    add_sensor(&bus, 0x3C, 0);
    bus.pin_register(0x3C, registers::STATUS, registers::STATUS_BUSY);
    let driver = driver(&bus);
    let session = driver.open();
    session.bind(BindRequest::new(0x3C, BUS).unwrap()).unwrap();

    let err = session.read_sample().unwrap_err();

    assert!(matches!(err, DeviceError::ConversionTimeout { attempts } if attempts == MAX_ATTEMPTS));
    assert!(err.is_retryable());
    assert_eq!(bus.reads_of(0x3C, registers::STATUS) as u32, MAX_ATTEMPTS);
    assert_eq!(bus.reads_of(0x3C, registers::TEMP_L), 0);
}

#[test]
fn mode_changes_are_visible_in_list() {
    let bus = MockI2c::new();
    add_sensor(&bus, 0x3C, 0);
    let driver = driver(&bus);
    let session = driver.open();
    session.bind(BindRequest::new(0x3C, BUS).unwrap()).unwrap();

    session.control(CMD_SET_MODE, 1).unwrap();
    assert_eq!(driver.list()[0].mode, AcquisitionMode::FreeRun);

    session.control(CMD_SET_MODE, 0).unwrap();
    assert_eq!(driver.list()[0].mode, AcquisitionMode::OneShot);
}
