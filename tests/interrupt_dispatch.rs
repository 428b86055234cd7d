//! Interrupt dispatch integration tests
//!
//! Signal handlers only queue work; the work runs on the device's worker
//! thread and removal waits for it.

use i2c_sensors::core::{InterruptDispatcher, WorkState};
use i2c_sensors::devices::bma400::{registers, Bma400, Bma400Config, Bma400Event};
use i2c_sensors::platform::mock::{I2cTransaction, MockDelay, MockI2c, MockSignalLine};
use i2c_sensors::platform::{Edge, I2cDevice};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

#[test]
fn bma400_single_edge_runs_one_burst_and_one_status_read() {
    let bus = MockI2c::new();
    let addr = registers::DEFAULT_ADDRESS;
    bus.set_register(addr, registers::CHIPID, registers::CHIP_ID);
    bus.set_register(addr, registers::ACC_X_LSB, 0xFF);
    bus.set_register(addr, registers::ACC_X_LSB + 1, 0x0F);

    let line = MockSignalLine::new();
    let (tx, rx) = mpsc::channel();
    let device = Bma400::probe(
        I2cDevice::new(bus.clone(), addr),
        MockDelay::new(),
        Bma400Config::default(),
    )
    .unwrap()
    .arm(line.clone(), tx)
    .unwrap();
    bus.clear_transactions();

    assert!(line.fire());
    let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    device.flush();

    assert!(matches!(event, Bma400Event::DataReady(s) if s.x == -1));
    assert_eq!(
        bus.transactions(),
        vec![
            I2cTransaction::WriteRead {
                addr,
                write_data: vec![registers::ACC_X_LSB],
                read_len: 6,
            },
            I2cTransaction::WriteRead {
                addr,
                write_data: vec![registers::INT_STAT0],
                read_len: 1,
            },
        ]
    );
    assert_eq!(device.state(), WorkState::Idle);
    assert_eq!(device.stats().runs, 1);
    device.remove();
}

/// Records when the state owned by a work item is released
struct DeviceState {
    freed: Arc<Mutex<Option<Instant>>>,
}

impl Drop for DeviceState {
    fn drop(&mut self) {
        *self.freed.lock().unwrap() = Some(Instant::now());
    }
}

#[test]
fn removal_waits_for_running_work_and_nothing_runs_after() {
    let line = MockSignalLine::new();
    let completions = Arc::new(Mutex::new(Vec::<Instant>::new()));
    let freed = Arc::new(Mutex::new(None));
    let (started_tx, started_rx) = mpsc::channel();

    let state = DeviceState {
        freed: Arc::clone(&freed),
    };
    let dispatcher = InterruptDispatcher::arm(line.clone(), Edge::Rising, "slow-device", {
        let completions = Arc::clone(&completions);
        move || {
            let _device = &state;
            started_tx.send(()).ok();
            std::thread::sleep(Duration::from_millis(100));
            completions.lock().unwrap().push(Instant::now());
            Ok(())
        }
    })
    .unwrap();

    line.fire();
    started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(dispatcher.state(), WorkState::Running);

    // Fired while running: coalesced, must not run after removal
    line.fire();
    let stats = dispatcher.teardown();
    let removed = Instant::now();

    let completions = completions.lock().unwrap().clone();
    let freed = freed.lock().unwrap().expect("work state was not released");
    assert_eq!(completions.len(), 1);
    assert!(completions[0] <= freed);
    assert!(freed <= removed);
    assert_eq!(stats.runs, 1);

    // Edges after removal reach nothing
    assert!(!line.fire());
    assert!(!line.is_attached());
}

#[test]
fn edges_while_busy_are_coalesced() {
    let line = MockSignalLine::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let dispatcher = InterruptDispatcher::arm(line.clone(), Edge::Falling, "busy-device", {
        let runs = Arc::clone(&runs);
        move || {
            started_tx.send(()).ok();
            release_rx.recv_timeout(Duration::from_secs(2)).ok();
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
    .unwrap();

    line.fire();
    started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    for _ in 0..5 {
        line.fire();
    }
    release_tx.send(()).unwrap();
    dispatcher.flush();

    let stats = dispatcher.teardown();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(stats.runs, 1);
    assert_eq!(stats.coalesced, 5);
}
