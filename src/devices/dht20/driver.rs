//! DHT20 Driver Implementation

use crate::core::{InterruptDispatcher, WorkState, WorkStats};
use crate::devices::sink::SampleSink;
use crate::error::{DeviceError, Result};
use crate::platform::host::PeriodicSignal;
use crate::platform::traits::{Edge, RegisterTransport, SignalSource};
use embedded_hal::delay::DelayNs;
use i2c_sensors_core::dht20::{
    status_ok, Measurement, CMD_STATUS, CMD_TRIGGER, DATA_LEN, FRAME_LEN, INIT_SETTLE_MS,
    MEASURE_MS, POLL_PERIOD_MS, POWER_ON_MS, STATUS_BUSY,
};
use std::time::Duration;

/// DHT20 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dht20Config {
    /// Wait after power-on before the status query
    pub power_on_ms: u32,
    /// Wait after a successful status query
    pub init_settle_ms: u32,
    /// Conversion time after the trigger command
    pub measure_ms: u32,
    /// Period of the polling timer
    pub poll_period: Duration,
}

impl Default for Dht20Config {
    fn default() -> Self {
        Self {
            power_on_ms: POWER_ON_MS,
            init_settle_ms: INIT_SETTLE_MS,
            measure_ms: MEASURE_MS,
            poll_period: Duration::from_millis(POLL_PERIOD_MS),
        }
    }
}

/// Probed DHT20
pub struct Dht20<T, D> {
    transport: T,
    delay: D,
    config: Dht20Config,
}

impl<T, D> Dht20<T, D>
where
    T: RegisterTransport + Send + 'static,
    D: DelayNs + Send + 'static,
{
    /// Wait for power-on and check the calibration status
    ///
    /// # Errors
    ///
    /// Returns `NotReady` if the status byte has bits set outside the
    /// calibration mask.
    pub fn probe(transport: T, delay: D, config: Dht20Config) -> Result<Self> {
        let mut device = Self {
            transport,
            delay,
            config,
        };

        // Step 1: Power-on wait
        device.delay.delay_ms(config.power_on_ms);

        // Step 2: Status query
        device.transport.send(&[CMD_STATUS])?;
        let mut status = [0u8; 1];
        device.transport.receive(&mut status)?;
        if !status_ok(status[0]) {
            crate::log_warn!("DHT20: not ready, status {:#04x}", status[0]);
            return Err(DeviceError::NotReady { status: status[0] });
        }

        // Step 3: Settle
        device.delay.delay_ms(config.init_settle_ms);

        crate::log_info!("DHT20: probed at {:#04x}", device.transport.address());
        Ok(device)
    }

    /// Trigger a conversion and return the five data bytes
    fn read_frame(&mut self) -> Result<[u8; DATA_LEN]> {
        self.transport.send(&CMD_TRIGGER)?;
        self.delay.delay_ms(self.config.measure_ms);

        let mut frame = [0u8; FRAME_LEN];
        self.transport.receive(&mut frame)?;
        if frame[0] & STATUS_BUSY != 0 {
            crate::log_debug!("DHT20: busy, status {:#04x}", frame[0]);
            return Err(DeviceError::NotReady { status: frame[0] });
        }

        let mut data = [0u8; DATA_LEN];
        data.copy_from_slice(&frame[1..]);
        Ok(data)
    }

    /// Take one measurement
    pub fn measure(&mut self) -> Result<Measurement> {
        let data = self.read_frame()?;
        Ok(Measurement::from_data(&data))
    }

    /// Take one measurement and copy its raw data bytes into `buffer`
    ///
    /// Returns the number of bytes written.
    pub fn read_payload(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if buffer.len() < DATA_LEN {
            return Err(DeviceError::BufferTooSmall {
                needed: DATA_LEN,
                actual: buffer.len(),
            });
        }
        let data = self.read_frame()?;
        buffer[..DATA_LEN].copy_from_slice(&data);
        Ok(DATA_LEN)
    }

    /// Measure on every tick of `signal`
    pub fn start_polling<S, K>(self, signal: S, sink: K) -> Result<Dht20Device<S>>
    where
        S: SignalSource,
        K: SampleSink<Measurement>,
    {
        let mut device = self;
        let mut sink = sink;
        let dispatcher = InterruptDispatcher::arm(signal, Edge::Rising, "dht20", move || {
            let measurement = device.measure()?;
            sink.report(measurement);
            Ok(())
        })?;
        Ok(Dht20Device { dispatcher })
    }

    /// Measure every `poll_period` on a timer thread
    pub fn start_periodic<K>(self, sink: K) -> Result<Dht20Device<PeriodicSignal>>
    where
        K: SampleSink<Measurement>,
    {
        let period = self.config.poll_period;
        self.start_polling(PeriodicSignal::new(period), sink)
    }
}

/// DHT20 with polling enabled
pub struct Dht20Device<S: SignalSource> {
    dispatcher: InterruptDispatcher<S>,
}

impl<S: SignalSource> Dht20Device<S> {
    /// Current state of the polling work item
    pub fn state(&self) -> WorkState {
        self.dispatcher.state()
    }

    /// Polling work counters
    pub fn stats(&self) -> WorkStats {
        self.dispatcher.stats()
    }

    /// Wait until no measurement is queued or running
    pub fn flush(&self) {
        self.dispatcher.flush();
    }

    /// Stop polling and release the device
    pub fn remove(self) -> WorkStats {
        let stats = self.dispatcher.teardown();
        crate::log_info!("DHT20: removed after {} measurements", stats.runs);
        stats
    }
}
