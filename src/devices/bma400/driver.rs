//! BMA400 Driver Implementation
//!
//! Probe-time configuration plus the interrupt bottom half for each operating
//! mode.

use super::event::Bma400Event;
use crate::core::{InterruptDispatcher, WorkState, WorkStats};
use crate::devices::register::VerifiedWrite;
use crate::devices::sink::SampleSink;
use crate::error::Result;
use crate::platform::traits::{Edge, RegisterTransport, SignalSource};
use embedded_hal::delay::DelayNs;
use i2c_sensors_core::bma400::{registers, AccelRange, Bma400Mode, INT_STAT_LEN, POWER_SETTLE_MS};
use i2c_sensors_core::AccelSample;
use std::time::Instant;

/// BMA400 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bma400Config {
    /// Operating mode programmed at probe
    pub mode: Bma400Mode,
    /// Wait after a power mode write
    pub settle_ms: u32,
    /// Interrupt line polarity
    pub edge: Edge,
}

impl Default for Bma400Config {
    fn default() -> Self {
        Self {
            mode: Bma400Mode::default(),
            settle_ms: POWER_SETTLE_MS,
            edge: Edge::Rising,
        }
    }
}

/// Probed BMA400, not yet wired to its interrupt line
pub struct Bma400<T, D> {
    transport: T,
    delay: D,
    config: Bma400Config,
}

impl<T, D> Bma400<T, D>
where
    T: RegisterTransport + Send + 'static,
    D: DelayNs + Send + 'static,
{
    /// Verify the chip and program the configured mode
    ///
    /// # Arguments
    ///
    /// * `transport` - Register access to the device
    /// * `delay` - Delay provider for the power settle time
    /// * `config` - Operating mode and timing
    ///
    /// # Returns
    ///
    /// Configured device or the first failed step
    pub fn probe(transport: T, delay: D, config: Bma400Config) -> Result<Self> {
        let mut device = Self {
            transport,
            delay,
            config,
        };
        device.init()?;
        Ok(device)
    }

    fn init(&mut self) -> Result<()> {
        let mode = self.config.mode;

        // Step 1: Verify chip id
        self.transport
            .check_identity(registers::CHIPID, registers::CHIP_ID)?;
        crate::log_debug!("BMA400: chip id ok");

        // Step 2: Power mode, then let it settle
        self.transport
            .configure_all("BMA400", &[mode.power_step()])?;
        self.delay.delay_ms(self.config.settle_ms);

        // Step 3: Mode specific interrupt setup
        self.transport
            .configure_all("BMA400", mode.interrupt_steps())?;

        // Step 4: Clear latched interrupt status
        let mut status = [0u8; INT_STAT_LEN];
        self.transport.read_block(registers::INT_STAT0, &mut status)?;
        crate::log_debug!("BMA400: cleared interrupt status {:02x?}", status);

        crate::log_info!(
            "BMA400: probed at {:#04x} in {:?} mode",
            self.transport.address(),
            mode
        );
        Ok(())
    }

    /// Operating mode
    pub fn mode(&self) -> Bma400Mode {
        self.config.mode
    }

    /// Full scale range of reported samples
    pub fn range(&self) -> AccelRange {
        self.config.mode.range()
    }

    /// Read one X/Y/Z sample
    pub fn read_acceleration(&mut self) -> Result<AccelSample> {
        let mut data = [0u8; AccelSample::BURST_LEN];
        self.transport.read_block(registers::ACC_X_LSB, &mut data)?;
        Ok(AccelSample::from_burst(&data))
    }

    /// Bottom half: one run per interrupt
    fn service<K: SampleSink<Bma400Event>>(&mut self, sink: &mut K) -> Result<()> {
        match self.config.mode {
            Bma400Mode::Normal => {
                let sample = self.read_acceleration()?;
                sink.report(Bma400Event::DataReady(sample));
                self.transport.read_byte(registers::INT_STAT0)?;
            }
            Bma400Mode::LowPower => {
                let sample = self.read_acceleration()?;
                sink.report(Bma400Event::WakeUp(sample));
                // Wake-up moved the device to normal power; return to low power
                self.transport
                    .configure(registers::ACC_CONFIG0, registers::POWER_LOW)?;
                self.delay.delay_ms(self.config.settle_ms);
            }
            Bma400Mode::Tap => {
                sink.report(Bma400Event::Tap { at: Instant::now() });
                self.transport.read_byte(registers::INT_STAT1)?;
            }
        }
        Ok(())
    }

    /// Attach the interrupt line and start delivering events to `sink`
    ///
    /// The device moves into the work item; it is released by
    /// [`Bma400Device::remove`].
    pub fn arm<S, K>(self, signal: S, sink: K) -> Result<Bma400Device<S>>
    where
        S: SignalSource,
        K: SampleSink<Bma400Event>,
    {
        let mode = self.config.mode;
        let range = self.range();
        let edge = self.config.edge;
        let mut device = self;
        let mut sink = sink;
        let dispatcher = InterruptDispatcher::arm(signal, edge, "bma400", move || {
            device.service(&mut sink)
        })?;

        Ok(Bma400Device {
            dispatcher,
            mode,
            range,
        })
    }
}

/// Armed BMA400
pub struct Bma400Device<S: SignalSource> {
    dispatcher: InterruptDispatcher<S>,
    mode: Bma400Mode,
    range: AccelRange,
}

impl<S: SignalSource> Bma400Device<S> {
    /// Operating mode
    pub fn mode(&self) -> Bma400Mode {
        self.mode
    }

    /// Full scale range of reported samples
    pub fn range(&self) -> AccelRange {
        self.range
    }

    /// Current state of the interrupt work item
    pub fn state(&self) -> WorkState {
        self.dispatcher.state()
    }

    /// Interrupt work counters
    pub fn stats(&self) -> WorkStats {
        self.dispatcher.stats()
    }

    /// Wait until no interrupt work is queued or running
    pub fn flush(&self) {
        self.dispatcher.flush();
    }

    /// Tear down interrupt handling and release the device
    ///
    /// Blocks until a running work item has finished. No work item runs
    /// after this returns.
    pub fn remove(self) -> WorkStats {
        let stats = self.dispatcher.teardown();
        crate::log_info!("BMA400: removed after {} interrupt runs", stats.runs);
        stats
    }
}
