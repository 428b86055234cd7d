//! ISL29125 Driver Implementation

use crate::core::{InterruptDispatcher, WorkState, WorkStats};
use crate::devices::register::VerifiedWrite;
use crate::devices::sink::SampleSink;
use crate::error::Result;
use crate::platform::traits::{Edge, RegisterTransport, SignalSource};
use embedded_hal::delay::DelayNs;
use i2c_sensors_core::isl29125::{registers, ColorSample, Thresholds, CONFIG_STEPS, SETTLE_MS};

/// ISL29125 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Isl29125Config {
    /// Wait after the identity check before configuring
    pub settle_ms: u32,
    /// Interrupt line polarity (the INT pin is active low)
    pub edge: Edge,
    /// Red channel interrupt window
    pub thresholds: Thresholds,
}

impl Default for Isl29125Config {
    fn default() -> Self {
        Self {
            settle_ms: SETTLE_MS,
            edge: Edge::Falling,
            thresholds: Thresholds::default(),
        }
    }
}

/// Probed ISL29125
pub struct Isl29125<T> {
    transport: T,
    config: Isl29125Config,
}

impl<T: RegisterTransport + Send + 'static> Isl29125<T> {
    /// Verify the chip, configure red-only sensing and the interrupt window
    pub fn probe<D: DelayNs>(transport: T, delay: &mut D, config: Isl29125Config) -> Result<Self> {
        let mut device = Self { transport, config };

        // Step 1: Verify device id
        device
            .transport
            .check_identity(registers::DEVICE_ID, registers::CHIP_ID)?;

        // Step 2: Settle
        delay.delay_ms(config.settle_ms);

        // Step 3: Mode and interrupt source
        device.transport.configure_all("ISL29125", &CONFIG_STEPS)?;

        // Step 4: Threshold window, low byte first
        device
            .transport
            .configure_all("ISL29125", &config.thresholds.steps())?;

        // Step 5: Clear a pending interrupt
        let status = device.transport.read_byte(registers::STATUS)?;
        crate::log_debug!("ISL29125: cleared status {:#04x}", status);

        crate::log_info!("ISL29125: probed at {:#04x}", device.transport.address());
        Ok(device)
    }

    /// Read the red channel
    pub fn read_red(&mut self) -> Result<ColorSample> {
        let mut data = [0u8; 2];
        self.transport.read_block(registers::RED_L, &mut data)?;
        Ok(ColorSample::from_le_bytes(data))
    }

    fn service<K: SampleSink<ColorSample>>(&mut self, sink: &mut K) -> Result<()> {
        let sample = self.read_red()?;
        sink.report(sample);
        self.transport.read_byte(registers::STATUS)?;
        Ok(())
    }

    /// Attach the interrupt line and report every threshold crossing to `sink`
    pub fn arm<S, K>(self, signal: S, sink: K) -> Result<Isl29125Device<S>>
    where
        S: SignalSource,
        K: SampleSink<ColorSample>,
    {
        let edge = self.config.edge;
        let mut device = self;
        let mut sink = sink;
        let dispatcher = InterruptDispatcher::arm(signal, edge, "isl29125", move || {
            device.service(&mut sink)
        })?;
        Ok(Isl29125Device { dispatcher })
    }
}

/// Armed ISL29125
pub struct Isl29125Device<S: SignalSource> {
    dispatcher: InterruptDispatcher<S>,
}

impl<S: SignalSource> Isl29125Device<S> {
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
    pub fn remove(self) -> WorkStats {
        let stats = self.dispatcher.teardown();
        crate::log_info!("ISL29125: removed after {} interrupt runs", stats.runs);
        stats
    }
}
