//! STTS22H Driver Implementation
//!
//! [`Stts22hDriver`] is the top-level context: it owns the device registry,
//! the bus resolver and the delay provider. Each user session is a
//! [`Stts22hSession`] borrowed from it. A session starts unbound, is bound to
//! one (bus, address) pair and releases the pair when it is dropped.

use crate::devices::register::VerifiedWrite;
use crate::devices::registry::{DeviceInfo, DeviceRegistry, Registration};
use crate::error::{DeviceError, Result};
use crate::platform::traits::{BusResolver, I2cDevice, RegisterTransport};
use embedded_hal::delay::DelayNs;
use i2c_sensors_core::stts22h::{registers, with_rate, AcquisitionMode, OutputDataRate, MAX_ATTEMPTS};
use i2c_sensors_core::{BindRequest, TemperatureSample};
use std::sync::{Mutex, MutexGuard};

/// Default delay between completion polls
const POLL_INTERVAL_US: u32 = 100;

/// STTS22H driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stts22hConfig {
    /// Status polls before a one-shot conversion is abandoned
    pub max_attempts: u32,
    /// Sleep between status polls
    pub poll_interval_us: u32,
}

impl Default for Stts22hConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            poll_interval_us: POLL_INTERVAL_US,
        }
    }
}

/// STTS22H driver context
pub struct Stts22hDriver<R, D> {
    registry: DeviceRegistry,
    resolver: R,
    delay: D,
    config: Stts22hConfig,
}

impl<R: BusResolver, D: DelayNs + Clone> Stts22hDriver<R, D> {
    /// Create a driver with the default configuration
    pub fn new(resolver: R, delay: D) -> Self {
        Self::with_config(resolver, delay, Stts22hConfig::default())
    }

    /// Create a driver with an explicit configuration
    pub fn with_config(resolver: R, delay: D, config: Stts22hConfig) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            resolver,
            delay,
            config,
        }
    }

    /// Open an unbound session
    pub fn open(&self) -> Stts22hSession<'_, R, D> {
        Stts22hSession {
            driver: self,
            state: Mutex::new(SessionState {
                binding: None,
                delay: self.delay.clone(),
            }),
        }
    }

    /// Registry of bound devices
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Snapshot of bound devices in bind order
    pub fn list(&self) -> Vec<DeviceInfo> {
        self.registry.list()
    }

    /// Driver configuration
    pub fn config(&self) -> &Stts22hConfig {
        &self.config
    }
}

/// A bound device: exclusive transport plus the registry entry it owns
struct Binding<'d, B> {
    device: I2cDevice<B>,
    registration: Registration<'d>,
    mode: AcquisitionMode,
    rate: OutputDataRate,
}

impl<B: embedded_hal::i2c::I2c> Binding<'_, B> {
    fn record_mode(&mut self, mode: AcquisitionMode) {
        self.mode = mode;
        self.registration.publish_mode(mode);
    }

    /// Clear the run bits and return the CTRL value read before
    ///
    /// Once the write is verified the device is idle, which is one-shot.
    fn power_down(&mut self) -> Result<u8> {
        let ctrl = self.device.read_byte(registers::CTRL)?;
        self.device
            .configure(registers::CTRL, AcquisitionMode::idle_baseline(ctrl))?;
        self.record_mode(AcquisitionMode::OneShot);
        Ok(ctrl)
    }

    fn transition(&mut self, mode: AcquisitionMode) -> Result<()> {
        // Step 1-2: Power down to the idle baseline
        let ctrl = self.power_down()?;

        // Step 3: One-shot needs nothing beyond the baseline
        if mode == AcquisitionMode::OneShot {
            return Ok(());
        }

        // Step 4: Enable the requested mode
        let value = mode.apply(AcquisitionMode::idle_baseline(ctrl));
        self.device.configure(registers::CTRL, value)?;
        if let AcquisitionMode::LowRate(rate) = mode {
            self.rate = rate;
        }
        self.record_mode(mode);
        Ok(())
    }

    fn change_rate(&mut self, rate: OutputDataRate) -> Result<()> {
        let previous = self.mode;
        let ctrl = self.power_down()?;

        // Restores the run bits that were set before the power down
        self.device.configure(registers::CTRL, with_rate(ctrl, rate))?;
        self.rate = rate;
        self.record_mode(match previous {
            AcquisitionMode::LowRate(_) => AcquisitionMode::LowRate(rate),
            other => other,
        });
        Ok(())
    }

    fn start_conversion(&mut self) -> Result<()> {
        let ctrl = self.device.read_byte(registers::CTRL)?;
        self.device
            .configure(registers::CTRL, ctrl | registers::CTRL_ONE_SHOT)?;
        Ok(())
    }

    fn wait_conversion<D: DelayNs>(&mut self, delay: &mut D, config: &Stts22hConfig) -> Result<()> {
        for attempt in 1..=config.max_attempts {
            let status = self.device.read_byte(registers::STATUS)?;
            if status & registers::STATUS_BUSY == 0 {
                crate::log_trace!("STTS22H: conversion done after {} polls", attempt);
                return Ok(());
            }
            if attempt < config.max_attempts {
                delay.delay_us(config.poll_interval_us);
            }
        }
        crate::log_warn!(
            "STTS22H: conversion timeout at {:#04x} after {} polls",
            self.device.address(),
            config.max_attempts
        );
        Err(DeviceError::ConversionTimeout {
            attempts: config.max_attempts,
        })
    }

    fn read_temperature(&mut self) -> Result<TemperatureSample> {
        let lsb = self.device.read_byte(registers::TEMP_L)?;
        let msb = self.device.read_byte(registers::TEMP_H)?;
        Ok(TemperatureSample::from_le_bytes([lsb, msb]))
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            bus: self.registration.bus(),
            address: self.registration.address(),
            mode: self.mode,
        }
    }
}

pub(super) struct SessionState<'d, B, D> {
    binding: Option<Binding<'d, B>>,
    delay: D,
}

/// One user session
///
/// All register access of a bound session is serialized by the session lock.
/// If a holder panics the device is left in an unknown state: the next call
/// releases the binding and fails with `DeviceError::Poisoned`, and the
/// session may be bound again.
pub struct Stts22hSession<'d, R: BusResolver, D> {
    pub(super) driver: &'d Stts22hDriver<R, D>,
    state: Mutex<SessionState<'d, R::Bus, D>>,
}

impl<'d, R: BusResolver, D: DelayNs + Clone> Stts22hSession<'d, R, D> {
    fn lock(&self) -> Result<MutexGuard<'_, SessionState<'d, R::Bus, D>>> {
        match self.state.lock() {
            Ok(guard) => Ok(guard),
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                self.state.clear_poison();
                if let Some(binding) = guard.binding.take() {
                    let info = binding.info();
                    crate::log_error!(
                        "STTS22H: released {:#04x} on bus {} after a panic",
                        info.address,
                        info.bus
                    );
                }
                Err(DeviceError::Poisoned)
            }
        }
    }

    fn with_binding<T>(
        &self,
        f: impl FnOnce(&mut Binding<'d, R::Bus>, &mut D) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let binding = state.binding.as_mut().ok_or(DeviceError::NotBound)?;
        f(binding, &mut state.delay)
    }

    /// Bind the session to the device described by `request`
    ///
    /// Resolves the bus, admits the pair into the registry and verifies the
    /// chip id. If the chip id check fails, the registry entry is removed
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// - `AlreadyBound` if this session is bound
    /// - `NoSuchBus` if the bus does not exist
    /// - `AddressInUse` if another session holds the pair
    /// - `Transport` or `IdentityMismatch` from the chip id check
    pub fn bind(&self, request: BindRequest) -> Result<()> {
        let mut state = self.lock()?;
        if let Some(binding) = &state.binding {
            let info = binding.info();
            return Err(DeviceError::AlreadyBound {
                bus: info.bus,
                address: info.address,
            });
        }

        let bus = self
            .driver
            .resolver
            .resolve(request.bus)
            .ok_or(DeviceError::NoSuchBus(request.bus))?;
        let registration =
            self.driver
                .registry
                .register(request.bus, request.address, AcquisitionMode::OneShot)?;

        let mut device = I2cDevice::new(bus, request.address);
        if let Err(err) = device.check_identity(registers::WHOAMI, registers::CHIP_ID) {
            crate::log_warn!(
                "STTS22H: no device at {:#04x} on bus {}: {}",
                request.address,
                request.bus,
                err
            );
            drop(registration);
            return Err(err);
        }

        crate::log_info!(
            "STTS22H: bound {:#04x} on bus {}",
            request.address,
            request.bus
        );
        state.binding = Some(Binding {
            device,
            registration,
            mode: AcquisitionMode::OneShot,
            rate: OutputDataRate::default(),
        });
        Ok(())
    }

    /// Release the bound device
    ///
    /// Returns whether a device was bound; unbinding an unbound session is a
    /// no-op. Always releases the pair, even after a panic in another call.
    pub fn unbind(&self) -> Result<bool> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| {
            self.state.clear_poison();
            poisoned.into_inner()
        });
        match state.binding.take() {
            Some(binding) => {
                let info = binding.info();
                crate::log_info!("STTS22H: released {:#04x} on bus {}", info.address, info.bus);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Bound device, if any
    pub fn device(&self) -> Result<Option<DeviceInfo>> {
        Ok(self.lock()?.binding.as_ref().map(Binding::info))
    }

    /// Current acquisition mode
    pub fn mode(&self) -> Result<AcquisitionMode> {
        self.with_binding(|binding, _| Ok(binding.mode))
    }

    /// Rate used by the low-rate mode selector
    pub fn rate(&self) -> Result<OutputDataRate> {
        self.with_binding(|binding, _| Ok(binding.rate))
    }

    /// Switch acquisition mode
    ///
    /// The device is always powered down (run bits cleared, verified) before
    /// the new mode's bits are written. If the final write fails the device is
    /// left powered down and the session records one-shot mode.
    pub fn set_mode(&self, mode: AcquisitionMode) -> Result<()> {
        self.with_binding(|binding, _| {
            binding.transition(mode)?;
            crate::log_debug!("STTS22H: mode {:?}", mode);
            Ok(())
        })
    }

    /// Change the output data rate, keeping the current run mode
    pub fn set_rate(&self, rate: OutputDataRate) -> Result<()> {
        self.with_binding(|binding, _| {
            binding.change_rate(rate)?;
            crate::log_debug!("STTS22H: rate {} Hz", rate.hz());
            Ok(())
        })
    }

    /// Read one temperature sample
    ///
    /// In one-shot mode this starts a conversion and polls the status
    /// register at most `max_attempts` times. In free-run and low-rate modes
    /// the data registers are read directly.
    ///
    /// # Errors
    ///
    /// Returns `ConversionTimeout` if the conversion never completes; no
    /// sample is returned in that case.
    pub fn read_sample(&self) -> Result<TemperatureSample> {
        let config = *self.driver.config();
        self.with_binding(|binding, delay| {
            if binding.mode.needs_trigger() {
                binding.start_conversion()?;
                binding.wait_conversion(delay, &config)?;
            }
            binding.read_temperature()
        })
    }

    /// Resolve a mode selector with the session's rate and apply it
    pub(super) fn set_mode_selector(
        &self,
        selector: i2c_sensors_core::stts22h::ModeSelector,
    ) -> Result<AcquisitionMode> {
        self.with_binding(|binding, _| {
            let mode = selector.with_rate(binding.rate);
            binding.transition(mode)?;
            crate::log_debug!("STTS22H: mode {:?}", mode);
            Ok(mode)
        })
    }
}
