//! STTS22H digital temperature sensor
//!
//! Register map, acquisition modes and the typed control requests accepted
//! by the driver. Mode and rate transitions are computed here as pure
//! functions of the current CTRL register value.

use crate::error::SelectorError;
use crate::payload::{io, iow_int};

/// Register addresses and bit fields
pub mod registers {
    /// Identification register
    pub const WHOAMI: u8 = 0x01;
    /// Expected WHOAMI value
    pub const CHIP_ID: u8 = 0xA0;

    /// Control register
    pub const CTRL: u8 = 0x04;
    /// Status register
    pub const STATUS: u8 = 0x05;
    /// Temperature low byte
    pub const TEMP_L: u8 = 0x06;
    /// Temperature high byte
    pub const TEMP_H: u8 = 0x07;

    /// CTRL: start low output data rate mode (1 Hz)
    pub const CTRL_LOW_ODR_START: u8 = 0x80;
    /// CTRL: enable free-run mode
    pub const CTRL_FREERUN: u8 = 0x04;
    /// CTRL: trigger a single conversion (self-clearing)
    pub const CTRL_ONE_SHOT: u8 = 0x01;
    /// CTRL: output data rate field
    pub const CTRL_ODR_MASK: u8 = 0x30;
    /// CTRL bits that keep the device converting
    pub const CTRL_RUN_MASK: u8 = CTRL_LOW_ODR_START | CTRL_FREERUN;

    /// STATUS: conversion in progress
    pub const STATUS_BUSY: u8 = 0x01;

    /// ODR field values
    pub const ODR_25HZ: u8 = 0x00;
    pub const ODR_50HZ: u8 = 0x10;
    pub const ODR_100HZ: u8 = 0x20;
    pub const ODR_200HZ: u8 = 0x30;
}

/// Default bound on one-shot completion polls
pub const MAX_ATTEMPTS: u32 = 100;

/// Output data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputDataRate {
    /// 25 Hz (power-on default)
    #[default]
    Hz25,
    /// 50 Hz
    Hz50,
    /// 100 Hz
    Hz100,
    /// 200 Hz
    Hz200,
}

impl OutputDataRate {
    /// Get the CTRL field value for this rate
    pub const fn register_value(self) -> u8 {
        match self {
            OutputDataRate::Hz25 => registers::ODR_25HZ,
            OutputDataRate::Hz50 => registers::ODR_50HZ,
            OutputDataRate::Hz100 => registers::ODR_100HZ,
            OutputDataRate::Hz200 => registers::ODR_200HZ,
        }
    }

    /// Rate in Hz
    pub const fn hz(self) -> u32 {
        match self {
            OutputDataRate::Hz25 => 25,
            OutputDataRate::Hz50 => 50,
            OutputDataRate::Hz100 => 100,
            OutputDataRate::Hz200 => 200,
        }
    }

    const fn index(self) -> u8 {
        match self {
            OutputDataRate::Hz25 => 0,
            OutputDataRate::Hz50 => 1,
            OutputDataRate::Hz100 => 2,
            OutputDataRate::Hz200 => 3,
        }
    }
}

impl TryFrom<i32> for OutputDataRate {
    type Error = SelectorError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OutputDataRate::Hz25),
            1 => Ok(OutputDataRate::Hz50),
            2 => Ok(OutputDataRate::Hz100),
            3 => Ok(OutputDataRate::Hz200),
            _ => Err(SelectorError::Rate(value)),
        }
    }
}

/// Acquisition mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    /// Each read triggers and polls one conversion (power-on default)
    #[default]
    OneShot,
    /// Continuous conversion at the configured rate
    FreeRun,
    /// Low output data rate mode with the given rate field
    LowRate(OutputDataRate),
}

impl AcquisitionMode {
    /// CTRL with the run bits cleared: the idle baseline every transition
    /// passes through
    pub const fn idle_baseline(ctrl: u8) -> u8 {
        ctrl & !registers::CTRL_RUN_MASK
    }

    /// CTRL value that selects this mode, starting from the idle baseline
    pub const fn apply(self, baseline: u8) -> u8 {
        match self {
            AcquisitionMode::OneShot => baseline,
            AcquisitionMode::FreeRun => baseline | registers::CTRL_FREERUN,
            AcquisitionMode::LowRate(rate) => {
                (baseline & !registers::CTRL_ODR_MASK)
                    | registers::CTRL_LOW_ODR_START
                    | rate.register_value()
            }
        }
    }

    /// Whether reads must trigger and poll a conversion
    pub const fn needs_trigger(self) -> bool {
        matches!(self, AcquisitionMode::OneShot)
    }

    /// Pack into one byte so the mode can be published lock-free
    pub const fn to_bits(self) -> u8 {
        match self {
            AcquisitionMode::OneShot => 0,
            AcquisitionMode::FreeRun => 1,
            AcquisitionMode::LowRate(rate) => 2 | (rate.index() << 2),
        }
    }

    /// Inverse of [`to_bits`](Self::to_bits); unknown encodings read as one-shot
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => AcquisitionMode::FreeRun,
            2 => AcquisitionMode::LowRate(match bits >> 2 {
                1 => OutputDataRate::Hz50,
                2 => OutputDataRate::Hz100,
                3 => OutputDataRate::Hz200,
                _ => OutputDataRate::Hz25,
            }),
            _ => AcquisitionMode::OneShot,
        }
    }
}

/// CTRL value that changes the rate field and restores the run bits of `ctrl`
pub const fn with_rate(ctrl: u8, rate: OutputDataRate) -> u8 {
    (ctrl & !registers::CTRL_ODR_MASK) | rate.register_value()
}

/// Mode selector as carried by the control interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelector {
    OneShot,
    FreeRun,
    LowRate,
}

impl ModeSelector {
    /// Resolve to a mode, using `rate` for the low-rate variant
    pub const fn with_rate(self, rate: OutputDataRate) -> AcquisitionMode {
        match self {
            ModeSelector::OneShot => AcquisitionMode::OneShot,
            ModeSelector::FreeRun => AcquisitionMode::FreeRun,
            ModeSelector::LowRate => AcquisitionMode::LowRate(rate),
        }
    }
}

impl TryFrom<i32> for ModeSelector {
    type Error = SelectorError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ModeSelector::OneShot),
            1 => Ok(ModeSelector::FreeRun),
            2 => Ok(ModeSelector::LowRate),
            _ => Err(SelectorError::Mode(value)),
        }
    }
}

/// ioctl type byte
pub const IOCTL_TYPE: u8 = b'S';
/// List bound devices
pub const CMD_LIST: u32 = io(IOCTL_TYPE, 1);
/// Change acquisition mode
pub const CMD_SET_MODE: u32 = iow_int(IOCTL_TYPE, 2);
/// Change output data rate
pub const CMD_SET_RATE: u32 = iow_int(IOCTL_TYPE, 3);

/// Typed control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    ListDevices,
    SetMode(ModeSelector),
    SetRate(OutputDataRate),
}

impl ControlRequest {
    /// Decode a command number and its integer argument
    pub fn decode(command: u32, arg: i32) -> Result<Self, SelectorError> {
        match command {
            CMD_LIST => Ok(ControlRequest::ListDevices),
            CMD_SET_MODE => ModeSelector::try_from(arg).map(ControlRequest::SetMode),
            CMD_SET_RATE => OutputDataRate::try_from(arg).map(ControlRequest::SetRate),
            other => Err(SelectorError::Command(other)),
        }
    }
}
