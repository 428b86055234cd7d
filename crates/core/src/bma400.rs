//! BMA400 low-power accelerometer
//!
//! Register map, configuration encodings and the per-mode configuration
//! tables applied at probe time.

use crate::error::SelectorError;
use crate::register::ConfigStep;

/// Register addresses and bit fields
pub mod registers {
    /// Default I2C address (SDO low)
    pub const DEFAULT_ADDRESS: u8 = 0x14;

    /// Chip identification register
    pub const CHIPID: u8 = 0x00;
    /// Expected chip id
    pub const CHIP_ID: u8 = 0x90;

    /// First acceleration data register (X LSB), start of the XYZ burst
    pub const ACC_X_LSB: u8 = 0x04;

    /// Interrupt status registers
    pub const INT_STAT0: u8 = 0x0E;
    pub const INT_STAT1: u8 = 0x0F;
    pub const INT_STAT2: u8 = 0x10;

    /// Accelerometer configuration
    pub const ACC_CONFIG0: u8 = 0x19;
    pub const ACC_CONFIG1: u8 = 0x1A;
    pub const ACC_CONFIG2: u8 = 0x1B;

    /// Interrupt configuration
    pub const INT_CONFIG0: u8 = 0x1F;
    pub const INT_CONFIG1: u8 = 0x20;
    pub const INT1_MAP: u8 = 0x21;
    pub const INT12_MAP: u8 = 0x23;

    /// Auto wake-up configuration
    pub const AUTO_WAKEUP1: u8 = 0x2D;
    pub const WKUP_INT_CONFIG0: u8 = 0x2F;
    pub const WKUP_INT_CONFIG1: u8 = 0x30;

    /// Tap detection configuration
    pub const TAP_CONFIG: u8 = 0x57;

    // ACC_CONFIG0 power modes
    pub const POWER_SLEEP: u8 = 0x00;
    pub const POWER_LOW: u8 = 0x01;
    pub const POWER_NORMAL: u8 = 0x02;

    // ACC_CONFIG2 data source
    pub const DATA_SRC_FILT2: u8 = 0x04;

    // INT_CONFIG0
    pub const INT_DRDY_EN: u8 = 0x80;

    // INT_CONFIG1
    pub const INT_LATCH_EN: u8 = 0x80;
    pub const INT_S_TAP_EN: u8 = 0x04;

    // INT1_MAP
    pub const INT1_MAP_WKUP: u8 = 0x01;
    pub const INT1_MAP_DRDY: u8 = 0x80;

    // INT12_MAP
    pub const INT12_MAP_TAP_INT1: u8 = 0x04;

    // AUTO_WAKEUP1
    pub const AUTO_WAKEUP_WKUP_INT: u8 = 0x02;

    // WKUP_INT_CONFIG0
    pub const WKUP_REFU_ONETIME: u8 = 0x01;
    pub const WKUP_NUM_SAMPLES_1: u8 = 0x00;
    pub const WKUP_X_EN: u8 = 0x20;
    pub const WKUP_Y_EN: u8 = 0x40;
    pub const WKUP_Z_EN: u8 = 0x80;

    /// Wake-up threshold (WKUP_INT_CONFIG1)
    pub const WKUP_THRESHOLD: u8 = 0x02;

    // TAP_CONFIG
    pub const TAP_SENSITIVITY_1: u8 = 0x01;

    /// ACC_CONFIG1 range field values
    pub const RANGE_2G: u8 = 0x00;
    pub const RANGE_4G: u8 = 0x40;
    pub const RANGE_8G: u8 = 0x80;
    pub const RANGE_16G: u8 = 0xC0;

    /// ACC_CONFIG1 oversampling field values
    pub const OSR_0: u8 = 0x00;
    pub const OSR_1: u8 = 0x10;
    pub const OSR_2: u8 = 0x20;
    pub const OSR_3: u8 = 0x30;

    /// ACC_CONFIG1 output data rate field values
    pub const ODR_12_5HZ: u8 = 0x05;
    pub const ODR_25HZ: u8 = 0x06;
    pub const ODR_50HZ: u8 = 0x07;
    pub const ODR_100HZ: u8 = 0x08;
    pub const ODR_200HZ: u8 = 0x09;
    pub const ODR_400HZ: u8 = 0x0A;
    pub const ODR_800HZ: u8 = 0x0B;

    /// Sensitivity (LSB per g) of the 12-bit output
    pub const SENSITIVITY_2G: f32 = 1024.0;
    pub const SENSITIVITY_4G: f32 = 512.0;
    pub const SENSITIVITY_8G: f32 = 256.0;
    pub const SENSITIVITY_16G: f32 = 128.0;

    /// Standard gravity (m/s^2)
    pub const GRAVITY: f32 = 9.806_65;
}

/// Settle time after a power mode change
pub const POWER_SETTLE_MS: u32 = 2;

/// Number of interrupt status registers cleared at probe
pub const INT_STAT_LEN: usize = 3;

/// Accelerometer full scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelRange {
    G2,
    /// Used by every operating mode
    #[default]
    G4,
    G8,
    G16,
}

impl AccelRange {
    /// Get the register value for this range
    pub const fn register_value(self) -> u8 {
        match self {
            AccelRange::G2 => registers::RANGE_2G,
            AccelRange::G4 => registers::RANGE_4G,
            AccelRange::G8 => registers::RANGE_8G,
            AccelRange::G16 => registers::RANGE_16G,
        }
    }

    /// Get the sensitivity (LSB per g) for this range
    pub fn sensitivity(self) -> f32 {
        match self {
            AccelRange::G2 => registers::SENSITIVITY_2G,
            AccelRange::G4 => registers::SENSITIVITY_4G,
            AccelRange::G8 => registers::SENSITIVITY_8G,
            AccelRange::G16 => registers::SENSITIVITY_16G,
        }
    }

    /// Get scale factor to convert raw counts to m/s^2
    pub fn scale_to_m_s2(self) -> f32 {
        registers::GRAVITY / self.sensitivity()
    }
}

/// Output data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz12_5,
    Hz25,
    Hz50,
    Hz100,
    Hz200,
    Hz400,
    Hz800,
}

impl SampleRate {
    /// Get the register value for this rate
    pub const fn register_value(self) -> u8 {
        match self {
            SampleRate::Hz12_5 => registers::ODR_12_5HZ,
            SampleRate::Hz25 => registers::ODR_25HZ,
            SampleRate::Hz50 => registers::ODR_50HZ,
            SampleRate::Hz100 => registers::ODR_100HZ,
            SampleRate::Hz200 => registers::ODR_200HZ,
            SampleRate::Hz400 => registers::ODR_400HZ,
            SampleRate::Hz800 => registers::ODR_800HZ,
        }
    }
}

/// Oversampling ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversampling {
    Osr0,
    Osr1,
    Osr2,
    Osr3,
}

impl Oversampling {
    /// Get the register value for this ratio
    pub const fn register_value(self) -> u8 {
        match self {
            Oversampling::Osr0 => registers::OSR_0,
            Oversampling::Osr1 => registers::OSR_1,
            Oversampling::Osr2 => registers::OSR_2,
            Oversampling::Osr3 => registers::OSR_3,
        }
    }
}

/// ACC_CONFIG1 value for a rate, oversampling and range
pub const fn acc_config1(rate: SampleRate, osr: Oversampling, range: AccelRange) -> u8 {
    rate.register_value() | osr.register_value() | range.register_value()
}

/// Operating mode selected at probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bma400Mode {
    /// Low-power mode, interrupt on wake-up motion
    LowPower,
    /// Normal mode, interrupt on every new sample
    #[default]
    Normal,
    /// Normal mode, interrupt on single tap
    Tap,
}

const LOW_POWER_STEPS: &[ConfigStep] = &[
    ConfigStep::new(
        registers::ACC_CONFIG1,
        acc_config1(SampleRate::Hz25, Oversampling::Osr0, AccelRange::G4),
        "sample rate",
    ),
    ConfigStep::new(registers::INT1_MAP, registers::INT1_MAP_WKUP, "INT1 wake-up map"),
    ConfigStep::new(
        registers::AUTO_WAKEUP1,
        registers::AUTO_WAKEUP_WKUP_INT,
        "auto wake-up",
    ),
    ConfigStep::new(
        registers::WKUP_INT_CONFIG0,
        registers::WKUP_REFU_ONETIME
            | registers::WKUP_NUM_SAMPLES_1
            | registers::WKUP_X_EN
            | registers::WKUP_Y_EN
            | registers::WKUP_Z_EN,
        "wake-up axes",
    ),
    ConfigStep::new(
        registers::WKUP_INT_CONFIG1,
        registers::WKUP_THRESHOLD,
        "wake-up threshold",
    ),
];

const NORMAL_STEPS: &[ConfigStep] = &[
    ConfigStep::new(
        registers::ACC_CONFIG1,
        acc_config1(SampleRate::Hz200, Oversampling::Osr1, AccelRange::G4),
        "sample rate",
    ),
    ConfigStep::new(
        registers::ACC_CONFIG2,
        registers::DATA_SRC_FILT2,
        "data source",
    ),
    ConfigStep::new(registers::INT_CONFIG0, registers::INT_DRDY_EN, "data ready interrupt"),
    ConfigStep::new(registers::INT_CONFIG1, registers::INT_LATCH_EN, "interrupt latch"),
    ConfigStep::new(registers::INT1_MAP, registers::INT1_MAP_DRDY, "INT1 data ready map"),
];

const TAP_STEPS: &[ConfigStep] = &[
    ConfigStep::new(
        registers::ACC_CONFIG1,
        acc_config1(SampleRate::Hz200, Oversampling::Osr1, AccelRange::G4),
        "sample rate",
    ),
    ConfigStep::new(registers::INT_CONFIG1, registers::INT_S_TAP_EN, "single tap interrupt"),
    ConfigStep::new(
        registers::INT12_MAP,
        registers::INT12_MAP_TAP_INT1,
        "INT1 tap map",
    ),
    ConfigStep::new(
        registers::TAP_CONFIG,
        registers::TAP_SENSITIVITY_1,
        "tap sensitivity",
    ),
];

impl Bma400Mode {
    /// ACC_CONFIG0 power mode for this operating mode
    pub const fn power_mode(self) -> u8 {
        match self {
            Bma400Mode::LowPower => registers::POWER_LOW,
            Bma400Mode::Normal | Bma400Mode::Tap => registers::POWER_NORMAL,
        }
    }

    /// Power mode write, applied before the settle delay
    pub const fn power_step(self) -> ConfigStep {
        ConfigStep::new(registers::ACC_CONFIG0, self.power_mode(), "power mode")
    }

    /// Writes applied after the power mode has settled
    pub const fn interrupt_steps(self) -> &'static [ConfigStep] {
        match self {
            Bma400Mode::LowPower => LOW_POWER_STEPS,
            Bma400Mode::Normal => NORMAL_STEPS,
            Bma400Mode::Tap => TAP_STEPS,
        }
    }

    /// Full scale range programmed by this mode
    pub const fn range(self) -> AccelRange {
        AccelRange::G4
    }
}

impl TryFrom<i32> for Bma400Mode {
    type Error = SelectorError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bma400Mode::LowPower),
            1 => Ok(Bma400Mode::Normal),
            2 => Ok(Bma400Mode::Tap),
            _ => Err(SelectorError::DriverMode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::registers::*;
    use super::*;

    #[test]
    fn test_acc_config1_values() {
        assert_eq!(
            acc_config1(SampleRate::Hz25, Oversampling::Osr0, AccelRange::G4),
            0x46
        );
        assert_eq!(
            acc_config1(SampleRate::Hz200, Oversampling::Osr1, AccelRange::G4),
            0x59
        );
    }

    #[test]
    fn test_power_steps() {
        assert_eq!(Bma400Mode::LowPower.power_step().value, POWER_LOW);
        assert_eq!(Bma400Mode::Normal.power_step().value, POWER_NORMAL);
        assert_eq!(Bma400Mode::Tap.power_step().register, ACC_CONFIG0);
    }

    #[test]
    fn test_low_power_wakeup_axes() {
        let steps = Bma400Mode::LowPower.interrupt_steps();
        let axes = steps
            .iter()
            .find(|s| s.register == WKUP_INT_CONFIG0)
            .unwrap();
        assert_eq!(axes.value, 0xE1);
    }

    #[test]
    fn test_normal_maps_data_ready() {
        let steps = Bma400Mode::Normal.interrupt_steps();
        assert!(steps
            .iter()
            .any(|s| s.register == INT1_MAP && s.value == INT1_MAP_DRDY));
        assert!(steps
            .iter()
            .any(|s| s.register == INT_CONFIG1 && s.value == INT_LATCH_EN));
    }

    #[test]
    fn test_mode_selector() {
        assert_eq!(Bma400Mode::try_from(0), Ok(Bma400Mode::LowPower));
        assert_eq!(Bma400Mode::try_from(2), Ok(Bma400Mode::Tap));
        assert_eq!(
            Bma400Mode::try_from(7),
            Err(SelectorError::DriverMode(7))
        );
    }

    #[test]
    fn test_scale_to_m_s2() {
        let scale = AccelRange::G4.scale_to_m_s2();
        assert!((scale * 512.0 - GRAVITY).abs() < 1e-4);
    }
}
