//! ISL29125 RGB color light sensor
//!
//! The driver runs the sensor in red-only mode with a threshold interrupt.

use crate::register::ConfigStep;
use core::fmt;

/// Register addresses and bit fields
pub mod registers {
    /// Default I2C address
    pub const DEFAULT_ADDRESS: u8 = 0x44;

    /// Device identification register
    pub const DEVICE_ID: u8 = 0x00;
    /// Expected device id
    pub const CHIP_ID: u8 = 0x7D;

    /// Configuration registers
    pub const CONFIG1: u8 = 0x01;
    pub const CONFIG2: u8 = 0x02;
    pub const CONFIG3: u8 = 0x03;

    /// Interrupt thresholds (low byte, high byte)
    pub const LOW_THRESHOLD_L: u8 = 0x04;
    pub const LOW_THRESHOLD_H: u8 = 0x05;
    pub const HIGH_THRESHOLD_L: u8 = 0x06;
    pub const HIGH_THRESHOLD_H: u8 = 0x07;

    /// Status flags, reading clears the interrupt
    pub const STATUS: u8 = 0x08;

    /// Color data (low byte first)
    pub const GREEN_L: u8 = 0x09;
    pub const RED_L: u8 = 0x0B;
    pub const BLUE_L: u8 = 0x0D;

    // CONFIG1
    pub const MODE_RED_ONLY: u8 = 0x02;
    pub const RANGE_10K_LUX: u8 = 0x08;
    pub const RESOLUTION_16BIT: u8 = 0x00;

    // CONFIG3
    pub const INT_RED: u8 = 0x02;
    pub const PERSIST_8: u8 = 0x0C;
}

/// Power-on settle time before configuration
pub const SETTLE_MS: u32 = 10;

/// Interrupt window on the red channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low: u16,
    pub high: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 0x0000,
            high: 0x0100,
        }
    }
}

impl Thresholds {
    /// Threshold register writes, low byte first
    pub const fn steps(self) -> [ConfigStep; 4] {
        let [low_l, low_h] = self.low.to_le_bytes();
        let [high_l, high_h] = self.high.to_le_bytes();
        [
            ConfigStep::new(registers::LOW_THRESHOLD_L, low_l, "low threshold LSB"),
            ConfigStep::new(registers::LOW_THRESHOLD_H, low_h, "low threshold MSB"),
            ConfigStep::new(registers::HIGH_THRESHOLD_L, high_l, "high threshold LSB"),
            ConfigStep::new(registers::HIGH_THRESHOLD_H, high_h, "high threshold MSB"),
        ]
    }
}

/// Mode, range and interrupt configuration
pub const CONFIG_STEPS: [ConfigStep; 2] = [
    ConfigStep::new(
        registers::CONFIG1,
        registers::MODE_RED_ONLY | registers::RANGE_10K_LUX | registers::RESOLUTION_16BIT,
        "mode",
    ),
    ConfigStep::new(
        registers::CONFIG3,
        registers::INT_RED | registers::PERSIST_8,
        "interrupt",
    ),
];

/// One red channel reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSample {
    pub red: u16,
}

impl ColorSample {
    /// Decode the (low, high) red data pair
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self {
            red: u16::from_le_bytes(bytes),
        }
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ISL29125: red {}", self.red)
    }
}

#[cfg(test)]
mod tests {
    use super::registers::*;
    use super::*;

    #[test]
    fn test_config_values() {
        assert_eq!(CONFIG_STEPS[0].value, 0x0A);
        assert_eq!(CONFIG_STEPS[1].value, 0x0E);
    }

    #[test]
    fn test_default_threshold_steps() {
        let steps = Thresholds::default().steps();
        let values: [(u8, u8); 4] = [
            (steps[0].register, steps[0].value),
            (steps[1].register, steps[1].value),
            (steps[2].register, steps[2].value),
            (steps[3].register, steps[3].value),
        ];
        assert_eq!(
            values,
            [
                (LOW_THRESHOLD_L, 0x00),
                (LOW_THRESHOLD_H, 0x00),
                (HIGH_THRESHOLD_L, 0x00),
                (HIGH_THRESHOLD_H, 0x01),
            ]
        );
    }

    #[test]
    fn test_color_sample() {
        assert_eq!(ColorSample::from_le_bytes([0x34, 0x12]).red, 0x1234);
    }
}
