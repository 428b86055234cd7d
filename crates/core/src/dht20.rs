//! DHT20 humidity and temperature sensor
//!
//! The DHT20 is command based: it has no register file. A measurement is
//! triggered with a 3-byte command and read back as a status byte followed
//! by two packed 20-bit values.

use core::fmt;

/// Default I2C address
pub const DEFAULT_ADDRESS: u8 = 0x38;

/// Status query sent after power-on
pub const CMD_STATUS: u8 = 0x71;

/// Trigger measurement command
pub const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

/// Status bits that must be set once the sensor is calibrated
pub const STATUS_CALIBRATED_MASK: u8 = 0x18;

/// Status bit set while a measurement is in progress
pub const STATUS_BUSY: u8 = 0x80;

/// Measurement frame length: status + 5 data bytes
pub const FRAME_LEN: usize = 6;

/// Data bytes returned to callers (frame without status)
pub const DATA_LEN: usize = FRAME_LEN - 1;

/// Power-on wait before the first command
pub const POWER_ON_MS: u32 = 100;

/// Wait after the status query
pub const INIT_SETTLE_MS: u32 = 10;

/// Measurement time after the trigger command
pub const MEASURE_MS: u32 = 80;

/// Polling period of the periodic acquisition path
pub const POLL_PERIOD_MS: u64 = 200;

const FULL_SCALE: f32 = (1u32 << 20) as f32;

/// Whether a status byte reports no bits beyond the calibration mask
pub const fn status_ok(status: u8) -> bool {
    (status | STATUS_CALIBRATED_MASK) == STATUS_CALIBRATED_MASK
}

/// Raw 20-bit humidity and temperature readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub humidity_raw: u32,
    pub temperature_raw: u32,
}

impl Measurement {
    /// Unpack the five data bytes that follow the status byte
    pub const fn from_data(data: &[u8; DATA_LEN]) -> Self {
        let humidity_raw =
            ((data[0] as u32) << 12) | ((data[1] as u32) << 4) | ((data[2] as u32) >> 4);
        let temperature_raw =
            (((data[2] & 0x0F) as u32) << 16) | ((data[3] as u32) << 8) | data[4] as u32;
        Self {
            humidity_raw,
            temperature_raw,
        }
    }

    /// Relative humidity in percent
    pub fn relative_humidity(self) -> f32 {
        self.humidity_raw as f32 / FULL_SCALE * 100.0
    }

    /// Temperature in degrees Celsius
    pub fn celsius(self) -> f32 {
        self.temperature_raw as f32 / FULL_SCALE * 200.0 - 50.0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DHT20: humidity {:.1} %RH, temperature {:.1} C",
            self.relative_humidity(),
            self.celsius()
        )
    }
}
