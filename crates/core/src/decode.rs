//! Sample decoding
//!
//! Sensors in this family report little-endian register pairs. Temperature
//! sensors use a full 16-bit two's-complement value in hundredths of a degree;
//! the accelerometer packs a 12-bit two's-complement count per axis.

/// Full scale of a 12-bit two's-complement field
const TWELVE_BIT_RANGE: i16 = 4096;

/// Largest positive value of a 12-bit two's-complement field
const TWELVE_BIT_MAX: i16 = 2047;

/// Raw temperature sample in hundredths of a degree Celsius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemperatureSample {
    raw: i16,
}

impl TemperatureSample {
    /// Decode from the (low, high) data register pair
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self {
            raw: i16::from_le_bytes(bytes),
        }
    }

    /// Raw register value
    pub const fn raw(self) -> i16 {
        self.raw
    }

    /// Temperature in hundredths of a degree Celsius
    pub const fn centi_celsius(self) -> i32 {
        self.raw as i32
    }

    /// Temperature in degrees Celsius
    pub fn celsius(self) -> f32 {
        f32::from(self.raw) / 100.0
    }

    /// User-facing 2-byte little-endian payload
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.raw.to_le_bytes()
    }
}

/// Decode one 12-bit two's-complement axis from its (lsb, msb) registers
///
/// Only the low nibble of `msb` carries data.
pub const fn decode_accel_axis(lsb: u8, msb: u8) -> i16 {
    let raw = (((msb & 0x0F) as i16) << 8) | lsb as i16;
    if raw > TWELVE_BIT_MAX {
        raw - TWELVE_BIT_RANGE
    } else {
        raw
    }
}

/// Three-axis acceleration in raw counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AccelSample {
    /// Length of the X/Y/Z data burst
    pub const BURST_LEN: usize = 6;

    /// Decode an X/Y/Z burst of (lsb, msb) pairs
    pub const fn from_burst(data: &[u8; Self::BURST_LEN]) -> Self {
        Self {
            x: decode_accel_axis(data[0], data[1]),
            y: decode_accel_axis(data[2], data[3]),
            z: decode_accel_axis(data[4], data[5]),
        }
    }
}
