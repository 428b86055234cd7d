//! Bus resolver trait
//!
//! Maps the numeric bus index carried by a bind request to a bus handle.

use embedded_hal::i2c::I2c;

/// Numeric bus identifier (e.g. `2` for `/dev/i2c-2`)
pub type BusId = u8;

/// Bus resolver trait
///
/// Implementations own the host's buses and hand out handles to them.
/// Handles for the same bus may be live at the same time; the bus handle type
/// is responsible for making each transaction atomic.
pub trait BusResolver: Sync {
    /// Bus handle type
    type Bus: I2c + Send;

    /// Get a handle to bus `bus`, or `None` if no such bus exists
    fn resolve(&self, bus: BusId) -> Option<Self::Bus>;
}
