//! Register configuration steps
//!
//! Drivers describe their probe-time configuration as tables of
//! [`ConfigStep`]s. The std crate applies each one with a verified write and
//! uses `what` to name the step in logs when it fails.

/// One register write that must be observed to stick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigStep {
    /// Register address
    pub register: u8,
    /// Value to write and expect on read-back
    pub value: u8,
    /// Short human-readable name of the setting
    pub what: &'static str,
}

impl ConfigStep {
    /// Create a configuration step
    pub const fn new(register: u8, value: u8, what: &'static str) -> Self {
        Self {
            register,
            value,
            what,
        }
    }
}
