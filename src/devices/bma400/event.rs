//! Events reported by the BMA400 interrupt work

use i2c_sensors_core::bma400::AccelRange;
use i2c_sensors_core::AccelSample;
use nalgebra::Vector3;
use std::fmt;
use std::time::Instant;

/// One serviced interrupt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bma400Event {
    /// New sample in normal mode
    DataReady(AccelSample),
    /// Motion woke the device from low power
    WakeUp(AccelSample),
    /// Single tap detected
    Tap { at: Instant },
}

impl Bma400Event {
    /// Raw sample carried by the event, if any
    pub fn sample(&self) -> Option<AccelSample> {
        match self {
            Bma400Event::DataReady(sample) | Bma400Event::WakeUp(sample) => Some(*sample),
            Bma400Event::Tap { .. } => None,
        }
    }

    /// Acceleration in m/s^2 for samples taken at `range`
    pub fn acceleration_m_s2(&self, range: AccelRange) -> Option<Vector3<f32>> {
        self.sample().map(|s| to_m_s2(s, range))
    }
}

/// Convert raw counts to m/s^2
pub fn to_m_s2(sample: AccelSample, range: AccelRange) -> Vector3<f32> {
    Vector3::new(f32::from(sample.x), f32::from(sample.y), f32::from(sample.z))
        * range.scale_to_m_s2()
}

impl fmt::Display for Bma400Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bma400Event::DataReady(s) => write!(f, "BMA400: X={} Y={} Z={}", s.x, s.y, s.z),
            Bma400Event::WakeUp(s) => {
                write!(f, "BMA400: wake-up X={} Y={} Z={}", s.x, s.y, s.z)
            }
            Bma400Event::Tap { .. } => write!(f, "BMA400: tap"),
        }
    }
}
