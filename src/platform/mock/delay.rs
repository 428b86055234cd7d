//! Mock delay for testing

use embedded_hal::delay::DelayNs;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Delay provider that records requested delays and returns immediately
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Arc<AtomicU64>,
    calls: Arc<AtomicUsize>,
}

impl MockDelay {
    /// Create a delay with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested delays
    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_ns.load(Ordering::SeqCst))
    }

    /// Number of delay requests
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(u64::from(ns), Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
