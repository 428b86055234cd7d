//! Shared bus handles and the bus table resolver

use crate::platform::traits::{BusId, BusResolver};
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle to one bus
///
/// Every clone drives the same underlying bus; each `transaction` holds the
/// bus lock for its whole duration.
#[derive(Debug)]
pub struct SharedI2c<B> {
    bus: Arc<Mutex<B>>,
}

impl<B> SharedI2c<B> {
    /// Wrap a bus
    pub fn new(bus: B) -> Self {
        Self {
            bus: Arc::new(Mutex::new(bus)),
        }
    }
}

impl<B> Clone for SharedI2c<B> {
    fn clone(&self) -> Self {
        Self {
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<B: ErrorType> ErrorType for SharedI2c<B> {
    type Error = B::Error;
}

impl<B: I2c> I2c for SharedI2c<B> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // A panic mid-transaction leaves no Rust-side state to repair.
        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        bus.transaction(address, operations)
    }
}

/// Bus resolver backed by a fixed table of cloneable bus handles
#[derive(Debug)]
pub struct BusTable<B> {
    buses: BTreeMap<BusId, B>,
}

impl<B> Default for BusTable<B> {
    fn default() -> Self {
        Self {
            buses: BTreeMap::new(),
        }
    }
}

impl<B> BusTable<B> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace bus `id`
    pub fn insert(&mut self, id: BusId, bus: B) {
        self.buses.insert(id, bus);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_bus(mut self, id: BusId, bus: B) -> Self {
        self.insert(id, bus);
        self
    }
}

impl<B> BusResolver for BusTable<B>
where
    B: I2c + Clone + Send + Sync,
{
    type Bus = B;

    fn resolve(&self, bus: BusId) -> Option<B> {
        self.buses.get(&bus).cloned()
    }
}
