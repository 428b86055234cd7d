//! Device registry
//!
//! Tracks which (bus, address) pairs are bound by a live session and enforces
//! that each pair is bound at most once. The registry is an ordinary value
//! owned by the driver context and borrowed by sessions; there is no global
//! device list.
//!
//! The collection lock covers only the vector of entries. It is never held
//! across bus I/O, and each entry publishes its acquisition mode through an
//! atomic cell, so [`DeviceRegistry::list`] does not wait on any device.

use crate::error::{DeviceError, Result};
use crate::platform::traits::BusId;
use i2c_sensors_core::stts22h::AcquisitionMode;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Snapshot of one registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub bus: BusId,
    pub address: u8,
    pub mode: AcquisitionMode,
}

/// Opaque registration identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

#[derive(Debug)]
struct Entry {
    id: RegistrationId,
    bus: BusId,
    address: u8,
    mode: Arc<AtomicU8>,
}

impl Entry {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            bus: self.bus,
            address: self.address,
            mode: AcquisitionMode::from_bits(self.mode.load(Ordering::SeqCst)),
        }
    }
}

/// Registry of bound devices, in insertion order
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    entries: RwLock<Vec<Entry>>,
    next_id: AtomicU64,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are only pushed or removed whole, so a poisoned lock still
    // guards a consistent vector.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a device at (`bus`, `address`)
    ///
    /// The returned [`Registration`] owns the entry: dropping it removes the
    /// entry again.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::AddressInUse` if the pair is already registered;
    /// the registry is unchanged.
    pub fn register(
        &self,
        bus: BusId,
        address: u8,
        mode: AcquisitionMode,
    ) -> Result<Registration<'_>> {
        let mode_cell = Arc::new(AtomicU8::new(mode.to_bits()));
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::SeqCst));

        let mut entries = self.write();
        if entries.iter().any(|e| e.bus == bus && e.address == address) {
            return Err(DeviceError::AddressInUse { bus, address });
        }
        entries.push(Entry {
            id,
            bus,
            address,
            mode: Arc::clone(&mode_cell),
        });
        drop(entries);

        Ok(Registration {
            registry: self,
            id,
            bus,
            address,
            mode: mode_cell,
        })
    }

    /// Remove the entry with `id`
    ///
    /// Returns whether an entry was removed; unknown ids are a no-op.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut entries = self.write();
        match entries.iter().position(|e| e.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of all entries in insertion order
    pub fn list(&self) -> Vec<DeviceInfo> {
        self.read().iter().map(Entry::info).collect()
    }

    /// Whether (`bus`, `address`) is registered
    pub fn contains(&self, bus: BusId, address: u8) -> bool {
        self.read()
            .iter()
            .any(|e| e.bus == bus && e.address == address)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

/// Ownership of one registry entry
///
/// Dropping the registration unregisters the device.
#[derive(Debug)]
pub struct Registration<'r> {
    registry: &'r DeviceRegistry,
    id: RegistrationId,
    bus: BusId,
    address: u8,
    mode: Arc<AtomicU8>,
}

impl Registration<'_> {
    /// Entry identifier
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Bus of the registered device
    pub fn bus(&self) -> BusId {
        self.bus
    }

    /// Address of the registered device
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Mode currently published for this device
    pub fn mode(&self) -> AcquisitionMode {
        AcquisitionMode::from_bits(self.mode.load(Ordering::SeqCst))
    }

    /// Publish a new mode for `list`
    pub fn publish_mode(&self, mode: AcquisitionMode) {
        self.mode.store(mode.to_bits(), Ordering::SeqCst);
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2c_sensors_core::stts22h::OutputDataRate;

    #[test]
    fn test_register_and_list_in_order() {
        let registry = DeviceRegistry::new();
        let _a = registry.register(2, 0x3C, AcquisitionMode::OneShot).unwrap();
        let _b = registry.register(1, 0x3C, AcquisitionMode::FreeRun).unwrap();
        let _c = registry.register(2, 0x3E, AcquisitionMode::OneShot).unwrap();

        let pairs: Vec<_> = registry.list().iter().map(|d| (d.bus, d.address)).collect();
        assert_eq!(pairs, vec![(2, 0x3C), (1, 0x3C), (2, 0x3E)]);
    }

    #[test]
    fn test_duplicate_pair_is_rejected() {
        let registry = DeviceRegistry::new();
        let _first = registry.register(2, 0x3C, AcquisitionMode::OneShot).unwrap();

        let err = registry
            .register(2, 0x3C, AcquisitionMode::OneShot)
            .unwrap_err();
        assert!(matches!(
            err,
            DeviceError::AddressInUse {
                bus: 2,
                address: 0x3C
            }
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_drop_unregisters() {
        let registry = DeviceRegistry::new();
        let registration = registry.register(2, 0x3C, AcquisitionMode::OneShot).unwrap();
        let id = registration.id();
        drop(registration);

        assert!(registry.is_empty());
        // Unregistering again is a no-op
        assert!(!registry.unregister(id));
        // The pair can be bound again
        assert!(registry.register(2, 0x3C, AcquisitionMode::OneShot).is_ok());
    }

    #[test]
    fn test_published_mode_is_listed() {
        let registry = DeviceRegistry::new();
        let registration = registry.register(2, 0x3C, AcquisitionMode::OneShot).unwrap();
        registration.publish_mode(AcquisitionMode::LowRate(OutputDataRate::Hz100));

        assert_eq!(
            registry.list()[0].mode,
            AcquisitionMode::LowRate(OutputDataRate::Hz100)
        );
        assert_eq!(
            registration.mode(),
            AcquisitionMode::LowRate(OutputDataRate::Hz100)
        );
    }

    #[test]
    fn test_concurrent_admission_admits_one() {
        let registry = DeviceRegistry::new();
        let admitted = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        registry
                            .register(2, 0x3C, AcquisitionMode::OneShot)
                            .map(std::mem::forget)
                            .is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(admitted, 1);
        assert_eq!(registry.len(), 1);
    }
}
