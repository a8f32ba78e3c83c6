use std::collections::HashMap;

use parking_lot::RwLock;

/// Resolved addresses by offset name, kept for the lifetime of a resolver.
///
/// Safe to share between threads. When two resolutions of the same name
/// race, the first insert wins and later inserts return the stored value.
#[derive(Debug, Default)]
pub struct ProcessAddressCache {
    addresses: RwLock<HashMap<String, u64>>,
}

impl ProcessAddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.addresses.read().get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.addresses.read().contains_key(name)
    }

    /// Insert unless `name` is already cached; returns the value now cached.
    pub fn insert(&self, name: &str, address: u64) -> u64 {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        *self
            .addresses
            .write()
            .entry(name.to_string())
            .or_insert(address)
    }

    pub fn clear(&self) {
        self.addresses.write().clear();
    }

    pub fn len(&self) -> usize {
        self.addresses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.read().is_empty()
    }
}
