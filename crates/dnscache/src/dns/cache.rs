//! The hostname to address map.

use std::collections::HashMap;
use std::net::IpAddr;

use parking_lot::RwLock;

use crate::logging::targets;

/// Concurrent map from hostname to its last successfully resolved addresses.
///
/// Hostnames are compared verbatim. Each hostname holds at most one value,
/// and a store always replaces the previous value as a whole. The lock is
/// only ever held for the duration of a map operation, never across a
/// resolution.
#[derive(Debug, Default)]
pub(crate) struct CacheStore {
    entries: RwLock<HashMap<String, Vec<IpAddr>>>,
}

impl CacheStore {
    /// Create an empty store with room for `capacity` hostnames.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Get the cached addresses for `host`.
    pub(crate) fn get(&self, host: &str) -> Option<Vec<IpAddr>> {
        self.entries.read().get(host).cloned()
    }

    /// Replace the cached addresses for `host`.
    pub(crate) fn insert(&self, host: &str, addrs: Vec<IpAddr>) {
        tracing::trace!(target: targets::CACHE, host, count = addrs.len(), "storing addresses");
        let mut entries = self.entries.write();
        match entries.get_mut(host) {
            Some(existing) => *existing = addrs,
            None => {
                entries.insert(host.to_string(), addrs);
            }
        }
    }

    /// Snapshot of the hostnames cached right now.
    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
