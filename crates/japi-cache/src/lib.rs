//! Canonical resource cache keyed by `(type, id)`.
//!
//! The cache holds at most one [`ResourceRecord`] per `(type, id)` and
//! guarantees that a record's identity never changes for the lifetime of its
//! membership: later writes merge into the existing record behind its lock,
//! they never replace the `Arc`. Callers holding an earlier [`SharedRecord`]
//! therefore observe every subsequent merge.
//!
//! Removal drops the mapping only; holders of the removed `Arc` keep a
//! point-in-time snapshot that is no longer kept in sync.
//!
//! # Example
//!
//! ```ignore
//! use japi_cache::ResourceCache;
//!
//! let cache = ResourceCache::new();
//! let first = cache.write_full("dog", "17", record)?;
//! let again = cache.write_full("dog", "17", refetched)?;
//! assert!(Arc::ptr_eq(&first, &again));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use parking_lot::RwLock;
use serde_json::Value;

use japi_types::ResourceRecord;

/// A cache-owned record. Identity is `Arc` identity; mutation goes through
/// the inner lock so every holder observes it.
pub type SharedRecord = Arc<RwLock<ResourceRecord>>;

/// In-memory cache: type -> id -> shared record.
///
/// Thread-safe via internal RwLock. Mutations are synchronous and atomic;
/// no operation suspends while holding the lock.
#[derive(Debug, Default)]
pub struct ResourceCache {
    records: RwLock<HashMap<String, HashMap<String, SharedRecord>>>,
}

impl ResourceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Read Operations ====================

    /// Look up a record by type and id.
    ///
    /// If `id` is `None` and exactly one record exists under `type`, that
    /// record is returned (singleton convenience); otherwise `None`.
    pub fn read(&self, resource_type: &str, id: Option<&str>) -> Option<SharedRecord> {
        let records = self.records.read();
        let by_id = records.get(resource_type)?;

        match id {
            Some(id) => by_id.get(id).cloned(),
            None => {
                if by_id.len() == 1 {
                    by_id.values().next().cloned()
                } else {
                    None
                }
            }
        }
    }

    /// Check whether a record exists at `(type, id)`.
    pub fn has(&self, resource_type: &str, id: &str) -> bool {
        self.read(resource_type, Some(id)).is_some()
    }

    // ==================== Write Operations ====================

    /// Insert or merge a full record at `(type, id)`.
    ///
    /// On first write the record is inserted directly. On subsequent writes
    /// the incoming fields are merged into the existing record field by field
    /// (top-level overwrite, nested structures replaced wholesale), preserving
    /// the existing `Arc` identity.
    pub fn write_full(
        &self,
        resource_type: &str,
        id: &str,
        record: ResourceRecord,
    ) -> Result<SharedRecord> {
        if resource_type.is_empty() {
            bail!("no resource type provided in cache write");
        }

        let mut records = self.records.write();
        let by_id = records.entry(resource_type.to_string()).or_default();

        match by_id.get(id) {
            Some(existing) => {
                existing.write().merge_from(record);
                Ok(existing.clone())
            }
            None => {
                let shared: SharedRecord = Arc::new(RwLock::new(record));
                by_id.insert(id.to_string(), shared.clone());
                Ok(shared)
            }
        }
    }

    /// Remove the mapping at `(type, id)`, returning the record if present.
    ///
    /// Already-handed-out references stay valid as unsynchronized snapshots.
    pub fn remove(&self, resource_type: &str, id: &str) -> Option<SharedRecord> {
        self.records.write().get_mut(resource_type)?.remove(id)
    }

    /// Write a single attribute value into an existing record, in place.
    ///
    /// Requires a record at `(type, id)`; errors otherwise and applies
    /// nothing.
    pub fn write_field(
        &self,
        resource_type: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<()> {
        if resource_type.is_empty() || field.is_empty() {
            bail!("no type, key, or value provided in reactive update");
        }

        let record = self
            .read(resource_type, Some(id))
            .ok_or_else(|| anyhow!("no cached record at {resource_type}/{id}"))?;

        record.write().attributes.insert(field.to_string(), value);
        Ok(())
    }

    // ==================== Cache Statistics ====================

    /// Total number of cached records across all types.
    pub fn record_count(&self) -> usize {
        self.records.read().values().map(HashMap::len).sum()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Clear all cached records.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}
