//! Local snapshot cache of store records.
//!
//! The cache is a shared, concurrently-read replica of the store,
//! eventually consistent with it. Readers get a private deep copy on
//! every lookup, never a reference into the map: the backing entry may
//! be visible to any number of concurrent readers and must stay
//! pristine.

use crate::error::{Error, Result};
use crate::types::{ClusterRecord, RecordKey};
use dashmap::DashMap;

/// Keyed snapshot cache with copy-on-read semantics.
///
/// # Thread Safety
///
/// All operations are thread-safe; reads are lock-free via `DashMap`
/// and writes only lock the target shard.
#[derive(Debug, Default)]
pub struct RecordCache {
    records: DashMap<RecordKey, ClusterRecord>,
}

impl RecordCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        RecordCache {
            records: DashMap::new(),
        }
    }

    /// Point lookup returning a private copy of the snapshot.
    ///
    /// A miss means "not yet observed", not a hard fault; the cache may
    /// lag the store by a bounded sync delay.
    pub fn get(&self, key: &RecordKey) -> Result<ClusterRecord> {
        self.records
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Insert or replace the snapshot for a record.
    pub fn insert(&self, record: ClusterRecord) {
        self.records.insert(record.key.clone(), record);
    }

    /// Drop the snapshot for a record, returning it if present.
    pub fn remove(&self, key: &RecordKey) -> Option<ClusterRecord> {
        self.records.remove(key).map(|(_, record)| record)
    }

    /// Number of cached snapshots.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
