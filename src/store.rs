//! Store clients: the versioned write contract and its implementations.
//!
//! [`StoreClient`] is the seam between the update loop and the record
//! store. Two implementations live here:
//! - [`VersionedStore`]: in-memory store with first-writer-wins version
//!   checking, the real conflict semantics the loop is built against
//! - [`FaultInjectingStore`]: deterministic test double that fails a
//!   configured number of calls and otherwise writes through to the
//!   cache's backing map

use crate::cache::RecordCache;
use crate::error::{Error, Result};
use crate::types::{ClusterRecord, RecordKey};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Versioned write contract.
///
/// An update must fail distinguishably when the record's version token
/// is stale, and return the authoritative post-write record otherwise.
/// Implementations are safe for concurrent use.
pub trait StoreClient: Send + Sync {
    /// Write `record`, subject to version conflict detection.
    fn update(&self, record: &ClusterRecord) -> Result<ClusterRecord>;
}

/// In-memory record store with optimistic version checking.
///
/// Each successful write stamps the record with a fresh version from a
/// global counter; a write whose version token does not match the
/// stored one is rejected with [`Error::Conflict`]. This mirrors the
/// linearizable conflict detection the loop assumes of the remote
/// store.
#[derive(Debug, Default)]
pub struct VersionedStore {
    records: DashMap<RecordKey, ClusterRecord>,
    version: AtomicU64,
}

impl VersionedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        VersionedStore {
            records: DashMap::new(),
            version: AtomicU64::new(0),
        }
    }

    /// Allocate the next version token.
    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Seed a record, bypassing conflict detection. Returns the stored
    /// copy with its assigned version.
    pub fn seed(&self, mut record: ClusterRecord) -> ClusterRecord {
        record.version = self.next_version();
        self.records.insert(record.key.clone(), record.clone());
        record
    }

    /// Read the authoritative copy of a record.
    pub fn get(&self, key: &RecordKey) -> Result<ClusterRecord> {
        self.records
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }
}

impl StoreClient for VersionedStore {
    fn update(&self, record: &ClusterRecord) -> Result<ClusterRecord> {
        let mut entry = self
            .records
            .get_mut(&record.key)
            .ok_or_else(|| Error::NotFound(record.key.to_string()))?;

        if entry.version != record.version {
            return Err(Error::Conflict(format!(
                "{}: version {} is stale, store has {}",
                record.key, record.version, entry.version
            )));
        }

        let mut stored = record.clone();
        stored.version = self.next_version();
        *entry = stored.clone();
        Ok(stored)
    }
}

/// Armed/disarmed fault schedule for the test double.
///
/// Lifecycle: created inert (every call succeeds), armed with an error
/// and a remaining-trigger count, consumed one trigger per call until
/// it disarms itself. The call counter increments on every call as the
/// last action, regardless of outcome.
#[derive(Debug, Default)]
struct FaultSchedule {
    calls: u64,
    error: Option<Error>,
    remaining: u32,
}

impl FaultSchedule {
    /// Take one trigger if armed; disarm after the last one.
    fn fire(&mut self) -> Option<Error> {
        let armed = self.error.is_some() && self.remaining > 0;
        if !armed {
            return None;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.error.take()
        } else {
            self.error.clone()
        }
    }
}

/// Deterministic [`StoreClient`] double.
///
/// Failed calls return the configured error; successful calls write
/// through to the shared cache index, standing in for the store and
/// the informer sync at once. The loop calls it sequentially within
/// one update, but the schedule is lock-guarded so concurrent updates
/// in tests stay well-defined.
#[derive(Debug)]
pub struct FaultInjectingStore {
    index: Arc<RecordCache>,
    schedule: Mutex<FaultSchedule>,
}

impl FaultInjectingStore {
    /// Create an inert double writing through to `index`.
    pub fn new(index: Arc<RecordCache>) -> Self {
        FaultInjectingStore {
            index,
            schedule: Mutex::new(FaultSchedule::default()),
        }
    }

    /// Arm the schedule: the next `times` calls fail with `error`.
    pub fn arm(&self, error: Error, times: u32) {
        let mut schedule = self.schedule.lock();
        schedule.error = Some(error);
        schedule.remaining = times;
    }

    /// Total number of `update` calls seen so far.
    pub fn calls(&self) -> u64 {
        self.schedule.lock().calls
    }
}

impl StoreClient for FaultInjectingStore {
    fn update(&self, record: &ClusterRecord) -> Result<ClusterRecord> {
        let mut schedule = self.schedule.lock();
        let outcome = match schedule.fire() {
            Some(error) => Err(error),
            None => {
                self.index.insert(record.clone());
                Ok(record.clone())
            }
        };
        schedule.calls += 1;
        outcome
    }
}
