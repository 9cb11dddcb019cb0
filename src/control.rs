//! The optimistic-concurrency update loop.
//!
//! [`RecordControl`] commits a locally-computed status change to a
//! versioned record in a contended store:
//! 1. Save the caller's intended status aside
//! 2. Attempt the write, up to the retry budget
//! 3. On failure, refresh the working copy from the snapshot cache
//!    (deep copy, never the cache's own instance) and re-apply the
//!    intended status before the next attempt
//! 4. Emit exactly one outcome event per call, success or failure
//!
//! Correctness relies on the store's version checking plus the
//! copy-on-read discipline; no lock is held across the loop.

use crate::cache::RecordCache;
use crate::diagnostics::DiagnosticsSink;
use crate::error::{Error, Result};
use crate::events::{outcome_event, EventSink};
use crate::retry::RetryPolicy;
use crate::store::StoreClient;
use crate::types::ClusterRecord;
use std::sync::Arc;
use std::thread;

/// Commits record updates under contention.
///
/// One `update` call is a single logical thread of execution: the loop
/// blocks through its backoff and returns only on success or a spent
/// retry budget. Independent calls may run concurrently on their own
/// threads; the cache and store are shared and thread-safe.
pub struct RecordControl<S: StoreClient> {
    store: Arc<S>,
    cache: Arc<RecordCache>,
    recorder: Arc<dyn EventSink>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    policy: RetryPolicy,
}

impl<S: StoreClient> RecordControl<S> {
    /// Create a control with every collaborator injected explicitly.
    pub fn new(
        store: Arc<S>,
        cache: Arc<RecordCache>,
        recorder: Arc<dyn EventSink>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        policy: RetryPolicy,
    ) -> Self {
        RecordControl {
            store,
            cache,
            recorder,
            diagnostics,
            policy,
        }
    }

    /// Persist the caller's status change to the store.
    ///
    /// The caller's intended change is the record's status; it is
    /// re-applied onto every fresh snapshot, so conflict recovery never
    /// discards it — only the stale parts of the record are replaced.
    /// Every store error is retried uniformly until the budget is
    /// spent; the last error is then returned verbatim. On success the
    /// store's authoritative post-write record is returned. The
    /// caller keeps their own copy either way.
    pub fn update(&self, record: &ClusterRecord) -> Result<ClusterRecord> {
        let key = record.key.clone();
        let desired_status = record.status.clone();
        let mut working = record.clone();
        let mut outcome: Result<ClusterRecord> =
            Err(Error::Internal(format!("{key}: no update attempt made")));

        for attempt in 0..self.policy.attempts() {
            if attempt > 0 {
                thread::sleep(self.policy.backoff(attempt - 1));
            }

            // The working copy may be a fresher snapshot from the
            // previous iteration; the caller's change goes back on top.
            working.status = desired_status.clone();

            match self.store.update(&working) {
                Ok(persisted) => {
                    tracing::info!(record = %key, version = persisted.version, "record updated");
                    outcome = Ok(persisted);
                    break;
                }
                Err(err) => {
                    tracing::warn!(record = %key, error = %err, "failed to update record");
                    match self.cache.get(&key) {
                        // get() hands back a private copy; the cached
                        // instance itself is never touched.
                        Ok(snapshot) => working = snapshot,
                        Err(lookup_err) => self.diagnostics.report(&Error::Internal(format!(
                            "error getting updated record {key} from cache: {lookup_err}"
                        ))),
                    }
                    outcome = Err(err);
                }
            }
        }

        self.recorder
            .emit(outcome_event("update", &key, outcome.as_ref().err()));
        outcome
    }
}
