//! End-to-end retry scenarios for the update loop.
//!
//! These tests drive `RecordControl` against the fault-injecting double
//! (deterministic failure schedules) and against the real in-memory
//! versioned store (genuine conflict semantics).

use statekeeper::{
    ClusterPhase, ClusterRecord, ClusterStatus, DiagnosticsSink, Error, EventSink, EventType,
    FaultInjectingStore, MemoryDiagnostics, MemorySink, RecordCache, RecordControl, RetryPolicy,
    StoreClient, VersionedStore,
};
use std::sync::Arc;

const STEPS: u32 = 5;

struct Harness<S: StoreClient> {
    cache: Arc<RecordCache>,
    store: Arc<S>,
    events: Arc<MemorySink>,
    control: RecordControl<S>,
}

fn harness_with<S: StoreClient>(store: Arc<S>, cache: Arc<RecordCache>) -> Harness<S> {
    let events = Arc::new(MemorySink::new());
    let diagnostics = Arc::new(MemoryDiagnostics::new());
    let control = RecordControl::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        Arc::clone(&events) as Arc<dyn EventSink>,
        diagnostics as Arc<dyn DiagnosticsSink>,
        RetryPolicy::immediate(STEPS),
    );
    Harness {
        cache,
        store,
        events,
        control,
    }
}

fn fault_harness() -> Harness<FaultInjectingStore> {
    let cache = Arc::new(RecordCache::new());
    let store = Arc::new(FaultInjectingStore::new(Arc::clone(&cache)));
    harness_with(store, cache)
}

fn scaling_status() -> ClusterStatus {
    ClusterStatus {
        phase: ClusterPhase::Scaling,
        ready_replicas: 1,
    }
}

fn idle_status() -> ClusterStatus {
    ClusterStatus {
        phase: ClusterPhase::Idle,
        ready_replicas: 3,
    }
}

// ============================================================================
// Fault schedule driven scenarios
// ============================================================================

#[test]
fn k_failures_mean_k_plus_one_calls_then_success() {
    for k in 1..=STEPS - 1 {
        let h = fault_harness();
        h.cache.insert(ClusterRecord::new("default", "cluster-a"));
        h.store
            .arm(Error::Conflict("version moved".to_string()), k);

        let record = ClusterRecord::new("default", "cluster-a").with_status(scaling_status());
        let updated = h.control.update(&record).unwrap();

        assert_eq!(updated.status, scaling_status());
        assert_eq!(h.store.calls(), u64::from(k) + 1, "k = {k}");
        assert_eq!(h.events.events().len(), 1, "k = {k}");
    }
}

#[test]
fn exhaustion_surfaces_last_error_after_exactly_budget_calls() {
    let h = fault_harness();
    h.cache.insert(ClusterRecord::new("default", "cluster-a"));
    let injected = Error::Conflict("version moved".to_string());
    h.store.arm(injected.clone(), u32::MAX);

    let record = ClusterRecord::new("default", "cluster-a").with_status(scaling_status());
    let err = h.control.update(&record).unwrap_err();

    assert_eq!(err, injected);
    assert_eq!(h.store.calls(), u64::from(STEPS));

    let events = h.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Warning);
    assert_eq!(events[0].reason, "FailedUpdate");
    assert!(events[0].message.contains("failed error: conflict: version moved"));
}

#[test]
fn exactly_one_event_regardless_of_retry_count() {
    for failures in [0u32, 1, 2, u32::MAX] {
        let h = fault_harness();
        h.cache.insert(ClusterRecord::new("default", "cluster-a"));
        if failures > 0 {
            h.store.arm(Error::Store("unavailable".to_string()), failures);
        }

        let record = ClusterRecord::new("default", "cluster-a").with_status(scaling_status());
        let _ = h.control.update(&record);

        assert_eq!(h.events.events().len(), 1);
    }
}

#[test]
fn loop_never_mutates_the_cached_snapshot_in_place() {
    let h = fault_harness();
    let cached = ClusterRecord::new("default", "cluster-a").with_status(idle_status());
    h.cache.insert(cached.clone());
    // Every attempt fails, so the store never legitimately rewrites the
    // backing map; any change to the cache would be loop leakage.
    h.store.arm(Error::Conflict("version moved".to_string()), u32::MAX);

    let record = ClusterRecord::new("default", "cluster-a").with_status(scaling_status());
    let _ = h.control.update(&record).unwrap_err();

    assert_eq!(h.cache.get(&cached.key).unwrap(), cached);
}

#[test]
fn conflict_recovery_reapplies_intent_over_fresher_base() {
    // Record { default/cluster-a, status.phase: Scaling }, one conflict
    // on the first call, cache holds an Idle snapshot for recovery.
    let h = fault_harness();
    let mut cached = ClusterRecord::new("default", "cluster-a").with_status(idle_status());
    cached.version = 4;
    cached.spec.replicas = 5;
    h.cache.insert(cached.clone());
    h.store.arm(Error::Conflict("version moved".to_string()), 1);

    let record = ClusterRecord::new("default", "cluster-a").with_status(scaling_status());
    let updated = h.control.update(&record).unwrap();

    // The caller's intent survives on top of the fresher base.
    assert_eq!(updated.status, scaling_status());
    assert_eq!(updated.version, 4);
    assert_eq!(updated.spec.replicas, 5);
    assert_eq!(h.store.calls(), 2);

    let events = h.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Normal);
    assert_eq!(events[0].message, "update Cluster cluster-a successful");

    // The double's success path wrote the final record through to the
    // backing map.
    assert_eq!(h.cache.get(&record.key).unwrap().status, scaling_status());
}

#[test]
fn repeated_update_with_no_external_writer_is_idempotent() {
    let h = fault_harness();
    let record = ClusterRecord::new("default", "cluster-a").with_status(scaling_status());

    let first = h.control.update(&record).unwrap();
    let second = h.control.update(&record).unwrap();

    assert_eq!(first, second);
    assert_eq!(h.cache.get(&record.key).unwrap(), first);
    assert_eq!(h.events.events().len(), 2);
}

// ============================================================================
// Real versioned store
// ============================================================================

#[test]
fn stale_writer_recovers_through_the_cache() {
    let cache = Arc::new(RecordCache::new());
    let store = Arc::new(VersionedStore::new());
    let h = harness_with(Arc::clone(&store), Arc::clone(&cache));

    // Seed the store, then let an external writer move the record.
    let seeded = store.seed(ClusterRecord::new("default", "cluster-a"));
    let mut external = seeded.clone();
    external.spec.replicas = 7;
    let moved = store.update(&external).unwrap();
    // The informer has observed the external write.
    cache.insert(moved.clone());

    // Our caller still holds the original (now stale) copy.
    let stale = seeded.with_status(scaling_status());
    let updated = h.control.update(&stale).unwrap();

    // First attempt conflicts, recovery picks up the fresher base, the
    // caller's status lands on top of the external writer's spec change.
    assert_eq!(updated.status, scaling_status());
    assert_eq!(updated.spec.replicas, 7);
    assert!(updated.version > moved.version);
    assert_eq!(store.get(&updated.key).unwrap(), updated);

    let events = h.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Normal);
}

#[test]
fn missing_record_exhausts_and_reports_cache_misses() {
    let cache = Arc::new(RecordCache::new());
    let store = Arc::new(VersionedStore::new());
    let events = Arc::new(MemorySink::new());
    let diagnostics = Arc::new(MemoryDiagnostics::new());
    let control = RecordControl::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        Arc::clone(&events) as Arc<dyn EventSink>,
        Arc::clone(&diagnostics) as Arc<dyn DiagnosticsSink>,
        RetryPolicy::immediate(3),
    );

    let record = ClusterRecord::new("default", "ghost").with_status(scaling_status());
    let err = control.update(&record).unwrap_err();

    assert!(err.is_not_found());
    // One cache-miss report per failed attempt; none of them fatal.
    assert_eq!(diagnostics.reports().len(), 3);
    assert_eq!(events.events().len(), 1);
    assert_eq!(events.events()[0].reason, "FailedUpdate");
}
