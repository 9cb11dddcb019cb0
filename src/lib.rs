//! statekeeper: optimistic-concurrency commit path for cluster records
//!
//! This crate implements the "commit an update under contention"
//! operation of a control plane:
//! - RecordControl: bounded retry loop with conflict recovery
//! - StoreClient: versioned write contract, plus an in-memory
//!   implementation and a deterministic fault-injecting double
//! - RecordCache: shared snapshot cache with copy-on-read discipline
//! - EventSink: exactly one audit event per logical update
//!
//! Out of scope: computing the desired record state, the store's
//! server side, and the informer machinery that feeds the cache.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod retry;
pub mod store;
pub mod types;

pub use cache::RecordCache;
pub use control::RecordControl;
pub use diagnostics::{DiagnosticsSink, LogDiagnostics, MemoryDiagnostics};
pub use error::{Error, Result};
pub use events::{outcome_event, Event, EventSink, EventType, LogSink, MemorySink};
pub use retry::RetryPolicy;
pub use store::{FaultInjectingStore, StoreClient, VersionedStore};
pub use types::{ClusterPhase, ClusterRecord, ClusterSpec, ClusterStatus, RecordKey};
