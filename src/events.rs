//! Audit events for commit outcomes.
//!
//! Every logical update emits exactly one outcome event, success or
//! failure. The verb-to-event mapping is a pure function so it can be
//! reused for verbs beyond `"update"`; emission itself goes through the
//! [`EventSink`] seam and is fire-and-forget.

use crate::error::Error;
use crate::types::{ClusterRecord, RecordKey};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// The operation succeeded.
    Normal,
    /// The operation failed.
    Warning,
}

/// One audit record describing the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Record the operation acted on.
    pub key: RecordKey,
    /// Severity.
    pub event_type: EventType,
    /// Machine-readable reason, e.g. `SuccessfulUpdate`.
    pub reason: String,
    /// Human-readable message.
    pub message: String,
    /// When the event was built.
    pub timestamp: DateTime<Utc>,
}

/// Uppercase the first letter of a verb: `update` -> `Update`.
fn titlecase(verb: &str) -> String {
    let mut chars = verb.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the outcome event for one operation against a record.
///
/// Success: `Normal` / `Successful<Verb>` / `"<verb> Cluster <name>
/// successful"`. Failure: `Warning` / `Failed<Verb>` / the same message
/// shape with `failed error: <err>` appended.
pub fn outcome_event(verb: &str, key: &RecordKey, error: Option<&Error>) -> Event {
    let timestamp = Utc::now();
    match error {
        None => Event {
            key: key.clone(),
            event_type: EventType::Normal,
            reason: format!("Successful{}", titlecase(verb)),
            message: format!(
                "{} {} {} successful",
                verb.to_lowercase(),
                ClusterRecord::KIND,
                key.name
            ),
            timestamp,
        },
        Some(err) => Event {
            key: key.clone(),
            event_type: EventType::Warning,
            reason: format!("Failed{}", titlecase(verb)),
            message: format!(
                "{} {} {} failed error: {}",
                verb.to_lowercase(),
                ClusterRecord::KIND,
                key.name,
                err
            ),
            timestamp,
        },
    }
}

/// Append-only sink for audit events.
pub trait EventSink: Send + Sync {
    /// Record one event. Fire-and-forget; the loop never consumes a
    /// return value.
    fn emit(&self, event: Event);
}

/// Production sink that forwards events to the tracing pipeline.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: Event) {
        match event.event_type {
            EventType::Normal => tracing::info!(
                record = %event.key,
                reason = %event.reason,
                "{}",
                event.message
            ),
            EventType::Warning => tracing::warn!(
                record = %event.key,
                reason = %event.reason,
                "{}",
                event.message
            ),
        }
    }
}

/// Capturing sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Copy out everything emitted so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}
