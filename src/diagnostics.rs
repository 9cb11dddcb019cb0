//! Diagnostics side channel for non-fatal recovery errors.
//!
//! A cache miss while recovering from a failed write is not fatal to
//! the loop, but it should not vanish either. The sink is injected
//! rather than process-global so tests can assert on what was
//! reported.

use crate::error::Error;
use parking_lot::Mutex;

/// Sink for non-fatal errors the loop works around.
pub trait DiagnosticsSink: Send + Sync {
    /// Report one error. Must not block or fail.
    fn report(&self, error: &Error);
}

/// Production sink that routes reports to the tracing pipeline.
#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn report(&self, error: &Error) {
        tracing::error!(error = %error, "non-fatal error during conflict recovery");
    }
}

/// Capturing sink for tests.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    reports: Mutex<Vec<Error>>,
}

impl MemoryDiagnostics {
    /// Create an empty sink.
    pub fn new() -> Self {
        MemoryDiagnostics::default()
    }

    /// Copy out everything reported so far.
    pub fn reports(&self) -> Vec<Error> {
        self.reports.lock().clone()
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn report(&self, error: &Error) {
        self.reports.lock().push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_captures_reports() {
        let sink = MemoryDiagnostics::new();
        sink.report(&Error::NotFound("default/cluster-a".to_string()));

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_not_found());
    }
}
