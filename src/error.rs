//! Unified error types for statekeeper.
//!
//! This module provides the canonical error type for all commit-path
//! operations. Variants carry owned strings so the type stays `Clone`;
//! the fault-injecting store holds a configured error and hands out
//! copies of it on each triggered call.

use thiserror::Error;

/// All statekeeper errors.
///
/// The update loop treats every store failure as retryable, but callers
/// and tests still need to distinguish kinds, so the taxonomy is kept
/// explicit here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Version conflict: the remote record moved since it was read.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Record not present (store miss or cache miss).
    #[error("not found: {0}")]
    NotFound(String),

    /// Store-side failure that is not a version conflict.
    #[error("store error: {0}")]
    Store(String),

    /// Bug or invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for statekeeper operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a version conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this error may succeed on retry with fresh data.
    ///
    /// Conflicts always qualify. Plain store errors are also treated as
    /// retryable because the update loop deliberately does not
    /// distinguish error kinds when consuming its retry budget.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::Store(_))
    }
}
