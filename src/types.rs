//! Core types for the commit path.
//!
//! This module defines the record types that flow through the update
//! loop:
//! - [`RecordKey`]: `(namespace, name)` identity of a managed record
//! - [`ClusterRecord`]: the versioned record being persisted
//! - [`ClusterStatus`]: the mutable substructure callers intend to commit

use serde::{Deserialize, Serialize};

/// Identity of a managed record: a `(namespace, name)` pair.
///
/// Used as the lookup key for both the store and the snapshot cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// Namespace the record lives in.
    pub namespace: String,
    /// Record name, unique within its namespace.
    pub name: String,
}

impl RecordKey {
    /// Create a key from a namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        RecordKey {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Lifecycle phase reported in a cluster's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterPhase {
    /// No reconciliation in progress.
    Idle,
    /// Replica counts are being adjusted.
    Scaling,
    /// Rolling upgrade in progress.
    Upgrading,
    /// Some members are unhealthy.
    Degraded,
}

impl Default for ClusterPhase {
    fn default() -> Self {
        ClusterPhase::Idle
    }
}

/// Desired shape of the cluster. Computed elsewhere; opaque to the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Desired member count.
    pub replicas: u32,
}

/// Observed state of the cluster.
///
/// This is the substructure the caller intends to persist; the update
/// loop re-applies it onto every fresh snapshot so the caller's change
/// survives conflict recovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    /// Current lifecycle phase.
    pub phase: ClusterPhase,
    /// Members currently serving.
    pub ready_replicas: u32,
}

/// A versioned cluster state record.
///
/// `version` is the remote version token: the store rejects a write
/// whose version does not match the stored one. `0` means the record
/// has never been persisted. `Clone` is a deep copy (all data is
/// owned), which is what the copy-on-read discipline relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// Record identity.
    pub key: RecordKey,
    /// Remote version token, assigned by the store on each write.
    pub version: u64,
    /// Desired state.
    pub spec: ClusterSpec,
    /// Observed state.
    pub status: ClusterStatus,
}

impl ClusterRecord {
    /// Kind string used in audit event messages.
    pub const KIND: &'static str = "Cluster";

    /// Create an unpersisted record with default spec and status.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ClusterRecord {
            key: RecordKey::new(namespace, name),
            version: 0,
            spec: ClusterSpec::default(),
            status: ClusterStatus::default(),
        }
    }

    /// Return a copy of this record with the given status applied.
    pub fn with_status(mut self, status: ClusterStatus) -> Self {
        self.status = status;
        self
    }
}
