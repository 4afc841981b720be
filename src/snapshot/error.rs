//! Snapshot error types.

use thiserror::Error;

/// Errors that can occur while encoding, decoding or storing snapshots
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The live stack in the snapshot breaks its invariants
    #[error("Snapshot validation failed: {0}")]
    ValidationFailed(String),

    /// A state keeper could not persist the snapshot
    #[error("State keeper failed: {0}")]
    KeeperFailed(String),
}
