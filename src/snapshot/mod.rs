//! Snapshot and restore of a machine's live stack.
//!
//! A [`Snapshot`] captures the current state, back stack and id counter so
//! a store can be rebuilt with the same ids after a restart. Transitions
//! are not part of a snapshot; they come from the factory again.
//!
//! Persistence itself is pluggable through [`StateKeeper`].

use crate::core::State;
use crate::engine::LiveStack;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable snapshot of a machine's live stack.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<S: State> {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Current state, history and id counter
    pub live: LiveStack<S>,
}

impl<S: State> Snapshot<S> {
    /// Capture `live` as a new snapshot.
    pub fn capture(live: &LiveStack<S>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            live: live.clone(),
        }
    }

    /// Check the format version and the live stack invariants.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        self.live.validate().map_err(SnapshotError::ValidationFailed)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode and validate a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Encode in the compact binary format.
    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode and validate a binary snapshot.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Pluggable persistence for snapshots.
///
/// A store restores from its keeper once at construction and saves after
/// every published state change. `save` runs inside the store's critical
/// section, so implementations should hand slow I/O off elsewhere.
pub trait StateKeeper<S: State>: Send + Sync {
    /// The most recently saved snapshot, if any.
    fn restore(&self) -> Option<Snapshot<S>>;

    /// Persist `snapshot`, replacing the previous one.
    fn save(&self, snapshot: &Snapshot<S>) -> Result<(), SnapshotError>;
}

/// [`StateKeeper`] holding the latest snapshot in memory, binary encoded.
#[derive(Debug, Default)]
pub struct InMemoryStateKeeper {
    latest: Mutex<Option<Vec<u8>>>,
}

impl InMemoryStateKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.lock().is_none()
    }

    pub fn clear(&self) {
        self.latest.lock().take();
    }
}

impl<S: State> StateKeeper<S> for InMemoryStateKeeper {
    fn restore(&self) -> Option<Snapshot<S>> {
        let latest = self.latest.lock();
        let bytes = latest.as_deref()?;
        match Snapshot::from_binary(bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::warn!(%error, "Discarding unreadable snapshot");
                None
            }
        }
    }

    fn save(&self, snapshot: &Snapshot<S>) -> Result<(), SnapshotError> {
        let bytes = snapshot.to_binary()?;
        *self.latest.lock() = Some(bytes);
        Ok(())
    }
}

impl<S: State, K: StateKeeper<S> + ?Sized> StateKeeper<S> for std::sync::Arc<K> {
    fn restore(&self) -> Option<Snapshot<S>> {
        (**self).restore()
    }

    fn save(&self, snapshot: &Snapshot<S>) -> Result<(), SnapshotError> {
        (**self).save(snapshot)
    }
}
