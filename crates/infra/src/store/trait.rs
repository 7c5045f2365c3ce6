use std::sync::Arc;

use thiserror::Error;

use super::snapshot::LabSnapshot;

/// Snapshot store operation error.
///
/// These are **infrastructure errors** (IO, encoding) as opposed to domain
/// errors (validation, stock, unknown ids).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io failed ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot is not valid JSON ({path}): {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("snapshot store lock poisoned")]
    Poisoned,
}

/// Whole-state snapshot persistence.
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<LabSnapshot>, StoreError>;

    /// Replace the saved snapshot.
    fn save(&self, snapshot: &LabSnapshot) -> Result<(), StoreError>;
}

impl<S> SnapshotStore for Arc<S>
where
    S: SnapshotStore + ?Sized,
{
    fn load(&self) -> Result<Option<LabSnapshot>, StoreError> {
        (**self).load()
    }

    fn save(&self, snapshot: &LabSnapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}
