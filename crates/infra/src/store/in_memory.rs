use std::sync::RwLock;

use super::snapshot::LabSnapshot;
use super::r#trait::{SnapshotStore, StoreError};

/// In-memory snapshot store for tests/dev. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    last: RwLock<Option<LabSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<Option<LabSnapshot>, StoreError> {
        let last = self.last.read().map_err(|_| StoreError::Poisoned)?;
        Ok(last.clone())
    }

    fn save(&self, snapshot: &LabSnapshot) -> Result<(), StoreError> {
        let mut last = self.last.write().map_err(|_| StoreError::Poisoned)?;
        *last = Some(snapshot.clone());
        Ok(())
    }
}
