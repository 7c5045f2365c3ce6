//! Snapshot persistence boundary.
//!
//! The engine persists the whole lab state (four collections) as one snapshot
//! after every mutation. Implementations must replace the previous snapshot
//! atomically: a reader of the backing medium sees either the old snapshot or
//! the new one, never a mix.

pub mod in_memory;
pub mod json_file;
pub mod snapshot;
pub mod r#trait;

pub use in_memory::InMemorySnapshotStore;
pub use json_file::JsonFileSnapshotStore;
pub use r#trait::{SnapshotStore, StoreError};
pub use snapshot::LabSnapshot;
