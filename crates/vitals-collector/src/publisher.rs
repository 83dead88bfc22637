//! Snapshot publisher.

use vitals_core::Published;

use crate::store::SnapshotStore;

/// Serves the current snapshot, or the waiting sentinel before any ingestion.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    store: SnapshotStore,
}

impl SnapshotPublisher {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    pub fn publish(&self) -> Published {
        Published::from(self.store.current())
    }
}
