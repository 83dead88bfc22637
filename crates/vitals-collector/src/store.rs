//! Snapshot store.
//!
//! Holds the single current snapshot. Every mutation runs under the write
//! lock, so a partial read-modify-write never interleaves with another.

use std::sync::Arc;

use parking_lot::RwLock;
use vitals_core::Snapshot;

/// Owned, cloneable handle to the current snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Option<Snapshot>>>,
}

impl SnapshotStore {
    /// Create an empty store (nothing ingested yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the current snapshot, if any.
    pub fn current(&self) -> Option<Snapshot> {
        self.current.read().clone()
    }

    pub fn has_snapshot(&self) -> bool {
        self.current.read().is_some()
    }

    /// Atomically replace the current snapshot.
    pub fn replace(&self, snapshot: Snapshot) {
        *self.current.write() = Some(snapshot);
    }

    /// Mutate the current snapshot in place under the write lock.
    ///
    /// `initial` builds the base record when the store is still empty.
    pub fn merge<R>(
        &self,
        initial: impl FnOnce() -> Snapshot,
        f: impl FnOnce(&mut Snapshot) -> R,
    ) -> R {
        let mut guard = self.current.write();
        let snapshot = guard.get_or_insert_with(initial);
        f(snapshot)
    }
}
