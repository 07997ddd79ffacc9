//! Snapshot Store
//!
//! Holds the single published root of the snapshot trie. Readers take the
//! current hierarchy and traverse it without further locking; writers
//! recompute from the latest root and publish the result.

use crate::snapshot::MetadataSnapshot;
use crate::tree::SnapshotHierarchy;
use crate::types::CaseSensitivity;
use parking_lot::RwLock;
use tracing::trace;

/// Shared, atomically replaced root of the snapshot trie
pub struct SnapshotStore {
    current: RwLock<SnapshotHierarchy>,
}

impl SnapshotStore {
    /// Create a store that knows nothing yet.
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            current: RwLock::new(SnapshotHierarchy::empty(case)),
        }
    }

    /// The currently published hierarchy.
    ///
    /// The returned value stays consistent regardless of later writes.
    pub fn current(&self) -> SnapshotHierarchy {
        self.current.read().clone()
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.current.read().case_sensitivity()
    }

    /// Record `snapshot` and publish the new root.
    pub fn update(&self, snapshot: MetadataSnapshot) -> SnapshotHierarchy {
        let path = snapshot.absolute_path().to_string();
        let published = self.modify(|tree| tree.update(snapshot));
        trace!(path = %path, "Published update");
        published
    }

    /// Forget everything at and below `absolute_path` and publish the new root.
    pub fn invalidate(&self, absolute_path: &str) -> SnapshotHierarchy {
        let published = self.modify(|tree| tree.invalidate(absolute_path));
        trace!(path = %absolute_path, "Published invalidation");
        published
    }

    pub fn snapshot_at(&self, absolute_path: &str) -> Option<MetadataSnapshot> {
        self.current().snapshot_at(absolute_path)
    }

    /// Replace the root with `f(current)`; writers are serialized.
    pub fn modify<F>(&self, f: F) -> SnapshotHierarchy
    where
        F: FnOnce(&SnapshotHierarchy) -> SnapshotHierarchy,
    {
        let mut current = self.current.write();
        let next = f(&*current);
        if !next.same_root(&*current) {
            *current = next;
        }
        current.clone()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(CaseSensitivity::default())
    }
}
