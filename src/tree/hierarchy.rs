//! Rooted snapshot trie
//!
//! Binds a root node to the case policy it was built with and translates
//! absolute paths into offset-based node operations.

use crate::snapshot::{MetadataSnapshot, SnapshotVisitor};
use crate::tree::node::SnapshotNode;
use crate::tree::path;
use crate::types::CaseSensitivity;
use std::sync::Arc;

/// Offset of the first segment of an absolute path.
const ROOT_OFFSET: usize = 1;

/// Immutable view of everything known about the filesystem.
///
/// Cloning is cheap; every clone shares the same nodes.
#[derive(Debug, Clone)]
pub struct SnapshotHierarchy {
    root: Arc<SnapshotNode>,
    case: CaseSensitivity,
}

impl SnapshotHierarchy {
    pub fn empty(case: CaseSensitivity) -> Self {
        Self {
            root: SnapshotNode::root(),
            case,
        }
    }

    pub fn root(&self) -> &Arc<SnapshotNode> {
        &self.root
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    /// New hierarchy with `snapshot` recorded at its own absolute path.
    pub fn update(&self, snapshot: MetadataSnapshot) -> Self {
        let absolute_path = snapshot.absolute_path().to_string();
        path::assert_valid_absolute_path(&absolute_path);
        let root = if absolute_path == "/" {
            self.root.with_own_snapshot(snapshot)
        } else {
            self.root
                .update(&absolute_path, ROOT_OFFSET, snapshot, self.case)
        };
        self.with_root(root)
    }

    /// New hierarchy with nothing known at or below `absolute_path`.
    pub fn invalidate(&self, absolute_path: &str) -> Self {
        path::assert_valid_absolute_path(absolute_path);
        if absolute_path == "/" {
            return Self::empty(self.case);
        }
        let root = self
            .root
            .invalidate(absolute_path, ROOT_OFFSET, self.case)
            .unwrap_or_else(SnapshotNode::root);
        self.with_root(root)
    }

    pub fn snapshot_at(&self, absolute_path: &str) -> Option<MetadataSnapshot> {
        path::assert_valid_absolute_path(absolute_path);
        if absolute_path == "/" {
            return self.root.own_snapshot().cloned();
        }
        self.root.snapshot_at(absolute_path, ROOT_OFFSET, self.case)
    }

    pub fn accept<V: SnapshotVisitor + ?Sized>(&self, visitor: &mut V) {
        self.root.accept(visitor);
    }

    pub fn is_empty(&self) -> bool {
        self.root.own_snapshot().is_none() && self.root.children().is_empty()
    }

    /// Whether both hierarchies share the same root node.
    pub fn same_root(&self, other: &SnapshotHierarchy) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    fn with_root(&self, root: Arc<SnapshotNode>) -> Self {
        Self {
            root,
            case: self.case,
        }
    }
}
