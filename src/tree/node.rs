//! Snapshot trie nodes
//!
//! A node records what is known about the subtree at `path_to_parent` below its
//! parent. Labels may span several segments (path compression); chains split
//! when a new sibling forces a branch. Nodes are immutable and shared through
//! `Arc`, so every operation returns a new node that reuses every subtree off
//! the modified path.

use crate::snapshot::{MetadataSnapshot, SnapshotVisitor};
use crate::tree::path::{self, PathRelation};
use crate::types::CaseSensitivity;
use std::cmp::Ordering;
use std::sync::Arc;

/// Own-knowledge kind of a node, derived from its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// No snapshot for the node itself; only some descendants are known.
    Partial,
    /// Directory whose direct children are all recorded.
    CompleteDirectory,
    /// Directory with some children possibly unrecorded.
    Directory,
    RegularFile,
    Missing,
}

impl NodeKind {
    /// Files and missing entries never carry children.
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::RegularFile | NodeKind::Missing)
    }
}

/// Persistent trie node
#[derive(Debug, PartialEq, Eq)]
pub struct SnapshotNode {
    path_to_parent: String,
    snapshot: Option<MetadataSnapshot>,
    children: Vec<Arc<SnapshotNode>>, // sorted by first segment
}

impl SnapshotNode {
    fn new(
        path_to_parent: impl Into<String>,
        snapshot: Option<MetadataSnapshot>,
        children: Vec<Arc<SnapshotNode>>,
    ) -> Arc<Self> {
        Arc::new(SnapshotNode {
            path_to_parent: path_to_parent.into(),
            snapshot,
            children,
        })
    }

    /// Empty root: no knowledge at all.
    pub fn root() -> Arc<Self> {
        Self::new(String::new(), None, Vec::new())
    }

    /// Childless node carrying `snapshot`.
    pub fn from_snapshot(path_to_parent: impl Into<String>, snapshot: MetadataSnapshot) -> Arc<Self> {
        Self::new(path_to_parent, Some(snapshot), Vec::new())
    }

    pub fn path_to_parent(&self) -> &str {
        &self.path_to_parent
    }

    pub fn own_snapshot(&self) -> Option<&MetadataSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn children(&self) -> &[Arc<SnapshotNode>] {
        &self.children
    }

    pub fn kind(&self) -> NodeKind {
        match &self.snapshot {
            None => NodeKind::Partial,
            Some(snapshot) if snapshot.is_complete_directory() => NodeKind::CompleteDirectory,
            Some(MetadataSnapshot::Directory(_)) => NodeKind::Directory,
            Some(MetadataSnapshot::RegularFile(_)) => NodeKind::RegularFile,
            Some(MetadataSnapshot::Missing(_)) => NodeKind::Missing,
        }
    }

    /// Record `snapshot` for `path`, whose unconsumed suffix starts at `offset`.
    pub fn update(
        self: &Arc<Self>,
        path: &str,
        offset: usize,
        snapshot: MetadataSnapshot,
        case: CaseSensitivity,
    ) -> Arc<Self> {
        path::assert_segment_boundary(path, offset);
        if self.kind().is_leaf() {
            // A descendant exists, so the leaf knowledge no longer holds.
            return Self::new(
                self.path_to_parent.clone(),
                None,
                vec![Self::from_snapshot(&path[offset..], snapshot)],
            );
        }
        match path::find_child(&self.children, |c| c.path_to_parent(), path, offset, case) {
            Err(insert_before) => {
                let mut children = Vec::with_capacity(self.children.len() + 1);
                children.extend_from_slice(&self.children[..insert_before]);
                children.push(Self::from_snapshot(&path[offset..], snapshot));
                children.extend_from_slice(&self.children[insert_before..]);
                self.with_children(children)
            }
            Ok(index) => {
                let new_child = update_child(&self.children[index], path, offset, snapshot, case);
                self.with_replaced_child(index, new_child)
            }
        }
    }

    /// Drop everything known at and below `path`.
    ///
    /// Returns `None` when nothing worth keeping is left in this subtree.
    pub fn invalidate(
        self: &Arc<Self>,
        path: &str,
        offset: usize,
        case: CaseSensitivity,
    ) -> Option<Arc<Self>> {
        path::assert_segment_boundary(path, offset);
        if self.kind().is_leaf() {
            return None;
        }
        match path::find_child(&self.children, |c| c.path_to_parent(), path, offset, case) {
            Err(_) => Some(self.with_unknown_child_invalidated()),
            Ok(index) => match invalidate_child(&self.children[index], path, offset, case) {
                Some(new_child) => Some(self.with_replaced_child(index, new_child)),
                None if self.children.len() == 1 => self.with_no_children(),
                None => {
                    let mut children = self.children.clone();
                    children.remove(index);
                    Some(Self::new(
                        self.path_to_parent.clone(),
                        self.snapshot_without_completeness(),
                        children,
                    ))
                }
            },
        }
    }

    /// Snapshot recorded or implied for `path`.
    ///
    /// Descendants of files and missing entries are missing, as is anything
    /// directly below a complete directory that it does not list.
    pub fn snapshot_at(
        &self,
        path: &str,
        offset: usize,
        case: CaseSensitivity,
    ) -> Option<MetadataSnapshot> {
        path::assert_segment_boundary(path, offset);
        if self.kind().is_leaf() {
            return Some(MetadataSnapshot::missing(path));
        }
        match path::find_child(&self.children, |c| c.path_to_parent(), path, offset, case) {
            Err(_) if self.kind() == NodeKind::CompleteDirectory => {
                Some(MetadataSnapshot::missing(path))
            }
            Err(_) => None,
            Ok(index) => {
                let child = &self.children[index];
                match path::relate(&child.path_to_parent, path, offset, case) {
                    PathRelation::Same => child.snapshot.clone(),
                    PathRelation::Descendant => child.snapshot_at(
                        path,
                        path::descend(offset, child.path_to_parent.len()),
                        case,
                    ),
                    _ => None,
                }
            }
        }
    }

    /// Same contents under a different label.
    pub fn with_path_to_parent(self: &Arc<Self>, new_path_to_parent: &str) -> Arc<Self> {
        if self.path_to_parent == new_path_to_parent {
            return Arc::clone(self);
        }
        Self::new(new_path_to_parent, self.snapshot.clone(), self.children.clone())
    }

    /// Depth-first walk; a node's own snapshot precedes its descendants.
    pub fn accept<V: SnapshotVisitor + ?Sized>(&self, visitor: &mut V) {
        if let Some(snapshot) = &self.snapshot {
            visitor.visit(snapshot);
        }
        for child in &self.children {
            child.accept(visitor);
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Children sorted without shared first segments, leaves childless, labels non-empty.
    pub fn is_well_formed(&self, case: CaseSensitivity) -> bool {
        if self.kind().is_leaf() && !self.children.is_empty() {
            return false;
        }
        let sorted = self.children.windows(2).all(|pair| {
            path::compare_first_segments(&pair[0].path_to_parent, &pair[1].path_to_parent, case)
                == Ordering::Less
        });
        sorted
            && self
                .children
                .iter()
                .all(|c| !c.path_to_parent.is_empty() && c.is_well_formed(case))
    }

    /// Replace the knowledge about this node's own path.
    pub(crate) fn with_own_snapshot(self: &Arc<Self>, snapshot: MetadataSnapshot) -> Arc<Self> {
        if self.snapshot.as_ref() == Some(&snapshot)
            && (!snapshot.file_type().is_leaf() || self.children.is_empty())
        {
            return Arc::clone(self);
        }
        let children = match snapshot {
            MetadataSnapshot::Directory(_) => self.children.clone(),
            _ => Vec::new(),
        };
        Self::new(self.path_to_parent.clone(), Some(snapshot), children)
    }

    fn with_children(&self, children: Vec<Arc<SnapshotNode>>) -> Arc<Self> {
        Self::new(self.path_to_parent.clone(), self.snapshot.clone(), children)
    }

    fn with_replaced_child(self: &Arc<Self>, index: usize, new_child: Arc<SnapshotNode>) -> Arc<Self> {
        if Arc::ptr_eq(&self.children[index], &new_child) {
            return Arc::clone(self);
        }
        if self.children.len() == 1 {
            return self.with_children(vec![new_child]);
        }
        let mut children = self.children.clone();
        children[index] = new_child;
        self.with_children(children)
    }

    fn with_no_children(&self) -> Option<Arc<Self>> {
        match self.kind() {
            NodeKind::Partial => None,
            _ => Some(Self::new(
                self.path_to_parent.clone(),
                self.snapshot_without_completeness(),
                Vec::new(),
            )),
        }
    }

    fn with_unknown_child_invalidated(self: &Arc<Self>) -> Arc<Self> {
        match self.kind() {
            NodeKind::CompleteDirectory => Self::new(
                self.path_to_parent.clone(),
                self.snapshot_without_completeness(),
                self.children.clone(),
            ),
            _ => Arc::clone(self),
        }
    }

    fn snapshot_without_completeness(&self) -> Option<MetadataSnapshot> {
        match &self.snapshot {
            Some(snapshot) if snapshot.is_complete_directory() => Some(
                MetadataSnapshot::directory(snapshot.absolute_path(), false),
            ),
            other => other.clone(),
        }
    }
}

fn update_child(
    child: &Arc<SnapshotNode>,
    path: &str,
    offset: usize,
    snapshot: MetadataSnapshot,
    case: CaseSensitivity,
) -> Arc<SnapshotNode> {
    let label = &child.path_to_parent;
    match path::relate(label, path, offset, case) {
        PathRelation::Descendant => {
            child.update(path, path::descend(offset, label.len()), snapshot, case)
        }
        PathRelation::Same => child.with_own_snapshot(snapshot),
        PathRelation::Ancestor => {
            let new_label = &path[offset..];
            match snapshot {
                MetadataSnapshot::Directory(_) => {
                    let below = child.with_path_to_parent(&label[new_label.len() + 1..]);
                    SnapshotNode::new(new_label, Some(snapshot), vec![below])
                }
                _ => SnapshotNode::from_snapshot(new_label, snapshot),
            }
        }
        PathRelation::Diverging { common_prefix } => {
            let existing = child.with_path_to_parent(&label[common_prefix + 1..]);
            let added = SnapshotNode::from_snapshot(&path[offset + common_prefix + 1..], snapshot);
            let children = match path::compare_first_segments(
                &existing.path_to_parent,
                &added.path_to_parent,
                case,
            ) {
                Ordering::Less => vec![existing, added],
                _ => vec![added, existing],
            };
            SnapshotNode::new(&label[..common_prefix], None, children)
        }
        PathRelation::Unrelated(_) => unreachable!("covering child does not share a segment"),
    }
}

fn invalidate_child(
    child: &Arc<SnapshotNode>,
    path: &str,
    offset: usize,
    case: CaseSensitivity,
) -> Option<Arc<SnapshotNode>> {
    let label = &child.path_to_parent;
    match path::relate(label, path, offset, case) {
        PathRelation::Same | PathRelation::Ancestor => None,
        PathRelation::Descendant => child.invalidate(path, path::descend(offset, label.len()), case),
        // Never recorded inside the compressed chain.
        PathRelation::Diverging { .. } => Some(Arc::clone(child)),
        PathRelation::Unrelated(_) => unreachable!("covering child does not share a segment"),
    }
}
