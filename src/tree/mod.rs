//! Snapshot Trie
//!
//! Persistent, path-compressed tree of metadata snapshots with structural sharing.

pub mod hasher;
pub mod hierarchy;
pub mod node;
pub mod path;

pub use hierarchy::SnapshotHierarchy;
pub use node::{NodeKind, SnapshotNode};
pub use path::PathRelation;
