//! Snapshot VFS: Incremental Filesystem Knowledge
//!
//! An in-memory, incrementally updatable view of a filesystem hierarchy. Known
//! metadata lives in a persistent, path-compressed snapshot trie that is
//! updated and invalidated per path with structural sharing; a lazy access
//! layer fills it from a probe only when a path is first needed.

pub mod access;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use access::{DiskProbe, FileSystemAccess, LazyNode, Probe};
pub use error::{ProbeError, VfsError};
pub use snapshot::{
    DirectorySnapshot, MetadataSnapshot, MissingSnapshot, RegularFileSnapshot, SnapshotVisitor,
};
pub use store::SnapshotStore;
pub use tree::{NodeKind, SnapshotHierarchy, SnapshotNode};
pub use types::{CaseSensitivity, FileType, Hash};
