//! Lazy File System Access
//!
//! Ties the lazy node tree to the snapshot store: lookups materialize entries
//! through the probe on demand, authoritative writes bypass it, and
//! invalidations reach both the published trie and the lazy caches.

pub mod node;
pub mod probe;

pub use node::{AccessContext, LazyNode};
pub use probe::{DiskProbe, Probe};

use crate::error::VfsError;
use crate::snapshot::MetadataSnapshot;
use crate::store::SnapshotStore;
use crate::tree::{path, SnapshotHierarchy};
use crate::types::CaseSensitivity;
use std::sync::Arc;
use tracing::{debug, trace};

/// Entry point for on-demand filesystem knowledge
pub struct FileSystemAccess {
    store: Arc<SnapshotStore>,
    root: Arc<LazyNode>,
}

impl FileSystemAccess {
    pub fn new(probe: impl Probe + 'static, case: CaseSensitivity) -> Self {
        Self::with_store(Arc::new(SnapshotStore::new(case)), Arc::new(probe))
    }

    /// Access layer over an existing store.
    pub fn with_store(store: Arc<SnapshotStore>, probe: Arc<dyn Probe>) -> Self {
        let context = Arc::new(AccessContext::new(Arc::clone(&store), probe));
        Self {
            store,
            root: Arc::new(LazyNode::unknown("/", context)),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn root(&self) -> &Arc<LazyNode> {
        &self.root
    }

    /// The currently published snapshot hierarchy.
    pub fn hierarchy(&self) -> SnapshotHierarchy {
        self.store.current()
    }

    /// Lazy node for `absolute_path`, probing each uncached segment on the way.
    pub fn lookup(&self, absolute_path: &str) -> Result<Arc<LazyNode>, VfsError> {
        path::assert_valid_absolute_path(absolute_path);
        let mut node = Arc::clone(&self.root);
        for name in segments(absolute_path) {
            node = node.get_child(name)?;
        }
        Ok(node)
    }

    /// Record authoritative knowledge, e.g. for a file the caller just wrote.
    ///
    /// The trie is always updated. When the parent is already cached, the child
    /// entry is replaced there too; a cached file or missing entry above the
    /// path is evicted, since the new snapshot shows it is now a directory.
    pub fn record(&self, snapshot: MetadataSnapshot) {
        let absolute_path = snapshot.absolute_path().to_string();
        path::assert_valid_absolute_path(&absolute_path);
        if let Some(leaf) = self.cached_leaf_ancestor(&absolute_path) {
            debug!(path = %absolute_path, leaf = %leaf, "Recorded below cached leaf");
            self.evict_from_root(&leaf, || {
                self.store.update(snapshot);
            });
            return;
        }
        let parent = absolute_path
            .rsplit_once('/')
            .filter(|(_, name)| !name.is_empty());
        match parent {
            Some((parent_path, name)) => match self.cached_node(parent_path) {
                Some(parent) => {
                    parent.get_child_with(name, snapshot);
                }
                None => {
                    self.store.update(snapshot);
                }
            },
            None => {
                self.store.update(snapshot);
            }
        }
    }

    /// Forget everything at and below `absolute_path`.
    ///
    /// The trie is invalidated inside the write section of the cache that
    /// holds the entry, so a concurrent probe cannot publish it again.
    pub fn invalidate(&self, absolute_path: &str) {
        path::assert_valid_absolute_path(absolute_path);
        let relative = &absolute_path[1..];
        if relative.is_empty() {
            let evicted = self.root.evict_all_with(|| {
                self.store.invalidate(absolute_path);
            });
            debug!(evicted, "Invalidated root");
        } else {
            let evicted = self.evict_from_root(relative, || {
                self.store.invalidate(absolute_path);
            });
            debug!(path = %absolute_path, evicted, "Invalidated path");
        }
    }

    pub fn snapshot_at(&self, absolute_path: &str) -> Option<MetadataSnapshot> {
        self.store.snapshot_at(absolute_path)
    }

    /// Cached lazy node for `absolute_path`, without probing.
    pub fn cached_node(&self, absolute_path: &str) -> Option<Arc<LazyNode>> {
        let mut node = Arc::clone(&self.root);
        for name in segments(absolute_path) {
            node = node.cached_child(name)?;
        }
        Some(node)
    }

    /// Evict `relative` below the root, running `on_evict` in the same write
    /// section; restarts when the walk lands on a node detached meanwhile.
    fn evict_from_root<F: FnOnce()>(&self, relative: &str, on_evict: F) -> bool {
        let mut on_evict = on_evict;
        loop {
            match self.root.try_evict_with(relative, on_evict) {
                Ok(evicted) => return evicted,
                Err(returned) => {
                    trace!(path = %relative, "Eviction raced with a detach; retrying");
                    on_evict = returned;
                }
            }
        }
    }

    /// Root-relative path of the first cached file or missing entry strictly
    /// above `absolute_path`.
    fn cached_leaf_ancestor(&self, absolute_path: &str) -> Option<String> {
        let names: Vec<&str> = segments(absolute_path).collect();
        let mut node = Arc::clone(&self.root);
        let mut relative = String::new();
        for name in names.iter().take(names.len().saturating_sub(1)) {
            if !relative.is_empty() {
                relative.push('/');
            }
            relative.push_str(name);
            node = node.cached_child(name)?;
            if node.file_type().is_leaf() {
                return Some(relative);
            }
        }
        None
    }
}

fn segments(absolute_path: &str) -> impl Iterator<Item = &str> {
    absolute_path.split('/').filter(|segment| !segment.is_empty())
}
