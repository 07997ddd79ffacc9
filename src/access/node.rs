//! Lazy access nodes
//!
//! A lazy node wraps one absolute path and caches the nodes for its children as
//! they are first requested. Uncached children are probed, recorded in the
//! snapshot store and published into the cache; leaf nodes answer every child
//! request with a missing node without probing.
//!
//! Store writes happen inside the owning cache's write section, so a cache
//! entry and its trie knowledge appear and disappear together. Evicted nodes
//! are marked detached along with their cached descendants; whatever they
//! probe afterwards stays out of the store.

use crate::access::probe::Probe;
use crate::concurrency::ChildCache;
use crate::error::VfsError;
use crate::snapshot::{MetadataSnapshot, SnapshotVisitor};
use crate::store::SnapshotStore;
use crate::tree::path;
use crate::types::{CaseSensitivity, FileType};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Collaborators shared by every lazy node of one access tree
pub struct AccessContext {
    pub(crate) store: Arc<SnapshotStore>,
    pub(crate) probe: Arc<dyn Probe>,
    pub(crate) case: CaseSensitivity,
}

impl AccessContext {
    pub fn new(store: Arc<SnapshotStore>, probe: Arc<dyn Probe>) -> Self {
        let case = store.case_sensitivity();
        Self { store, probe, case }
    }

    fn cache_key(&self, name: &str) -> String {
        match self.case {
            CaseSensitivity::Sensitive => name.to_string(),
            CaseSensitivity::Insensitive => name.to_ascii_lowercase(),
        }
    }
}

/// Cache-backed view of one path
pub struct LazyNode {
    absolute_path: String,
    file_type: FileType,
    snapshot: Option<MetadataSnapshot>,
    children: ChildCache<LazyNode>,
    detached: AtomicBool,
    context: Arc<AccessContext>,
}

impl LazyNode {
    /// Node of unknown type, e.g. the root before anything is probed.
    pub fn unknown(absolute_path: impl Into<String>, context: Arc<AccessContext>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            file_type: FileType::Unknown,
            snapshot: None,
            children: ChildCache::new(),
            detached: AtomicBool::new(false),
            context,
        }
    }

    pub fn from_snapshot(snapshot: MetadataSnapshot, context: Arc<AccessContext>) -> Self {
        Self {
            absolute_path: snapshot.absolute_path().to_string(),
            file_type: snapshot.file_type(),
            snapshot: Some(snapshot),
            children: ChildCache::new(),
            detached: AtomicBool::new(false),
            context,
        }
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn snapshot(&self) -> Option<&MetadataSnapshot> {
        self.snapshot.as_ref()
    }

    /// Child named `name`, probing and caching it on first access.
    ///
    /// Probe failures are returned and nothing is cached, so a later call
    /// probes again.
    pub fn get_child(&self, name: &str) -> Result<Arc<LazyNode>, VfsError> {
        assert_valid_name(name);
        let child_path = path::child_path(&self.absolute_path, name);
        if self.file_type.is_leaf() {
            return Ok(self.missing_child(child_path));
        }

        let key = self.context.cache_key(name);
        if let Some(cached) = self.children.get(&key) {
            trace!(path = %child_path, "Lazy node cache hit");
            return Ok(cached);
        }

        self.children.get_or_try_insert_with(
            &key,
            || -> Result<LazyNode, VfsError> {
                let probed = self.context.probe.probe(&child_path)?;
                let snapshot = if probed.absolute_path() == child_path {
                    probed
                } else {
                    probed.with_absolute_path(child_path.as_str())
                };
                debug!(
                    path = %snapshot.absolute_path(),
                    file_type = ?snapshot.file_type(),
                    "Probed path"
                );
                Ok(LazyNode::from_snapshot(snapshot, Arc::clone(&self.context)))
            },
            |published| {
                if self.is_detached() {
                    trace!(path = %published.absolute_path, "Skipped store update below evicted node");
                    return;
                }
                if let Some(snapshot) = &published.snapshot {
                    self.context.store.update(snapshot.clone());
                }
            },
        )
    }

    /// Cache `replacement` as the child named `name` without probing.
    ///
    /// Used when the caller holds authoritative knowledge, e.g. it just wrote
    /// the file. Leaf nodes still answer with a missing node.
    pub fn get_child_with(&self, name: &str, replacement: MetadataSnapshot) -> Arc<LazyNode> {
        assert_valid_name(name);
        let child_path = path::child_path(&self.absolute_path, name);
        if self.file_type.is_leaf() {
            return self.missing_child(child_path);
        }
        let snapshot = replacement.with_absolute_path(child_path);
        let node = Arc::new(LazyNode::from_snapshot(snapshot.clone(), Arc::clone(&self.context)));
        self.children
            .replace_with(&self.context.cache_key(name), Arc::clone(&node), |replaced| {
                if let Some(replaced) = replaced {
                    replaced.detach();
                }
                self.context.store.update(snapshot);
            });
        node
    }

    /// Cached child, without probing.
    pub fn cached_child(&self, name: &str) -> Option<Arc<LazyNode>> {
        self.children.get(&self.context.cache_key(name))
    }

    /// Cached children in name order.
    pub fn cached_children(&self) -> Vec<Arc<LazyNode>> {
        self.children.entries().into_iter().map(|(_, node)| node).collect()
    }

    /// Drop the cached entry at `relative_path` below this node.
    ///
    /// A cached file or missing entry on the way is dropped instead, as the
    /// trie drops a leaf when anything below it is invalidated. Returns whether
    /// anything was evicted.
    pub fn evict(&self, relative_path: &str) -> bool {
        self.try_evict_with(relative_path, || {}).unwrap_or(false)
    }

    /// `evict`, running `on_evict` inside the write section of the cache that
    /// holds (or would hold) the entry.
    ///
    /// Hands `on_evict` back unrun when that cache belongs to a detached node;
    /// the caller retries from the root.
    pub(crate) fn try_evict_with<F: FnOnce()>(
        &self,
        relative_path: &str,
        on_evict: F,
    ) -> Result<bool, F> {
        let (name, rest) = match relative_path.split_once('/') {
            Some((name, rest)) => (name, Some(rest)),
            None => (relative_path, None),
        };
        let key = self.context.cache_key(name);
        if let Some(rest) = rest {
            if let Some(child) = self.children.get(&key) {
                if !child.file_type.is_leaf() {
                    return child.try_evict_with(rest, on_evict);
                }
            }
        }
        let mut pending = Some(on_evict);
        let evicted = self
            .children
            .remove_with(&key, |evicted| {
                if self.is_detached() {
                    return;
                }
                if let Some(evicted) = evicted {
                    evicted.detach();
                }
                if let Some(on_evict) = pending.take() {
                    on_evict();
                }
            })
            .is_some();
        if let Some(on_evict) = pending {
            return Err(on_evict);
        }
        if evicted {
            debug!(path = %path::child_path(&self.absolute_path, name), "Evicted lazy node");
        }
        Ok(evicted)
    }

    /// Drop every cached child, running `on_evict` inside the write section.
    pub(crate) fn evict_all_with<F: FnOnce()>(&self, on_evict: F) -> usize {
        self.children
            .clear_with(|evicted| {
                for node in evicted {
                    node.detach();
                }
                on_evict();
            })
            .len()
    }

    /// Own snapshot first, then cached children in name order.
    pub fn accept<V: SnapshotVisitor + ?Sized>(&self, visitor: &mut V) {
        if let Some(snapshot) = &self.snapshot {
            visitor.visit(snapshot);
        }
        for child in self.cached_children() {
            child.accept(visitor);
        }
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Mark this subtree as no longer reachable from the access root.
    fn detach(&self) {
        self.children.with_write_lock(|children| {
            self.detached.store(true, Ordering::Release);
            for child in children {
                child.detach();
            }
        });
    }

    fn missing_child(&self, child_path: String) -> Arc<LazyNode> {
        Arc::new(LazyNode::from_snapshot(
            MetadataSnapshot::missing(child_path),
            Arc::clone(&self.context),
        ))
    }
}

impl fmt::Debug for LazyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyNode")
            .field("absolute_path", &self.absolute_path)
            .field("file_type", &self.file_type)
            .field("cached_children", &self.children.len())
            .field("detached", &self.is_detached())
            .finish()
    }
}

fn assert_valid_name(name: &str) {
    assert!(
        !name.is_empty() && !name.contains('/'),
        "invalid child name {:?}",
        name
    );
}
