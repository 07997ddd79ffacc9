//! Concurrent child caches for lazy access nodes
//!
//! Each lazy node owns one cache. Lookups take a shared read lock; population
//! computes outside the lock and publishes with a double-checked insert, so
//! racing threads converge on the first published value. Unrelated nodes never
//! contend with each other.
//!
//! Every mutation accepts a callback that runs while the write lock is still
//! held. Callers use it to keep the snapshot store in step with the cache.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Map from child name to shared child, populated on demand
pub struct ChildCache<V> {
    entries: RwLock<HashMap<String, Arc<V>>>,
}

impl<V> ChildCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<V>> {
        self.entries.read().get(name).cloned()
    }

    /// Cached value for `name`, computing it with `compute` on a miss.
    ///
    /// `compute` runs without holding the lock and may run in several threads
    /// at once; only the first published result is kept, and `on_insert` runs
    /// for that result alone, before the lock is released.
    pub fn get_or_try_insert_with<E, F, P>(
        &self,
        name: &str,
        compute: F,
        on_insert: P,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
        P: FnOnce(&Arc<V>),
    {
        // Fast path under the read lock
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }
        let computed = Arc::new(compute()?);
        let mut entries = self.entries.write();
        // Double-check: another thread may have published meanwhile
        if let Some(existing) = entries.get(name) {
            return Ok(Arc::clone(existing));
        }
        on_insert(&computed);
        entries.insert(name.to_string(), Arc::clone(&computed));
        Ok(computed)
    }

    /// Publish `value`, replacing anything cached for `name`.
    ///
    /// `on_replace` sees the entry being replaced.
    pub fn replace_with<P>(&self, name: &str, value: Arc<V>, on_replace: P) -> Option<Arc<V>>
    where
        P: FnOnce(Option<&Arc<V>>),
    {
        let mut entries = self.entries.write();
        on_replace(entries.get(name));
        entries.insert(name.to_string(), value)
    }

    /// Drop `name`; `on_remove` runs whether or not an entry was cached.
    pub fn remove_with<P>(&self, name: &str, on_remove: P) -> Option<Arc<V>>
    where
        P: FnOnce(Option<&Arc<V>>),
    {
        let mut entries = self.entries.write();
        on_remove(entries.get(name));
        entries.remove(name)
    }

    /// Drop every entry and return them.
    pub fn clear_with<P>(&self, on_clear: P) -> Vec<Arc<V>>
    where
        P: FnOnce(&[Arc<V>]),
    {
        let mut entries = self.entries.write();
        let values: Vec<Arc<V>> = entries.values().cloned().collect();
        on_clear(&values);
        entries.clear();
        values
    }

    /// Run `f` over the cached values with inserts and removals held off.
    pub fn with_write_lock<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&[Arc<V>]) -> R,
    {
        let entries = self.entries.write();
        let values: Vec<Arc<V>> = entries.values().cloned().collect();
        f(&values)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Cached entries sorted by name.
    pub fn entries(&self) -> Vec<(String, Arc<V>)> {
        let mut entries: Vec<(String, Arc<V>)> = self
            .entries
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), Arc::clone(value)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl<V> Default for ChildCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
