//! Shared story cache.
//!
//! Maps item ids to the [`DisplayItem`] built for them.  The cache is shared
//! by every request for the life of the process: it only ever grows, and an
//! entry, once written, is never replaced.  Only eligible items are stored.
//!
//! The cache is an ordinary value handed to the orchestrator, not a global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::source::{DisplayItem, ItemId};

/// Cheaply cloneable handle to the shared map.
#[derive(Debug, Clone, Default)]
pub struct StoryCache {
    inner: Arc<Mutex<HashMap<ItemId, DisplayItem>>>,
}

impl StoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<ItemId, DisplayItem>> {
        // Every write is a single map operation, so a poisoned map is still
        // consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return a copy of the cached item for `id`, if any.
    pub fn lookup(&self, id: ItemId) -> Option<DisplayItem> {
        self.map().get(&id).cloned()
    }

    /// Store `item` under its id.
    ///
    /// Write-once: if an entry already exists it is kept and `false` is
    /// returned.
    pub fn insert(&self, item: DisplayItem) -> bool {
        let mut map = self.map();
        if map.contains_key(&item.id()) {
            return false;
        }
        map.insert(item.id(), item);
        true
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }
}
