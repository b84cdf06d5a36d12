//! Map cache: memoized resolution results, one entry per hierarchy member.
//!
//! The cache is an explicitly owned object (constructed with the listener,
//! torn down with it), not process-global state. Entries are written once,
//! in a single batch per hierarchy, and never overwritten or evicted, so
//! resolution runs at most once per family for the cache's lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ClassId;
use crate::map::DiscriminatorMap;
use crate::resolve::Resolution;

/// Memoized resolution result for one class.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// The hierarchy-wide tag → class map, shared by every family member.
    pub map: Arc<DiscriminatorMap>,
    /// This class's own discriminator tag (`None` for an untagged root).
    pub discr: Option<String>,
    /// True for the unique class with no parent in this hierarchy.
    pub is_root: bool,
}

/// Cache of resolved discriminator maps, keyed by class identity.
#[derive(Clone, Debug, Default)]
pub struct MapCache {
    entries: HashMap<ClassId, CacheEntry>,
}

impl MapCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, class: ClassId) -> Option<&CacheEntry> {
        self.entries.get(&class)
    }

    /// Insert-if-absent: a present entry is never overwritten.
    ///
    /// Returns `true` if the entry was newly inserted.
    pub fn insert(&mut self, class: ClassId, entry: CacheEntry) -> bool {
        use std::collections::hash_map::Entry;
        match self.entries.entry(class) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    #[inline]
    pub fn contains(&self, class: ClassId) -> bool {
        self.entries.contains_key(&class)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write one entry per class discovered by `resolution`, in one batch.
    ///
    /// The root receives an entry even when it declared no tag, so its own
    /// load event can still inject the map and the subclass list.
    pub fn populate(&mut self, resolution: &Resolution) {
        let map = Arc::new(resolution.map.clone());
        for (class, tag) in &resolution.per_class {
            self.insert(
                *class,
                CacheEntry {
                    map: Arc::clone(&map),
                    discr: Some(tag.clone()),
                    is_root: *class == resolution.root,
                },
            );
        }
        if !self.contains(resolution.root) {
            self.insert(
                resolution.root,
                CacheEntry {
                    map,
                    discr: None,
                    is_root: true,
                },
            );
        }
    }
}
