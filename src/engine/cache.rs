//! Memoised prefix subsets of the merged configuration.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Filtered key/value view, shared between callers.
pub type SubProperties = Arc<BTreeMap<String, String>>;

/// Hit/miss counters of a [`SubsetCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Cache of `(prefix, truncate)` views.
///
/// Entries are never refreshed on their own; the owner calls
/// [`SubsetCache::invalidate`] whenever the underlying map changes.
#[derive(Debug, Default)]
pub struct SubsetCache {
    entries: HashMap<(String, bool), SubProperties>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SubsetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached view, counting the hit or miss.
    pub fn lookup(&self, prefix: &str, truncate: bool) -> Option<SubProperties> {
        let found = self.entries.get(&(prefix.to_string(), truncate)).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&mut self, prefix: &str, truncate: bool, view: SubProperties) {
        self.entries.insert((prefix.to_string(), truncate), view);
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

/// Keys of `values` starting with `prefix`, optionally with the prefix removed.
pub fn filter_prefix(
    values: &BTreeMap<String, String>,
    prefix: &str,
    truncate: bool,
) -> BTreeMap<String, String> {
    values
        .range(prefix.to_string()..)
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| {
            let key = if truncate { &key[prefix.len()..] } else { key.as_str() };
            (key.to_string(), value.clone())
        })
        .collect()
}
