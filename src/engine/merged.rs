//! The merged key/value map folded from all sources.

use crate::resolve::LIST_DELIMITER;
use crate::source::PropertySource;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Origin recorded for values written through the mutation API.
pub const RUNTIME_ORIGIN: &str = "runtime";

/// Single authoritative view of all sources, last source winning per key.
///
/// Values sit behind an `Arc` so subset views can share a snapshot; mutations
/// copy on write.
#[derive(Debug, Clone, Default)]
pub struct MergedConfiguration {
    values: Arc<BTreeMap<String, String>>,
    origins: HashMap<String, String>,
}

impl MergedConfiguration {
    /// Fold `sources` in order.
    pub fn from_sources(sources: &[PropertySource]) -> Self {
        let mut values = BTreeMap::new();
        let mut origins = HashMap::new();
        for entry in sources.iter().flat_map(PropertySource::entries) {
            values.insert(entry.key.clone(), entry.value.clone());
            origins.insert(entry.key.clone(), entry.origin.clone());
        }
        Self { values: Arc::new(values), origins }
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Cheap shared handle to the current values.
    pub fn shared(&self) -> Arc<BTreeMap<String, String>> {
        Arc::clone(&self.values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn origin(&self, key: &str) -> Option<&str> {
        self.origins.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        Arc::make_mut(&mut self.values).insert(key.to_string(), value.to_string());
        self.origins.insert(key.to_string(), RUNTIME_ORIGIN.to_string());
    }

    /// Append `value` to an existing value as another list element.
    pub fn append(&mut self, key: &str, value: &str) {
        let joined = match self.values.get(key) {
            Some(existing) => format!("{existing}{LIST_DELIMITER}{value}"),
            None => value.to_string(),
        };
        self.set(key, &joined);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.origins.remove(key);
        Arc::make_mut(&mut self.values).remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.values = Arc::new(BTreeMap::new());
        self.origins.clear();
    }
}
