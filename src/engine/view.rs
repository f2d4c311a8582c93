//! Read-only subset views.

use crate::access::Configuration;
use crate::resolve::{EnvironmentContext, EnvironmentResolver, Interpolator};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Keys of a configuration that start with a prefix, kept verbatim.
///
/// The view is a snapshot taken at creation. Placeholders still resolve
/// against every key of that snapshot, not only the ones inside the prefix,
/// and environment overlays follow the shared [`EnvironmentContext`].
#[derive(Debug, Clone)]
pub struct ConfigView {
    prefix: String,
    entries: Arc<BTreeMap<String, String>>,
    all: Arc<BTreeMap<String, String>>,
    environment: EnvironmentContext,
}

impl ConfigView {
    pub(crate) fn new(
        prefix: &str,
        entries: Arc<BTreeMap<String, String>>,
        all: Arc<BTreeMap<String, String>>,
        environment: EnvironmentContext,
    ) -> Self {
        Self { prefix: prefix.to_string(), entries, all, environment }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Raw entries of the view.
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Configuration for ConfigView {
    fn get(&self, key: &str) -> Option<String> {
        let suffix = self.environment.effective_suffix(&self.all);
        let raw = EnvironmentResolver::lookup(&self.entries, key, &suffix)?;
        Some(Interpolator::new(&self.all, &suffix).expand_value(key, raw))
    }

    fn contains_key(&self, key: &str) -> bool {
        let suffix = self.environment.effective_suffix(&self.all);
        EnvironmentResolver::contains(&self.entries, key, &suffix)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
