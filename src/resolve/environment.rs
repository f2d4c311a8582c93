//! Environment suffix overlays.
//!
//! With suffix `prod` set, a lookup of `db.url` tries `db.url.prod` first and
//! falls back to `db.url`. Overlays live in the same sources as the plain keys.

use crate::bootstrap::ENVIRONMENT_KEY;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Process variable read by [`EnvironmentContext::from_env`].
pub const ENVIRONMENT_VAR: &str = "PROPCONF_ENVIRONMENT";

/// Shared, mutable environment suffix.
///
/// Clones share the same value. Readers see the last written suffix; the
/// configuration only ever reads it.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentContext {
    suffix: Arc<RwLock<String>>,
}

impl EnvironmentContext {
    /// Context with no suffix.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self { suffix: Arc::new(RwLock::new(suffix.into())) }
    }

    /// Context seeded from the `PROPCONF_ENVIRONMENT` process variable.
    pub fn from_env() -> Self {
        Self::with_suffix(std::env::var(ENVIRONMENT_VAR).unwrap_or_default().trim())
    }

    pub fn suffix(&self) -> String {
        self.suffix.read().clone()
    }

    pub fn set_suffix(&self, suffix: impl Into<String>) {
        *self.suffix.write() = suffix.into();
    }

    pub fn clear(&self) {
        self.suffix.write().clear();
    }

    /// Suffix to apply against `values`: the context wins, otherwise the
    /// `propconf.config.environment` property, otherwise none.
    pub fn effective_suffix(&self, values: &BTreeMap<String, String>) -> String {
        let suffix = self.suffix();
        if !suffix.is_empty() {
            return suffix;
        }
        values.get(ENVIRONMENT_KEY).map(|s| s.trim().to_string()).unwrap_or_default()
    }
}

/// Stateless key rewriting for environment overlays.
pub struct EnvironmentResolver;

impl EnvironmentResolver {
    /// Composite key for `key` under `suffix`, if a suffix is active.
    pub fn overlay_key(key: &str, suffix: &str) -> Option<String> {
        (!suffix.is_empty()).then(|| format!("{key}.{suffix}"))
    }

    /// Raw value of `key`, preferring its overlay.
    pub fn lookup<'m>(values: &'m BTreeMap<String, String>, key: &str, suffix: &str) -> Option<&'m str> {
        Self::overlay_key(key, suffix)
            .and_then(|overlay| values.get(&overlay))
            .or_else(|| values.get(key))
            .map(String::as_str)
    }

    pub fn contains(values: &BTreeMap<String, String>, key: &str, suffix: &str) -> bool {
        Self::lookup(values, key, suffix).is_some()
    }
}
