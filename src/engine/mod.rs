//! The resolution engine.
//!
//! ```text
//! SourceLoader ──► [PropertySource, ...] ──► MergedConfiguration ──┐
//!                                                                  │
//!     get(key) ◄── Interpolator ◄── EnvironmentResolver ◄──────────┤
//!                                                                  │
//!     get_sub_properties(prefix, truncate) ◄── SubsetCache ◄───────┘
//! ```
//!
//! The merged map and the subset cache sit behind one lock: every mutation
//! replaces map content and drops cached subsets in the same write section.

use crate::access::Configuration;
use crate::bootstrap::{parse_string_array, DUMP_CONSOLE_KEY, ENV_PREFIXES_KEY, USE_ENV_PROPERTIES_KEY};
use crate::builder::{ConfigBuilder, ConfigProvider};
use crate::error::{ConfigError, Result};
use crate::resolve::{EnvironmentContext, EnvironmentResolver, FromProperty, Interpolator};
use crate::source::{environment_source, PropertySource, SourceLoader};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, trace, warn};

pub mod cache;
pub mod listener;
pub mod merged;
pub mod view;

pub use cache::{filter_prefix, CacheStats, SubProperties, SubsetCache};
pub use listener::{ChangeEvent, ChangeListener};
pub use merged::{MergedConfiguration, RUNTIME_ORIGIN};
pub use view::ConfigView;

use listener::ListenerRegistry;

/// Everything needed to rebuild the merged configuration from scratch.
#[derive(Clone, Default)]
pub(crate) struct LoadPlan {
    pub loader: SourceLoader,
    pub resources: Vec<String>,
    pub sources: Vec<PropertySource>,
    pub providers: Vec<Arc<dyn ConfigProvider>>,
    pub load_defaults: bool,
    pub skip_failed_providers: bool,
}

impl LoadPlan {
    /// Sources in precedence order: resources, inline sources, process
    /// environment (when enabled), then providers. The first registered
    /// provider is folded last so it wins over every later one.
    fn load(&self) -> Result<Vec<PropertySource>> {
        let mut sources = Vec::new();

        if self.load_defaults {
            sources.extend(self.loader.load_all(&self.resources)?);
            sources.extend(self.sources.iter().cloned());

            let merged = MergedConfiguration::from_sources(&sources);
            let use_env = match merged.get(USE_ENV_PROPERTIES_KEY) {
                Some(raw) => bool::from_property(raw).ok_or_else(|| {
                    ConfigError::conversion(USE_ENV_PROPERTIES_KEY, raw, bool::TYPE_NAME)
                })?,
                None => false,
            };
            if use_env {
                let prefixes = parse_string_array(merged.get(ENV_PREFIXES_KEY));
                let prefixes = (!prefixes.is_empty()).then_some(prefixes.as_slice());
                sources.push(environment_source(prefixes));
            }
        }

        for provider in self.providers.iter().rev() {
            match provider.load() {
                Ok(source) => sources.push(source),
                Err(e) if self.skip_failed_providers => {
                    warn!(provider = provider.name(), error = %e, "skipping failed provider");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(sources)
    }
}

impl std::fmt::Debug for LoadPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadPlan")
            .field("resources", &self.resources)
            .field("sources", &self.sources.len())
            .field("providers", &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("load_defaults", &self.load_defaults)
            .finish()
    }
}

#[derive(Debug, Default)]
struct State {
    merged: MergedConfiguration,
    cache: SubsetCache,
}

/// One resolved key as reported by [`LayeredConfiguration::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub key: String,
    pub value: String,
    pub raw: String,
    pub origin: String,
}

/// Layered configuration: merged sources, environment overlays, interpolation
/// and cached subsets behind a thread-safe read/write API.
#[derive(Debug)]
pub struct LayeredConfiguration {
    plan: LoadPlan,
    environment: EnvironmentContext,
    state: RwLock<State>,
    listeners: ListenerRegistry,
}

impl LayeredConfiguration {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Configuration over in-memory sources only; `refresh` folds them again.
    pub fn from_sources(sources: Vec<PropertySource>, environment: EnvironmentContext) -> Result<Self> {
        let plan = LoadPlan { sources, load_defaults: true, ..LoadPlan::default() };
        Self::with_plan(plan, environment)
    }

    pub(crate) fn with_plan(plan: LoadPlan, environment: EnvironmentContext) -> Result<Self> {
        let merged = Self::merge(&plan)?;
        let config = Self {
            plan,
            environment,
            state: RwLock::new(State { merged, cache: SubsetCache::new() }),
            listeners: ListenerRegistry::default(),
        };
        config.dump_if_requested();
        Ok(config)
    }

    fn merge(plan: &LoadPlan) -> Result<MergedConfiguration> {
        let sources = plan.load()?;
        let merged = MergedConfiguration::from_sources(&sources);
        info!(sources = sources.len(), keys = merged.len(), "configuration loaded");
        Ok(merged)
    }

    pub fn environment(&self) -> &EnvironmentContext {
        &self.environment
    }

    /// Resource names in load order.
    pub fn resources(&self) -> &[String] {
        &self.plan.resources
    }

    pub fn len(&self) -> usize {
        self.state.read().merged.len()
    }

    /// Value of `key` with the environment overlay applied but no interpolation.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        let state = self.state.read();
        let values = state.merged.values();
        let suffix = self.environment.effective_suffix(values);
        EnvironmentResolver::lookup(values, key, &suffix).map(str::to_string)
    }

    /// Name of the source that supplied the value `get(key)` would use.
    pub fn origin(&self, key: &str) -> Option<String> {
        let state = self.state.read();
        let values = state.merged.values();
        let suffix = self.environment.effective_suffix(values);
        EnvironmentResolver::overlay_key(key, &suffix)
            .filter(|overlay| values.contains_key(overlay))
            .and_then(|overlay| state.merged.origin(&overlay).map(str::to_string))
            .or_else(|| state.merged.origin(key).map(str::to_string))
    }

    /// Shared snapshot of the raw merged values.
    pub fn snapshot(&self) -> Arc<BTreeMap<String, String>> {
        self.state.read().merged.shared()
    }

    /// Read-only view of the keys starting with `prefix`, not stripped.
    pub fn subset(&self, prefix: &str) -> ConfigView {
        let (entries, all) = self.cached_subset(prefix, false);
        ConfigView::new(prefix, entries, all, self.environment.clone())
    }

    /// Raw key/values under `prefix`, served from the subset cache.
    pub fn get_sub_properties(&self, prefix: &str, truncate: bool) -> SubProperties {
        self.cached_subset(prefix, truncate).0
    }

    fn cached_subset(&self, prefix: &str, truncate: bool) -> (SubProperties, Arc<BTreeMap<String, String>>) {
        let state = self.state.upgradable_read();
        if let Some(view) = state.cache.lookup(prefix, truncate) {
            trace!(prefix, truncate, "subset cache hit");
            return (view, state.merged.shared());
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        trace!(prefix, truncate, "subset cache miss");
        let view = Arc::new(filter_prefix(state.merged.values(), prefix, truncate));
        state.cache.insert(prefix, truncate, Arc::clone(&view));
        (view, state.merged.shared())
    }

    pub fn subset_cache_stats(&self) -> CacheStats {
        self.state.read().cache.stats()
    }

    /// Overwrite `key`.
    pub fn set_property(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.mutate(|merged| merged.set(key, value));
        self.listeners.notify(ChangeEvent::Set { key: key.to_string() });
        Ok(())
    }

    /// Append `value` to the current value of `key` (comma-joined), or set it.
    pub fn add_property(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.mutate(|merged| merged.append(key, value));
        self.listeners.notify(ChangeEvent::Added { key: key.to_string() });
        Ok(())
    }

    /// Remove `key`. Returns whether it was present.
    pub fn clear_property(&self, key: &str) -> bool {
        let removed = self.mutate(|merged| merged.remove(key));
        if removed {
            self.listeners.notify(ChangeEvent::Cleared { key: key.to_string() });
        }
        removed
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.mutate(MergedConfiguration::clear);
        self.listeners.notify(ChangeEvent::ClearedAll);
    }

    /// Reload every source with the same load plan, discarding runtime changes.
    /// On failure the current state is kept.
    pub fn refresh(&self) -> Result<()> {
        let merged = Self::merge(&self.plan)?;
        self.mutate(|current| *current = merged);
        self.dump_if_requested();
        self.listeners.notify(ChangeEvent::Refreshed);
        Ok(())
    }

    pub fn add_listener(&self, listener: Arc<dyn ChangeListener>) {
        self.listeners.add(listener);
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut MergedConfiguration) -> R) -> R {
        let mut state = self.state.write();
        let result = f(&mut state.merged);
        state.cache.invalidate();
        result
    }

    /// Every key with its interpolated value, raw value and origin.
    pub fn describe(&self) -> Vec<ResolvedEntry> {
        let state = self.state.read();
        let values = state.merged.values();
        let suffix = self.environment.effective_suffix(values);
        let interpolator = Interpolator::new(values, &suffix);
        values
            .iter()
            .map(|(key, raw)| ResolvedEntry {
                key: key.clone(),
                value: interpolator.expand_value(key, raw),
                raw: raw.clone(),
                origin: state.merged.origin(key).unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Sorted `key=value [origin]` lines of the raw merged values.
    pub fn dump(&self) -> String {
        let state = self.state.read();
        state
            .merged
            .values()
            .iter()
            .map(|(key, value)| {
                format!("{key}={value} [{}]", state.merged.origin(key).unwrap_or_default())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn dump_if_requested(&self) {
        if !matches!(self.get_bool(DUMP_CONSOLE_KEY), Ok(true)) {
            return;
        }
        for line in self.dump().lines() {
            info!("{line}");
        }
    }
}

impl Configuration for LayeredConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        let state = self.state.read();
        let values = state.merged.values();
        let suffix = self.environment.effective_suffix(values);
        Interpolator::new(values, &suffix).get(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        let state = self.state.read();
        let values = state.merged.values();
        let suffix = self.environment.effective_suffix(values);
        EnvironmentResolver::contains(values, key, &suffix)
    }

    fn keys(&self) -> Vec<String> {
        self.state.read().merged.values().keys().cloned().collect()
    }

    fn is_empty(&self) -> bool {
        self.state.read().merged.is_empty()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ConfigError::InvalidArgument("property key must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn config(pairs: &[(&str, &str)]) -> LayeredConfiguration {
        let source = PropertySource::from_pairs("test", pairs.iter().copied());
        LayeredConfiguration::from_sources(vec![source], EnvironmentContext::new()).expect("config")
    }

    #[test]
    fn set_rejects_empty_key_and_keeps_state() {
        let cfg = config(&[("a", "1")]);
        let err = cfg.set_property("", "x").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgument(_)));
        assert!(cfg.add_property("", "x").is_err());
        assert_eq!(cfg.keys(), vec!["a"]);
    }

    #[test]
    fn mutations_invalidate_subset_cache() {
        let cfg = config(&[("p.a", "1"), ("p.b", "2"), ("q.c", "3")]);

        let first = cfg.get_sub_properties("p.", true);
        let second = cfg.get_sub_properties("p.", true);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cfg.subset_cache_stats(), CacheStats { hits: 1, misses: 1, entries: 1 });

        cfg.set_property("p.a", "changed").expect("set");
        assert_eq!(cfg.subset_cache_stats().entries, 0);
        let third = cfg.get_sub_properties("p.", true);
        assert_eq!(third.get("a").map(String::as_str), Some("changed"));
        assert_eq!(cfg.subset_cache_stats().misses, 2);
    }

    #[test]
    fn clear_property_reports_presence() {
        let cfg = config(&[("a", "1")]);
        assert!(cfg.clear_property("a"));
        assert!(!cfg.clear_property("a"));
        assert!(cfg.is_empty());
    }

    #[test]
    fn listeners_see_successful_mutations_only() {
        let cfg = config(&[("a", "1")]);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        cfg.add_listener(Arc::new(move |event: &ChangeEvent| sink.lock().push(event.clone())));

        cfg.set_property("a", "2").expect("set");
        let _ = cfg.set_property("", "2");
        cfg.add_property("a", "3").expect("add");
        cfg.clear_property("a");
        cfg.clear_property("a");
        cfg.clear();
        cfg.refresh().expect("refresh");

        assert_eq!(
            *events.lock(),
            vec![
                ChangeEvent::Set { key: "a".to_string() },
                ChangeEvent::Added { key: "a".to_string() },
                ChangeEvent::Cleared { key: "a".to_string() },
                ChangeEvent::ClearedAll,
                ChangeEvent::Refreshed,
            ]
        );
    }

    #[test]
    fn listener_may_read_configuration() {
        let cfg = Arc::new(config(&[("a", "1")]));
        let seen = Arc::new(Mutex::new(None));
        let reader = Arc::downgrade(&cfg);
        let sink = Arc::clone(&seen);
        cfg.add_listener(Arc::new(move |_: &ChangeEvent| {
            if let Some(cfg) = reader.upgrade() {
                *sink.lock() = cfg.get("a");
            }
        }));

        cfg.set_property("a", "2").expect("set");
        assert_eq!(seen.lock().as_deref(), Some("2"));
    }

    #[test]
    fn origin_follows_overlay_and_runtime_writes() {
        let defaults = PropertySource::from_pairs("defaults.properties", [("k", "1")]);
        let app = PropertySource::from_pairs("app.properties", [("k.prod", "2")]);
        let env = EnvironmentContext::new();
        let cfg = LayeredConfiguration::from_sources(vec![defaults, app], env.clone()).expect("config");

        assert_eq!(cfg.origin("k").as_deref(), Some("defaults.properties"));
        env.set_suffix("prod");
        assert_eq!(cfg.origin("k").as_deref(), Some("app.properties"));
        env.clear();

        cfg.set_property("k", "3").expect("set");
        assert_eq!(cfg.origin("k").as_deref(), Some(RUNTIME_ORIGIN));
        assert!(cfg.origin("missing").is_none());
    }

    #[test]
    fn describe_reports_interpolated_and_raw() {
        let cfg = config(&[("a", "1"), ("b", "${a}-x")]);
        let entries = cfg.describe();
        let b = entries.iter().find(|e| e.key == "b").expect("b");
        assert_eq!(b.value, "1-x");
        assert_eq!(b.raw, "${a}-x");
        assert_eq!(b.origin, "test");
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let cfg = Arc::new(config(&[("p.a", "0")]));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cfg = Arc::clone(&cfg);
                std::thread::spawn(move || {
                    for n in 0..200 {
                        if i == 0 {
                            cfg.set_property("p.a", &n.to_string()).expect("set");
                        } else {
                            let view = cfg.get_sub_properties("p.", false);
                            assert_eq!(view.len(), 1);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }
        assert_eq!(cfg.get("p.a").as_deref(), Some("199"));
    }
}
