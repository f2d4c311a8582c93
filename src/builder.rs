//! Assembling a [`LayeredConfiguration`] from resources, inline sources and
//! explicitly registered providers.

use crate::bootstrap::Bootstrap;
use crate::engine::{LayeredConfiguration, LoadPlan};
use crate::error::Result;
use crate::resolve::EnvironmentContext;
use crate::source::{PropertySource, ResourceLocator, SourceLoader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// An additional origin of properties registered at startup.
///
/// Provider sources override the file-based configuration. Among providers the
/// first registered one takes precedence.
pub trait ConfigProvider: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self) -> Result<PropertySource>;
}

/// A fixed source is its own provider.
impl ConfigProvider for PropertySource {
    fn name(&self) -> &str {
        PropertySource::name(self)
    }

    fn load(&self) -> Result<PropertySource> {
        Ok(self.clone())
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    roots: Vec<PathBuf>,
    resources: Option<Vec<String>>,
    sources: Vec<PropertySource>,
    providers: Vec<Arc<dyn ConfigProvider>>,
    environment: Option<EnvironmentContext>,
    providers_enabled: Option<bool>,
    append_default: Option<bool>,
    skip_failed_providers: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory to search for resources. Without any, the current
    /// directory is searched.
    pub fn search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Append a resource to load. Setting any resource replaces the
    /// bootstrap resource order.
    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.resources.get_or_insert_with(Vec::new).push(name.into());
        self
    }

    pub fn resources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.get_or_insert_with(Vec::new).extend(names.into_iter().map(Into::into));
        self
    }

    /// In-memory source folded after the resources.
    pub fn source(mut self, source: PropertySource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn environment(mut self, environment: EnvironmentContext) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Override the bootstrap `providers.enabled` setting.
    pub fn providers_enabled(mut self, enabled: bool) -> Self {
        self.providers_enabled = Some(enabled);
        self
    }

    /// Override the bootstrap `providers.append.default` setting.
    pub fn append_default(mut self, append: bool) -> Self {
        self.append_default = Some(append);
        self
    }

    /// Log and skip providers that fail instead of failing the load.
    pub fn skip_failed_providers(mut self, skip: bool) -> Self {
        self.skip_failed_providers = skip;
        self
    }

    /// Read the bootstrap settings and perform the first load.
    pub fn build(self) -> Result<LayeredConfiguration> {
        let locator = if self.roots.is_empty() {
            ResourceLocator::current_dir()
        } else {
            ResourceLocator::new(self.roots)
        };
        let loader = SourceLoader::new(locator);
        let bootstrap = Bootstrap::load(&loader)?;

        let providers_enabled = self.providers_enabled.unwrap_or(bootstrap.providers_enabled);
        let append_default = self.append_default.unwrap_or(bootstrap.append_default);
        let providers = if providers_enabled { self.providers } else { Vec::new() };

        // Without providers the file-based configuration is always used.
        let load_defaults = providers.is_empty() || append_default;
        let resources = self.resources.unwrap_or(bootstrap.resource_order);
        debug!(?resources, providers = providers.len(), load_defaults, "building configuration");

        let plan = LoadPlan {
            loader,
            resources,
            sources: self.sources,
            providers,
            load_defaults,
            skip_failed_providers: self.skip_failed_providers,
        };
        LayeredConfiguration::with_plan(plan, self.environment.unwrap_or_else(EnvironmentContext::from_env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Configuration;
    use crate::error::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    struct FailingProvider;

    impl ConfigProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn load(&self) -> Result<PropertySource> {
            Err(ConfigError::provider("failing", "backend unavailable"))
        }
    }

    fn tree() -> TempDir {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("propconf-defaults.properties"), "k=defaults\nin.defaults=1\n")
            .expect("write");
        fs::write(tmp.path().join("propconf-app.properties"), "k=app\n").expect("write");
        tmp
    }

    #[test]
    fn uses_default_resource_order() {
        let tmp = tree();
        let cfg = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .build()
            .expect("build");
        assert_eq!(cfg.get("k").as_deref(), Some("app"));
        assert_eq!(cfg.get("in.defaults").as_deref(), Some("1"));
        assert_eq!(cfg.resources().len(), 3);
    }

    #[test]
    fn providers_override_files() {
        let tmp = tree();
        let cfg = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .provider(Arc::new(PropertySource::from_pairs("extra-first", [("k", "first")])))
            .provider(Arc::new(PropertySource::from_pairs(
                "extra-second",
                [("k", "second"), ("only.second", "2")],
            )))
            .build()
            .expect("build");
        assert_eq!(cfg.get("k").as_deref(), Some("first"));
        assert_eq!(cfg.origin("k").as_deref(), Some("extra-first"));
        assert_eq!(cfg.get("in.defaults").as_deref(), Some("1"));
        assert_eq!(cfg.get("only.second").as_deref(), Some("2"));
    }

    #[test]
    fn append_default_false_drops_files() {
        let tmp = tree();
        let cfg = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .append_default(false)
            .provider(Arc::new(PropertySource::from_pairs("only", [("p", "1")])))
            .build()
            .expect("build");
        assert_eq!(cfg.keys(), vec!["p"]);
    }

    #[test]
    fn disabled_providers_are_ignored() {
        let tmp = tree();
        let cfg = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .providers_enabled(false)
            .append_default(false)
            .provider(Arc::new(PropertySource::from_pairs("only", [("k", "provider")])))
            .build()
            .expect("build");
        assert_eq!(cfg.get("k").as_deref(), Some("app"));
    }

    #[test]
    fn failing_provider_fails_or_is_skipped() {
        let tmp = tree();
        let err = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .provider(Arc::new(FailingProvider))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Provider { .. }));

        let cfg = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .provider(Arc::new(FailingProvider))
            .skip_failed_providers(true)
            .build()
            .expect("build");
        assert_eq!(cfg.get("k").as_deref(), Some("app"));
    }

    #[test]
    fn explicit_resources_replace_bootstrap_order() {
        let tmp = tree();
        fs::write(tmp.path().join("custom.properties"), "k=custom\n").expect("write");
        let cfg = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .resource("custom.properties")
            .build()
            .expect("build");
        assert_eq!(cfg.get("k").as_deref(), Some("custom"));
        assert!(!cfg.contains_key("in.defaults"));
    }

    #[test]
    fn env_properties_are_imported_when_enabled() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("app.properties"),
            "propconf.config.parameters.useEnvProperties=true\n\
             propconf.config.parameters.env.prefixes=PROPCONF_BUILDER_TEST_\n",
        )
        .expect("write");
        std::env::set_var("PROPCONF_BUILDER_TEST_VALUE", "from-env");

        let cfg = ConfigBuilder::new()
            .search_root(tmp.path())
            .environment(EnvironmentContext::new())
            .resource("app.properties")
            .build()
            .expect("build");
        assert_eq!(cfg.get("PROPCONF_BUILDER_TEST_VALUE").as_deref(), Some("from-env"));
        assert_eq!(cfg.origin("PROPCONF_BUILDER_TEST_VALUE").as_deref(), Some("env"));
        assert!(!cfg.contains_key("PATH"));
    }
}
