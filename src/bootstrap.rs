//! Bootstrap settings and the parameter keys the engine reads about itself.
//!
//! The optional `propconf-config.properties` resource is read before anything
//! else. It may override the resource load order and decide how registered
//! providers are composed with the file-based configuration.

use crate::error::{ConfigError, Result};
use crate::resolve::FromProperty;
use crate::source::{PropertySource, SourceLoader};
use tracing::debug;

/// Resource holding bootstrap settings.
pub const BOOTSTRAP_FILE_NAME: &str = "propconf-config.properties";

pub const RESOURCE_ORDER_KEY: &str = "propconf.config.resource.order";
pub const PROVIDERS_ENABLED_KEY: &str = "propconf.config.providers.enabled";
pub const PROVIDERS_APPEND_DEFAULT_KEY: &str = "propconf.config.providers.append.default";

/// Property naming the environment suffix when the context has none.
pub const ENVIRONMENT_KEY: &str = "propconf.config.environment";
/// Append process environment variables as a final source.
pub const USE_ENV_PROPERTIES_KEY: &str = "propconf.config.parameters.useEnvProperties";
/// Comma list of variable name prefixes to import.
pub const ENV_PREFIXES_KEY: &str = "propconf.config.parameters.env.prefixes";
/// Log every parameter after each load.
pub const DUMP_CONSOLE_KEY: &str = "propconf.config.parameters.dump.console";

/// Framework defaults, application settings, local developer overrides.
pub const DEFAULT_LOAD_ORDER: [&str; 3] = [
    "propconf-defaults.properties",
    "propconf-app.properties",
    "propconf-local.properties",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub resource_order: Vec<String>,
    pub providers_enabled: bool,
    pub append_default: bool,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            resource_order: default_load_order(),
            providers_enabled: true,
            append_default: true,
        }
    }
}

impl Bootstrap {
    /// Read the bootstrap resource; a missing resource gives the defaults.
    pub fn load(loader: &SourceLoader) -> Result<Self> {
        let source = loader.load(BOOTSTRAP_FILE_NAME)?;
        let bootstrap = Self::from_source(&source)?;
        debug!(order = ?bootstrap.resource_order, "bootstrap settings");
        Ok(bootstrap)
    }

    pub fn from_source(source: &PropertySource) -> Result<Self> {
        let order = parse_string_array(source.get(RESOURCE_ORDER_KEY));
        Ok(Self {
            resource_order: if order.is_empty() { default_load_order() } else { order },
            providers_enabled: read_flag(source, PROVIDERS_ENABLED_KEY, true)?,
            append_default: read_flag(source, PROVIDERS_APPEND_DEFAULT_KEY, true)?,
        })
    }
}

fn read_flag(source: &PropertySource, key: &str, default: bool) -> Result<bool> {
    match source.get(key) {
        None => Ok(default),
        Some(raw) => {
            bool::from_property(raw).ok_or_else(|| ConfigError::conversion(key, raw, bool::TYPE_NAME))
        }
    }
}

pub fn default_load_order() -> Vec<String> {
    DEFAULT_LOAD_ORDER.iter().map(|s| s.to_string()).collect()
}

/// Split a comma list, trimming entries and dropping empty ones.
pub fn parse_string_array(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// True when no prefixes are configured or `key` starts with one of them.
pub fn is_allowed_key_prefix(prefixes: Option<&[String]>, key: &str) -> bool {
    match prefixes {
        None => true,
        Some(prefixes) if prefixes.is_empty() => true,
        Some(prefixes) => prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())),
    }
}
