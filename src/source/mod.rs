//! Property sources and the loader that reads them from resources.

use crate::error::{ConfigError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod env;
pub mod locator;
pub mod properties;
pub mod structured;

pub use env::{environment_source, ENV_SOURCE_NAME};
pub use locator::ResourceLocator;
use properties::{parse_properties, Statement};
use structured::{parse_structured, StructuredFormat};

/// One key/value pair together with the resource that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    pub key: String,
    pub value: String,
    pub origin: String,
}

/// An ordered, named list of properties. Later entries win over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySource {
    name: String,
    entries: Vec<PropertyEntry>,
}

impl PropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: Vec::new() }
    }

    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::new(name);
        for (key, value) in pairs {
            source.push(key, value);
        }
        source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[PropertyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a property declared by this source itself.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let origin = self.name.clone();
        self.push_with_origin(key, value, origin);
    }

    /// Append a property declared by another resource (an include).
    pub fn push_with_origin(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        origin: impl Into<String>,
    ) {
        self.entries.push(PropertyEntry {
            key: key.into(),
            value: value.into(),
            origin: origin.into(),
        });
    }

    /// Effective value of `key` inside this source.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().rev().find(|e| e.key == key).map(|e| e.value.as_str())
    }

    /// Collapse to the effective key/value map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.iter().map(|e| (e.key.clone(), e.value.clone())).collect()
    }
}

/// Reads named resources into [`PropertySource`]s.
///
/// A resource that cannot be located is an empty source. A resource that
/// exists but cannot be read or parsed fails the load.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    locator: ResourceLocator,
}

impl SourceLoader {
    pub fn new(locator: ResourceLocator) -> Self {
        Self { locator }
    }

    /// Load every resource in order; the result keeps that order.
    pub fn load_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<PropertySource>> {
        names.iter().map(|name| self.load(name.as_ref())).collect()
    }

    /// Load one resource, following its include directives.
    pub fn load(&self, name: &str) -> Result<PropertySource> {
        let mut source = PropertySource::new(name);
        let mut stack = Vec::new();
        self.load_into(name, None, &mut stack, &mut source)?;
        debug!(resource = name, keys = source.len(), "loaded property source");
        Ok(source)
    }

    fn load_into(
        &self,
        name: &str,
        relative_to: Option<&Path>,
        stack: &mut Vec<PathBuf>,
        out: &mut PropertySource,
    ) -> Result<()> {
        let Some(path) = self.locator.locate(name, relative_to) else {
            debug!(resource = name, "resource not found, using empty source");
            return Ok(());
        };

        let canonical = fs::canonicalize(&path).map_err(|e| ConfigError::io(&path, e))?;
        if stack.contains(&canonical) {
            let chain = stack
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ConfigError::IncludeCycle { chain });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        if let Some(format) = StructuredFormat::from_extension(ext) {
            for (key, value) in parse_structured(name, format, &content)? {
                out.push_with_origin(key, value, name);
            }
            return Ok(());
        }

        let statements = parse_properties(name, &content)?;
        let parent = path.parent().map(Path::to_path_buf);
        stack.push(canonical);

        let mut deferred = Vec::new();
        for statement in statements {
            match statement {
                Statement::Property { key, value, .. } => out.push_with_origin(key, value, name),
                Statement::Include { names, after: false, .. } => {
                    for include in names {
                        debug!(resource = name, include = %include, "including resource");
                        self.load_into(&include, parent.as_deref(), stack, out)?;
                    }
                }
                Statement::Include { names, after: true, .. } => deferred.extend(names),
            }
        }

        for include in deferred {
            debug!(resource = name, include = %include, "including resource after declaring file");
            self.load_into(&include, parent.as_deref(), stack, out)?;
        }

        stack.pop();
        Ok(())
    }
}
