//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Library result alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Error type shared by loading, mutation and typed lookups.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A resource exists but its content could not be parsed.
    #[error("failed to load '{resource}' (line {line}): {message}")]
    Load {
        resource: String,
        line: usize,
        message: String,
    },

    /// A resource exists but could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resource includes itself, directly or through other includes.
    #[error("include cycle detected: {chain}")]
    IncludeCycle { chain: String },

    /// A provider failed to produce its source.
    #[error("provider '{name}' failed: {message}")]
    Provider { name: String, message: String },

    /// Rejected mutation argument (empty key).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The raw value cannot be coerced to the requested type.
    #[error("cannot convert value '{value}' of key '{key}' to {target}")]
    TypeConversion {
        key: String,
        value: String,
        target: &'static str,
    },

    /// A non-defaulting accessor found no value.
    #[error("missing required key '{0}'")]
    MissingKey(String),
}

impl ConfigError {
    /// Creates a parse error for a resource line.
    pub fn load(resource: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Load {
            resource: resource.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a read error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a type conversion error.
    pub fn conversion(key: impl Into<String>, value: impl Into<String>, target: &'static str) -> Self {
        Self::TypeConversion {
            key: key.into(),
            value: value.into(),
            target,
        }
    }

    /// Creates a provider error.
    pub fn provider(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True for failures raised while reading or parsing sources.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Io { .. } | Self::IncludeCycle { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display_names_resource_and_line() {
        let err = ConfigError::load("app.properties", 7, "missing separator");
        let text = err.to_string();
        assert!(text.contains("app.properties"));
        assert!(text.contains("line 7"));
        assert!(err.is_load_error());
    }

    #[test]
    fn conversion_error_display() {
        let err = ConfigError::conversion("simple.key", "abc", "i32");
        assert_eq!(err.to_string(), "cannot convert value 'abc' of key 'simple.key' to i32");
        assert!(!err.is_load_error());
    }
}
