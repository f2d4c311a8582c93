//! propconf: layered property-file configuration.
//!
//! Property resources are merged in a fixed order, later sources overriding
//! earlier ones. Lookups honour an environment suffix (`key.<env>` before
//! `key`) and expand `${other.key}` placeholders. Typed accessors convert the
//! resolved text on demand.
//!
//! ```no_run
//! use propconf::{Configuration, LayeredConfiguration};
//!
//! let config = LayeredConfiguration::builder().search_root("conf").build()?;
//! let port = config.get_int_or("server.port", 8080)?;
//! # Ok::<(), propconf::ConfigError>(())
//! ```

pub mod access;
pub mod bootstrap;
pub mod builder;
pub mod engine;
pub mod error;
pub mod resolve;
pub mod source;

pub use access::Configuration;
pub use builder::{ConfigBuilder, ConfigProvider};
pub use engine::{
    CacheStats, ChangeEvent, ChangeListener, ConfigView, LayeredConfiguration, ResolvedEntry,
    SubProperties,
};
pub use error::{ConfigError, Result};
pub use resolve::{EnvironmentContext, FromProperty};
pub use source::{PropertySource, ResourceLocator, SourceLoader};
