//! Process environment variables as a property source.

use super::PropertySource;
use crate::bootstrap::is_allowed_key_prefix;

/// Name given to the source built from environment variables.
pub const ENV_SOURCE_NAME: &str = "env";

/// Snapshot the process environment, keeping only variables whose name starts
/// with one of `prefixes` (all variables when no prefixes are given).
pub fn environment_source(prefixes: Option<&[String]>) -> PropertySource {
    source_from_vars(std::env::vars(), prefixes)
}

/// Build the environment source from an explicit variable list.
pub fn source_from_vars<I>(vars: I, prefixes: Option<&[String]>) -> PropertySource
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut vars: Vec<(String, String)> =
        vars.into_iter().filter(|(name, _)| is_allowed_key_prefix(prefixes, name)).collect();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    PropertySource::from_pairs(ENV_SOURCE_NAME, vars)
}
