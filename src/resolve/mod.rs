//! Read-time resolution: environment overlays, interpolation and conversion.

pub mod convert;
pub mod environment;
pub mod interpolate;

pub use convert::{parse_key_values, split_list, FromProperty, LIST_DELIMITER};
pub use environment::{EnvironmentContext, EnvironmentResolver, ENVIRONMENT_VAR};
pub use interpolate::Interpolator;
