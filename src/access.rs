//! Typed read access shared by the engine and its subset views.
//!
//! Implementors provide environment-aware, interpolated [`Configuration::get`];
//! every typed accessor is layered on top of it. Missing keys never fail:
//! primitive accessors return the zero value (or the supplied default), object
//! accessors return `None`. A present value that does not convert is a
//! [`ConfigError::TypeConversion`].

use crate::error::{ConfigError, Result};
use crate::resolve::FromProperty;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::collections::BTreeMap;

pub trait Configuration {
    /// Resolved value of `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Whether `key` (or its environment overlay) is present.
    fn contains_key(&self, key: &str) -> bool;

    /// All keys, sorted.
    fn keys(&self) -> Vec<String>;

    fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    fn get_parsed<T: FromProperty>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => match T::from_property(&raw) {
                Some(value) => Ok(Some(value)),
                None => Err(ConfigError::conversion(key, raw, T::TYPE_NAME)),
            },
        }
    }

    fn get_or<T: FromProperty>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get_parsed(key)?.unwrap_or(default))
    }

    /// Like [`Configuration::get_parsed`] but a missing key is an error.
    fn get_required<T: FromProperty>(&self, key: &str) -> Result<T> {
        self.get_parsed(key)?.ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn get_required_string(&self, key: &str) -> Result<String> {
        self.get_required(key)
    }

    fn get_int(&self, key: &str) -> Result<i32> {
        self.get_or(key, 0)
    }

    fn get_int_or(&self, key: &str, default: i32) -> Result<i32> {
        self.get_or(key, default)
    }

    fn get_long(&self, key: &str) -> Result<i64> {
        self.get_or(key, 0)
    }

    fn get_long_or(&self, key: &str, default: i64) -> Result<i64> {
        self.get_or(key, default)
    }

    fn get_short(&self, key: &str) -> Result<i16> {
        self.get_or(key, 0)
    }

    fn get_short_or(&self, key: &str, default: i16) -> Result<i16> {
        self.get_or(key, default)
    }

    fn get_byte(&self, key: &str) -> Result<i8> {
        self.get_or(key, 0)
    }

    fn get_byte_or(&self, key: &str, default: i8) -> Result<i8> {
        self.get_or(key, default)
    }

    fn get_bool(&self, key: &str) -> Result<bool> {
        self.get_or(key, false)
    }

    fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        self.get_or(key, default)
    }

    fn get_float(&self, key: &str) -> Result<f32> {
        self.get_or(key, 0.0)
    }

    fn get_float_or(&self, key: &str, default: f32) -> Result<f32> {
        self.get_or(key, default)
    }

    fn get_double(&self, key: &str) -> Result<f64> {
        self.get_or(key, 0.0)
    }

    fn get_double_or(&self, key: &str, default: f64) -> Result<f64> {
        self.get_or(key, default)
    }

    fn get_big_decimal(&self, key: &str) -> Result<Option<BigDecimal>> {
        self.get_parsed(key)
    }

    fn get_big_decimal_or(&self, key: &str, default: BigDecimal) -> Result<BigDecimal> {
        self.get_or(key, default)
    }

    fn get_big_integer(&self, key: &str) -> Result<Option<BigInt>> {
        self.get_parsed(key)
    }

    fn get_big_integer_or(&self, key: &str, default: BigInt) -> Result<BigInt> {
        self.get_or(key, default)
    }

    /// Comma-separated fragments of the value, untrimmed.
    fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|raw| crate::resolve::split_list(&raw))
    }

    fn get_list_or(&self, key: &str, default: Vec<String>) -> Vec<String> {
        self.get_list(key).unwrap_or(default)
    }

    /// The value parsed as `k1=v1,k2=v2`.
    fn get_properties(&self, key: &str) -> Result<Option<BTreeMap<String, String>>> {
        self.get_parsed(key)
    }

    fn get_properties_or(
        &self,
        key: &str,
        default: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        self.get_or(key, default)
    }
}
