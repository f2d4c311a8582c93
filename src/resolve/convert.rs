//! Conversion of raw property text into typed values.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Separator for list and map values.
pub const LIST_DELIMITER: char = ',';

/// A type that can be read from a raw property value.
pub trait FromProperty: Sized {
    /// Name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Convert `raw`, or `None` when it is malformed for this type.
    fn from_property(raw: &str) -> Option<Self>;
}

macro_rules! from_property_via_str {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FromProperty for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_property(raw: &str) -> Option<Self> {
                    <$ty>::from_str(raw.trim()).ok()
                }
            }
        )*
    };
}

from_property_via_str! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    f32 => "f32",
    f64 => "f64",
    BigDecimal => "BigDecimal",
    BigInt => "BigInteger",
}

impl FromProperty for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_property(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "y" | "t" | "1" => Some(true),
            "false" | "no" | "off" | "n" | "f" | "0" => Some(false),
            _ => None,
        }
    }
}

impl FromProperty for String {
    const TYPE_NAME: &'static str = "String";

    fn from_property(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromProperty for Vec<String> {
    const TYPE_NAME: &'static str = "list";

    fn from_property(raw: &str) -> Option<Self> {
        Some(split_list(raw))
    }
}

impl FromProperty for BTreeMap<String, String> {
    const TYPE_NAME: &'static str = "properties";

    fn from_property(raw: &str) -> Option<Self> {
        parse_key_values(raw)
    }
}

/// Split a list value on commas. Fragments are not trimmed; an empty value is
/// an empty list.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(LIST_DELIMITER).map(str::to_string).collect()
}

/// Parse `k1=v1,k2=v2` into a map. Returns `None` when a fragment has no `=`.
pub fn parse_key_values(raw: &str) -> Option<BTreeMap<String, String>> {
    split_list(raw)
        .into_iter()
        .map(|fragment| {
            fragment
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}
