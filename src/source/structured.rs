//! TOML, YAML and JSON resources flattened into dotted property keys.

use crate::error::{ConfigError, Result};
use serde_json::Value;

/// Structured formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Toml,
    Yaml,
    Json,
}

impl StructuredFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a structured document and flatten it into `(key, value)` pairs.
///
/// Tables become dotted key segments. Arrays of scalars are comma-joined, other
/// arrays use the element index as a key segment.
pub fn parse_structured(
    resource: &str,
    format: StructuredFormat,
    content: &str,
) -> Result<Vec<(String, String)>> {
    let value: Value = match format {
        StructuredFormat::Toml => {
            let raw: toml::Value = toml::from_str(content)
                .map_err(|e| ConfigError::load(resource, 0, format!("invalid TOML: {e}")))?;
            serde_json::to_value(raw)
                .map_err(|e| ConfigError::load(resource, 0, format!("invalid TOML: {e}")))?
        }
        StructuredFormat::Yaml => {
            let raw: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|e| ConfigError::load(resource, 0, format!("invalid YAML: {e}")))?;
            serde_json::to_value(raw)
                .map_err(|e| ConfigError::load(resource, 0, format!("invalid YAML: {e}")))?
        }
        StructuredFormat::Json => serde_json::from_str(content)
            .map_err(|e| ConfigError::load(resource, e.line(), format!("invalid JSON: {e}")))?,
    };

    let mut out = Vec::new();
    match value {
        Value::Object(_) => flatten("", &value, &mut out),
        Value::Null => {}
        _ => {
            return Err(ConfigError::load(resource, 0, "top level must be a table or mapping"));
        }
    }
    Ok(out)
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&join_key(prefix, key), child, out);
            }
        }
        Value::Array(items) if items.iter().all(is_scalar) => {
            let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(",");
            out.push((prefix.to_string(), joined));
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten(&join_key(prefix, &idx.to_string()), child, out);
            }
        }
        scalar => out.push((prefix.to_string(), scalar_text(scalar))),
    }
}

fn join_key(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
