//! `${key}` placeholder substitution.
//!
//! Placeholders are looked up in the merged values (environment overlays
//! applied) and expanded depth first. A placeholder whose key is unknown, or is
//! already being expanded further up the chain, stays in the output verbatim.

use super::environment::EnvironmentResolver;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^${}]+)\}").expect("valid regex"));

pub struct Interpolator<'a> {
    values: &'a BTreeMap<String, String>,
    suffix: &'a str,
}

impl<'a> Interpolator<'a> {
    pub fn new(values: &'a BTreeMap<String, String>, suffix: &'a str) -> Self {
        Self { values, suffix }
    }

    /// Resolve `key` and expand its value.
    pub fn get(&self, key: &str) -> Option<String> {
        let raw = EnvironmentResolver::lookup(self.values, key, self.suffix)?;
        Some(self.expand_value(key, raw))
    }

    /// Expand `raw`, the value found for `key`.
    pub fn expand_value(&self, key: &str, raw: &str) -> String {
        let mut chain = vec![key.to_string()];
        self.expand(raw, &mut chain)
    }

    /// Expand a free-standing string.
    pub fn interpolate(&self, text: &str) -> String {
        self.expand(text, &mut Vec::new())
    }

    // `chain` holds the keys currently being expanded; its length bounds the depth.
    fn expand(&self, text: &str, chain: &mut Vec<String>) -> String {
        if !text.contains("${") {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            let name = name.as_str();
            if chain.iter().any(|active| active == name) {
                out.push_str(whole.as_str());
                continue;
            }
            match EnvironmentResolver::lookup(self.values, name, self.suffix) {
                Some(raw) => {
                    chain.push(name.to_string());
                    let expanded = self.expand(raw, chain);
                    chain.pop();
                    out.push_str(&expanded);
                }
                None => out.push_str(whole.as_str()),
            }
        }
        out.push_str(&text[last..]);
        out
    }
}
