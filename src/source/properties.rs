//! Parser for the `key=value` property file syntax.
//!
//! Besides plain properties the syntax knows two directives:
//! - `include=<names>` merges other resources at the point of declaration
//! - `includeAfter=<names>` merges other resources once the declaring file is done
//!
//! Keys and values must be separated by `=` or `:`. A line that only separates
//! them with whitespace (`key value`) is rejected rather than guessed at.

use crate::error::{ConfigError, Result};

/// Directive key that includes resources in place.
pub const INCLUDE_KEY: &str = "include";
/// Directive key that includes resources after the declaring file.
pub const INCLUDE_AFTER_KEY: &str = "includeAfter";

/// One logical statement of a property file, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Property { key: String, value: String, line: usize },
    Include { names: Vec<String>, after: bool, line: usize },
}

/// Parse the content of a property resource into ordered statements.
pub fn parse_properties(resource: &str, content: &str) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();

    for (line_no, logical) in logical_lines(content) {
        let (raw_key, raw_value) = split_key_value(&logical).ok_or_else(|| {
            ConfigError::load(resource, line_no, format!("expected 'key=value', found '{}'", logical))
        })?;

        let key = unescape(raw_key)
            .map_err(|message| ConfigError::load(resource, line_no, message))?;
        if key.is_empty() {
            return Err(ConfigError::load(resource, line_no, "empty property key"));
        }
        let value = unescape(raw_value)
            .map_err(|message| ConfigError::load(resource, line_no, message))?;

        let statement = match key.as_str() {
            INCLUDE_KEY | INCLUDE_AFTER_KEY => Statement::Include {
                names: value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
                after: key == INCLUDE_AFTER_KEY,
                line: line_no,
            },
            _ => Statement::Property { key, value, line: line_no },
        };
        statements.push(statement);
    }

    Ok(statements)
}

/// Join continuation lines and drop comments, yielding `(first line number, text)`.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, physical) in content.split('\n').enumerate() {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        let trimmed = physical.trim_start();

        let (start, mut text) = match pending.take() {
            Some((start, text)) => (start, text),
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            text.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some((start, text));
        } else {
            text.push_str(trimmed);
            out.push((start, text));
        }
    }

    // A continuation on the last line has nothing to join.
    if let Some((start, text)) = pending {
        if !text.trim().is_empty() {
            out.push((start, text));
        }
    }

    out
}

/// An odd run of trailing backslashes marks a continuation.
fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

/// Split at the first unescaped `=` or `:`.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => {
                let key = trim_unescaped_end(&line[..idx]);
                let value = line[idx + 1..].trim_start();
                return Some((key, value));
            }
            _ => {}
        }
    }
    None
}

/// Trim trailing whitespace that is not escaped with a backslash.
fn trim_unescaped_end(text: &str) -> &str {
    let mut end = text.len();
    while let Some(ch) = text[..end].chars().next_back() {
        if !ch.is_whitespace() {
            break;
        }
        let start = end - ch.len_utf8();
        if ends_with_continuation(&text[..start]) {
            break;
        }
        end = start;
    }
    &text[..end]
}

fn unescape(raw: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0c}'),
            Some('u') => {
                let unit = code_unit(&mut chars)?;
                let code = if (0xD800..=0xDBFF).contains(&unit) {
                    // High surrogate: the low half must follow as another escape.
                    let low = match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => code_unit(&mut chars)?,
                        _ => return Err(format!("unpaired surrogate '\\u{unit:04X}'")),
                    };
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(format!("unpaired surrogate '\\u{unit:04X}'"));
                    }
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    unit
                };
                let decoded = char::from_u32(code)
                    .ok_or_else(|| format!("unpaired surrogate '\\u{unit:04X}'"))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

/// Read the four hex digits of a `\uXXXX` escape.
fn code_unit(chars: &mut std::str::Chars<'_>) -> std::result::Result<u32, String> {
    let hex: String = chars.by_ref().take(4).collect();
    (hex.len() == 4)
        .then(|| u32::from_str_radix(&hex, 16).ok())
        .flatten()
        .ok_or_else(|| format!("malformed \\uxxxx encoding '\\u{}'", hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(content: &str) -> Vec<(String, String)> {
        parse_properties("test.properties", content)
            .expect("parse")
            .into_iter()
            .filter_map(|s| match s {
                Statement::Property { key, value, .. } => Some((key, value)),
                Statement::Include { .. } => None,
            })
            .collect()
    }

    #[test]
    fn parses_separators_and_comments() {
        let parsed = props("# comment\n! also comment\n\na=1\nb : two\n  c= spaced  \nd=\n");
        assert_eq!(
            parsed,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two".to_string()),
                ("c".to_string(), "spaced  ".to_string()),
                ("d".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn value_keeps_later_separators() {
        let parsed = props("simple.propertiesPropertyKey=key1=value1,key2=value2\n");
        assert_eq!(parsed[0].1, "key1=value1,key2=value2");
    }

    #[test]
    fn joins_continuation_lines() {
        let parsed = props("list=item1,\\\n    item2,\\\n    item3\nnext=x\n");
        assert_eq!(parsed[0], ("list".to_string(), "item1,item2,item3".to_string()));
        assert_eq!(parsed[1], ("next".to_string(), "x".to_string()));
    }

    #[test]
    fn even_backslashes_are_not_continuation() {
        let parsed = props("path=C:\\\\\nother=1\n");
        assert_eq!(parsed[0].1, "C:\\");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn decodes_escapes() {
        let parsed = props("a\\=b=tab\\there\nuni=caf\\u00e9\n");
        assert_eq!(parsed[0], ("a=b".to_string(), "tab\there".to_string()));
        assert_eq!(parsed[1].1, "café");
    }

    #[test]
    fn decodes_surrogate_pairs() {
        let parsed = props("smile=\\uD83D\\uDE00\nmixed=a\\ud83d\\ude00b\n");
        assert_eq!(parsed[0].1, "\u{1F600}");
        assert_eq!(parsed[1].1, "a\u{1F600}b");
    }

    #[test]
    fn rejects_unpaired_surrogates() {
        assert!(parse_properties("bad.properties", "k=\\uD83D\n").is_err());
        assert!(parse_properties("bad.properties", "k=\\uD83Dx\n").is_err());
        assert!(parse_properties("bad.properties", "k=\\uD83D\\u0041\n").is_err());
        assert!(parse_properties("bad.properties", "k=\\uDE00\n").is_err());
    }

    #[test]
    fn keeps_escaped_trailing_space_in_key() {
        let parsed = props("a\\ =b\nc\\\\ =d\n");
        assert_eq!(parsed[0], ("a ".to_string(), "b".to_string()));
        assert_eq!(parsed[1], ("c\\".to_string(), "d".to_string()));
    }

    #[test]
    fn rejects_whitespace_separated_line() {
        assert!(parse_properties("bad.properties", "key value\n").is_err());
    }

    #[test]
    fn rejects_line_without_separator() {
        let err = parse_properties("bad.properties", "ok=1\nthis line is broken\n").unwrap_err();
        match err {
            ConfigError::Load { resource, line, .. } => {
                assert_eq!(resource, "bad.properties");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_malformed_unicode_escape() {
        assert!(parse_properties("bad.properties", "k=\\u12G4\n").is_err());
        assert!(parse_properties("bad.properties", "k=\\u12\n").is_err());
    }

    #[test]
    fn rejects_empty_key() {
        assert!(parse_properties("bad.properties", "=value\n").is_err());
    }

    #[test]
    fn recognises_include_directives() {
        let parsed =
            parse_properties("main.properties", "a=1\ninclude=one.properties, two.properties\nincludeAfter=three.properties\n")
                .expect("parse");
        assert_eq!(
            parsed[1],
            Statement::Include {
                names: vec!["one.properties".to_string(), "two.properties".to_string()],
                after: false,
                line: 2,
            }
        );
        assert_eq!(
            parsed[2],
            Statement::Include { names: vec!["three.properties".to_string()], after: true, line: 3 }
        );
    }
}
