//! Right-hand-side literal coercion.
//!
//! Turns the text after `=` into a [`ConfigValue`]: booleans, quoted strings,
//! numbers, bracketed string lists and inline maps. Anything else falls back
//! to a bare string.

use std::collections::BTreeMap;

use crate::error::ConfigError;

use super::model::ConfigValue;

/// Coerces the raw right-hand side of `key = value` at `line`.
///
/// # Errors
///
/// Returns `MalformedConfig` when a structured literal is opened but cannot
/// be read (unterminated string, unclosed list, nested collections).
pub fn coerce(key: &str, raw: &str, line: usize) -> Result<ConfigValue, ConfigError> {
    let text = raw.trim();
    let fail = |message: &str| ConfigError::malformed(line, format!("value for '{key}': {message}"));

    if text.is_empty() {
        return Err(fail("missing value"));
    }

    if text.eq_ignore_ascii_case("true") {
        return Ok(ConfigValue::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(ConfigValue::Bool(false));
    }

    if text.starts_with('"') {
        let (value, rest) = read_quoted(text).map_err(|m| fail(m))?;
        if !rest.trim().is_empty() {
            return Err(fail("unexpected text after closing quote"));
        }
        return Ok(ConfigValue::String(value));
    }

    if let Some(inner) = text.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| fail("list is missing its closing ']'"))?;
        return read_list(inner).map(ConfigValue::StringList).map_err(|m| fail(m));
    }

    if let Some(inner) = text.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .ok_or_else(|| fail("map is missing its closing '}'"))?;
        return read_map(inner).map(ConfigValue::StringMap).map_err(|m| fail(&m));
    }

    if is_numeric(text) {
        if let Ok(n) = text.parse::<f64>() {
            return Ok(ConfigValue::Number(n));
        }
    }

    Ok(ConfigValue::String(text.to_string()))
}

/// Strips surrounding quotes from a tag-block value, resolving escapes.
/// Bare values are returned trimmed.
pub(crate) fn unquote(raw: &str) -> Result<String, &'static str> {
    let text = raw.trim();
    if text.starts_with('"') {
        let (value, rest) = read_quoted(text)?;
        if !rest.trim().is_empty() {
            return Err("unexpected text after closing quote");
        }
        Ok(value)
    } else {
        Ok(text.to_string())
    }
}

/// Reads a double-quoted string from the start of `text`.
/// Returns the unescaped value and the remainder after the closing quote.
fn read_quoted(text: &str) -> Result<(String, &str), &'static str> {
    let mut value = String::new();
    let mut escaped = false;

    for (idx, c) in text.char_indices().skip(1) {
        if escaped {
            value.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Ok((value, &text[idx + 1..]));
        } else {
            value.push(c);
        }
    }

    Err("unterminated string")
}

/// Reads the inside of a `[ ... ]` list into strings.
fn read_list(inner: &str) -> Result<Vec<String>, &'static str> {
    let mut items = Vec::new();
    let mut rest = inner.trim_start();

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix(',') {
            rest = stripped.trim_start();
            continue;
        }

        if rest.starts_with('[') || rest.starts_with('{') {
            return Err("nested collections are not supported");
        }

        if rest.starts_with('"') {
            let (value, after) = read_quoted(rest)?;
            let after = after.trim_start();
            if !after.is_empty() && !after.starts_with(',') {
                return Err("list elements must be separated by ','");
            }
            items.push(value);
            rest = after;
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            let token = rest[..end].trim();
            if token.contains('"') {
                return Err("stray quote in list element");
            }
            items.push(token.to_string());
            rest = rest[end..].trim_start();
        }
    }

    Ok(items)
}

/// Reads the inside of an inline `{ k = v, ... }` map.
fn read_map(inner: &str) -> Result<BTreeMap<String, String>, String> {
    let mut map = BTreeMap::new();

    for entry in split_outside_quotes(inner, ',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry
            .split_once('=')
            .or_else(|| entry.split_once(':'))
            .ok_or_else(|| format!("map entry '{entry}' has no '='"))?;
        let key = unquote(key).map_err(str::to_string)?;
        let value = unquote(value).map_err(str::to_string)?;
        if map.insert(key.clone(), value).is_some() {
            return Err(format!("duplicate map key '{key}'"));
        }
    }

    Ok(map)
}

/// Splits on `sep` wherever it is not inside a double-quoted section.
fn split_outside_quotes(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' && in_quotes {
            escaped = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&text[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// `f64::from_str` also accepts `inf` and `NaN`; only plain decimals count here.
fn is_numeric(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    (first.is_ascii_digit() || first == '-' || first == '+')
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(raw: &str) -> ConfigValue {
        coerce("k", raw, 1).unwrap()
    }

    #[test]
    fn test_booleans_are_case_insensitive() {
        assert_eq!(ok("true"), ConfigValue::Bool(true));
        assert_eq!(ok("FALSE"), ConfigValue::Bool(false));
        assert_eq!(ok("True"), ConfigValue::Bool(true));
    }

    #[test]
    fn test_quoted_string_with_escapes() {
        assert_eq!(ok(r#""a \"quoted\" word""#), ConfigValue::String(r#"a "quoted" word"#.to_string()));
    }

    #[test]
    fn test_quoted_true_stays_string() {
        assert_eq!(ok("\"true\""), ConfigValue::String("true".to_string()));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(ok("42"), ConfigValue::Number(42.0));
        assert_eq!(ok("-1.5"), ConfigValue::Number(-1.5));
    }

    #[test]
    fn test_version_like_text_is_not_a_number() {
        assert_eq!(ok("1.2.3"), ConfigValue::String("1.2.3".to_string()));
    }

    #[test]
    fn test_list_with_trailing_comma() {
        assert_eq!(
            ok(r#"["10.0.1.0/24", "10.0.2.0/24",]"#),
            ConfigValue::StringList(vec!["10.0.1.0/24".to_string(), "10.0.2.0/24".to_string()])
        );
        assert_eq!(ok("[]"), ConfigValue::StringList(vec![]));
    }

    #[test]
    fn test_inline_map() {
        let ConfigValue::StringMap(map) = ok(r#"{ team = "infra", "cost-center" = "42" }"#) else {
            panic!("expected map");
        };
        assert_eq!(map.get("team").map(String::as_str), Some("infra"));
        assert_eq!(map.get("cost-center").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_bare_fallback() {
        assert_eq!(ok("null"), ConfigValue::String("null".to_string()));
    }

    #[test]
    fn test_unterminated_string_is_malformed() {
        let err = coerce("name", "\"abc", 7).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedConfig { line: 7, .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_nested_list_is_malformed() {
        assert!(coerce("k", r#"[["a"]]"#, 1).is_err());
    }

    #[test]
    fn test_unclosed_list_is_malformed() {
        assert!(coerce("k", r#"["a", "b""#, 1).is_err());
    }
}
