//! Typed configuration model.
//!
//! The model is a flat, ordered mapping from keys to [`ConfigValue`]s. It is
//! produced once by the builder and never mutated afterwards; every accessor
//! borrows immutably and fails fast with a [`ConfigError`] naming the key.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigError;

/// Reserved key under which the `default_tags` block is stored.
pub const DEFAULT_TAGS_KEY: &str = "default_tags";

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// `true` / `false`, matched case-insensitively.
    Bool(bool),
    /// Quoted string or bare fallback text.
    String(String),
    /// Numeric literal.
    Number(f64),
    /// Bracketed list of strings.
    StringList(Vec<String>),
    /// Key/value map, e.g. the tags block.
    StringMap(BTreeMap<String, String>),
}

impl ConfigValue {
    /// Returns the name of this value's kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::StringList(_) => "list",
            Self::StringMap(_) => "map",
        }
    }

    /// Returns the boolean, if this is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::StringList(items) => write!(f, "[{}]", items.join(", ")),
            Self::StringMap(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
        }
    }
}

/// The parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigModel {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigModel {
    /// Wraps already-validated entries. Only the builder constructs models.
    pub(crate) const fn from_entries(entries: BTreeMap<String, ConfigValue>) -> Self {
        Self { entries }
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Returns true if the key is present, whatever its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the value for a key or a `MissingKey` error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent.
    pub fn require(&self, key: &str) -> Result<&ConfigValue, ConfigError> {
        self.entries.get(key).ok_or_else(|| ConfigError::missing(key))
    }

    /// Reads a boolean key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a bool.
    pub fn bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.require(key)?;
        value.as_bool().ok_or_else(|| mismatch(key, "bool", value))
    }

    /// Reads a string key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a string.
    pub fn str(&self, key: &str) -> Result<&str, ConfigError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| mismatch(key, "string", value))
    }

    /// Reads a list-of-strings key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a list.
    pub fn string_list(&self, key: &str) -> Result<&[String], ConfigError> {
        match self.require(key)? {
            ConfigValue::StringList(items) => Ok(items),
            other => Err(mismatch(key, "list", other)),
        }
    }

    /// Reads a map key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a map.
    pub fn string_map(&self, key: &str) -> Result<&BTreeMap<String, String>, ConfigError> {
        match self.require(key)? {
            ConfigValue::StringMap(map) => Ok(map),
            other => Err(mismatch(key, "map", other)),
        }
    }

    /// Returns the `default_tags` block, if the file declared one.
    #[must_use]
    pub fn default_tags(&self) -> Option<&BTreeMap<String, String>> {
        match self.entries.get(DEFAULT_TAGS_KEY) {
            Some(ConfigValue::StringMap(map)) => Some(map),
            _ => None,
        }
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the model holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the model as the flat JSON object handed to downstream stages.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            message: format!("model export: {e}"),
            location: None,
        })
    }
}

fn mismatch(key: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigModel {
        let mut entries = BTreeMap::new();
        entries.insert("flag".to_string(), ConfigValue::Bool(true));
        entries.insert("name".to_string(), ConfigValue::String("prod".to_string()));
        entries.insert(
            "subnets".to_string(),
            ConfigValue::StringList(vec!["10.0.1.0/24".to_string()]),
        );
        ConfigModel::from_entries(entries)
    }

    #[test]
    fn test_typed_accessors() {
        let model = sample();
        assert!(model.bool("flag").unwrap());
        assert_eq!(model.str("name").unwrap(), "prod");
        assert_eq!(model.string_list("subnets").unwrap(), ["10.0.1.0/24"]);
    }

    #[test]
    fn test_missing_key_is_reported_by_name() {
        let err = sample().bool("absent").unwrap_err();
        assert_eq!(err, ConfigError::missing("absent"));
    }

    #[test]
    fn test_type_mismatch() {
        let err = sample().bool("name").unwrap_err();
        assert_eq!(
            err,
            ConfigError::TypeMismatch {
                key: "name".to_string(),
                expected: "bool",
                found: "string",
            }
        );
    }

    #[test]
    fn test_json_export_is_flat() {
        let json = sample().to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["flag"], serde_json::json!(true));
        assert_eq!(parsed["subnets"], serde_json::json!(["10.0.1.0/24"]));
    }

    #[test]
    fn test_number_display() {
        assert_eq!(ConfigValue::Number(2.0).to_string(), "2");
        assert_eq!(ConfigValue::Number(1.5).to_string(), "1.5");
    }
}
