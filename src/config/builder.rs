//! Assembles the [`ConfigModel`] from normalized statements.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

use crate::error::ConfigError;

use super::model::{ConfigModel, ConfigValue, DEFAULT_TAGS_KEY};
use super::normalizer::NormalizedConfig;

/// Builds the immutable configuration model.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigModelBuilder;

impl ConfigModelBuilder {
    /// Creates a builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the model, attaching the tags block under `default_tags`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` when a key is defined twice, including a
    /// top-level `default_tags` statement alongside a tags block.
    pub fn build(&self, normalized: NormalizedConfig) -> Result<ConfigModel, ConfigError> {
        let mut entries: BTreeMap<String, ConfigValue> = BTreeMap::new();

        if let Some(tags) = normalized.default_tags {
            entries.insert(DEFAULT_TAGS_KEY.to_string(), ConfigValue::StringMap(tags.entries));
        }

        for statement in normalized.statements {
            match entries.entry(statement.key) {
                Entry::Occupied(slot) => {
                    return Err(ConfigError::DuplicateKey {
                        key: slot.key().clone(),
                        line: statement.line,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(statement.value);
                }
            }
        }

        debug!("Built configuration model with {} keys", entries.len());
        Ok(ConfigModel::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::normalizer::LineNormalizer;

    fn build(text: &str) -> Result<ConfigModel, ConfigError> {
        let normalized = LineNormalizer::new().normalize(text)?;
        ConfigModelBuilder::new().build(normalized)
    }

    #[test]
    fn test_duplicate_key_is_an_error() {
        let err = build("a = 1\nb = 2\na = 3\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateKey {
                key: "a".to_string(),
                line: 3,
            }
        );
    }

    #[test]
    fn test_tags_block_attached_under_reserved_key() {
        let model = build("default_tags = {\nteam = \"infra\"\n}\nregion = \"eu-west-1\"\n").unwrap();
        assert_eq!(model.len(), 2);
        let tags = model.default_tags().unwrap();
        assert_eq!(tags.get("team").map(String::as_str), Some("infra"));
    }

    #[test]
    fn test_top_level_default_tags_collides_with_block() {
        let err = build("default_tags = {\n}\ndefault_tags = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey { line: 3, .. }));
    }

    #[test]
    fn test_inline_default_tags_map_is_accepted() {
        let model = build("default_tags = { team = \"infra\" }\n").unwrap();
        assert_eq!(model.default_tags().map(BTreeMap::len), Some(1));
    }
}
