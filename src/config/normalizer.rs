//! Line normalizer for the tfvars dialect.
//!
//! Reduces raw configuration text to a list of `key = value` statements plus
//! the contents of the reserved `default_tags` block. Only a constrained
//! subset of the dialect is understood:
//!
//! - `#` and `//` line comments, `/* ... */` block comments
//! - one trailing `#` comment per line (a `#` inside a quoted value is cut
//!   as well; values must not contain it)
//! - arrays spanning several lines, opened by a trailing `[` and closed by
//!   the first line ending in `]`
//! - a single `default_tags = {` block whose closing `}` must start at
//!   column one; an indented `}` does not close it

use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::error::ConfigError;

use super::literal::{coerce, unquote};
use super::model::{ConfigValue, DEFAULT_TAGS_KEY};

/// One `key = value` statement after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// 1-based line where the statement starts.
    pub line: usize,
    /// Left-hand side.
    pub key: String,
    /// Coerced right-hand side.
    pub value: ConfigValue,
}

/// The contents of the `default_tags` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsBlock {
    /// 1-based line of the opening `default_tags = {`.
    pub line: usize,
    /// Collected tag entries.
    pub entries: BTreeMap<String, String>,
}

/// Output of [`LineNormalizer::normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedConfig {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
    /// The extracted tags block, if present.
    pub default_tags: Option<TagsBlock>,
}

/// Stateless entry point; all per-scan state lives in [`ScanState`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LineNormalizer;

/// A multiline array still waiting for its closing bracket.
#[derive(Debug)]
struct PendingArray {
    key: String,
    line: usize,
    text: String,
}

/// Accumulator threaded through one scan.
#[derive(Debug, Default)]
struct ScanState {
    block_comment_from: Option<usize>,
    array: Option<PendingArray>,
    tags: Option<TagsBlock>,
    output: NormalizedConfig,
}

impl LineNormalizer {
    /// Creates a normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalizes configuration text.
    ///
    /// # Errors
    ///
    /// Returns `MalformedConfig` for unterminated arrays, blocks or comments,
    /// lines that are not statements, and literals that cannot be coerced.
    /// Returns `DuplicateKey` if the tags block appears twice.
    pub fn normalize(&self, text: &str) -> Result<NormalizedConfig, ConfigError> {
        let mut state = ScanState::default();

        for (idx, raw) in text.lines().enumerate() {
            Self::scan_line(&mut state, idx + 1, raw)?;
        }

        Self::finish(state)
    }

    fn scan_line(state: &mut ScanState, line_no: usize, raw: &str) -> Result<(), ConfigError> {
        let Some(raw) = Self::skip_block_comments(state, line_no, raw) else {
            return Ok(());
        };
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            return Ok(());
        }

        let line = strip_inline_comment(trimmed).trim_end();
        if line.is_empty() {
            return Ok(());
        }

        if state.tags.is_some() {
            // Closing brace is matched against the untrimmed line.
            if strip_inline_comment(raw).trim_end() == "}" {
                let closed = state.tags.take();
                return Self::store_tags(state, closed, line_no);
            }
            if let Some(tags) = state.tags.as_mut() {
                return Self::collect_tag(tags, line_no, line);
            }
        }

        if let Some(array) = state.array.as_mut() {
            array.text.push(' ');
            array.text.push_str(line);
            if line.ends_with(']') {
                if let Some(done) = state.array.take() {
                    trace!(key = %done.key, line = done.line, "closed multiline array");
                    let value = coerce(&done.key, &done.text, done.line)?;
                    state.output.statements.push(Statement {
                        line: done.line,
                        key: done.key,
                        value,
                    });
                }
            }
            return Ok(());
        }

        let (key, rhs) = split_statement(line, line_no)?;
        let rhs = rhs.trim();

        if key == DEFAULT_TAGS_KEY && rhs == "{" {
            trace!(line = line_no, "opened default_tags block");
            state.tags = Some(TagsBlock {
                line: line_no,
                entries: BTreeMap::new(),
            });
            return Ok(());
        }

        if rhs.ends_with('[') {
            trace!(key, line = line_no, "opened multiline array");
            state.array = Some(PendingArray {
                key: key.to_string(),
                line: line_no,
                text: rhs.to_string(),
            });
            return Ok(());
        }

        let value = coerce(key, rhs, line_no)?;
        trace!(key, line = line_no, kind = value.kind(), "statement");
        state.output.statements.push(Statement {
            line: line_no,
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    /// Returns the part of `raw` outside leading or continuing `/* */`
    /// comments, or `None` when the whole line is commented out.
    fn skip_block_comments<'a>(state: &mut ScanState, line_no: usize, raw: &'a str) -> Option<&'a str> {
        let mut rest = raw;
        loop {
            if state.block_comment_from.is_some() {
                let end = rest.find("*/")?;
                state.block_comment_from = None;
                rest = &rest[end + 2..];
            }
            match rest.trim_start().strip_prefix("/*") {
                Some(after) => {
                    state.block_comment_from = Some(line_no);
                    rest = after;
                }
                None => return Some(rest),
            }
        }
    }

    fn collect_tag(tags: &mut TagsBlock, line_no: usize, line: &str) -> Result<(), ConfigError> {
        if line == "}" {
            return Err(ConfigError::malformed(
                line_no,
                "closing '}' of default_tags must not be indented",
            ));
        }

        let (key, value) = split_statement(line.trim_end_matches(','), line_no)?;
        let key = unquote(key).map_err(|m| ConfigError::malformed(line_no, m))?;
        let value = unquote(value).map_err(|m| ConfigError::malformed(line_no, m))?;

        if tags.entries.insert(key.clone(), value).is_some() {
            return Err(ConfigError::malformed(
                line_no,
                format!("duplicate tag '{key}' in default_tags"),
            ));
        }
        Ok(())
    }

    fn store_tags(
        state: &mut ScanState,
        closed: Option<TagsBlock>,
        line_no: usize,
    ) -> Result<(), ConfigError> {
        let Some(block) = closed else {
            return Ok(());
        };
        if state.output.default_tags.is_some() {
            return Err(ConfigError::DuplicateKey {
                key: DEFAULT_TAGS_KEY.to_string(),
                line: block.line,
            });
        }
        trace!(line = line_no, tags = block.entries.len(), "closed default_tags block");
        state.output.default_tags = Some(block);
        Ok(())
    }

    fn finish(state: ScanState) -> Result<NormalizedConfig, ConfigError> {
        if let Some(array) = state.array {
            return Err(ConfigError::malformed(
                array.line,
                format!("array '{}' is never closed with ']'", array.key),
            ));
        }
        if let Some(tags) = state.tags {
            return Err(ConfigError::malformed(
                tags.line,
                "default_tags block is never closed with '}'",
            ));
        }
        if let Some(line) = state.block_comment_from {
            return Err(ConfigError::malformed(line, "block comment is never closed with '*/'"));
        }

        debug!(
            statements = state.output.statements.len(),
            tags = state.output.default_tags.is_some(),
            "normalized configuration"
        );
        Ok(state.output)
    }
}

/// Cuts everything from the first `#` onwards.
fn strip_inline_comment(line: &str) -> &str {
    line.find('#').map_or(line, |idx| &line[..idx])
}

/// Splits `key = value` on the first `=`.
fn split_statement(line: &str, line_no: usize) -> Result<(&str, &str), ConfigError> {
    let (key, rhs) = line
        .split_once('=')
        .ok_or_else(|| ConfigError::malformed(line_no, format!("expected 'key = value', found '{line}'")))?;
    let key = key.trim();

    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(ConfigError::malformed(line_no, format!("invalid key '{key}'")));
    }
    Ok((key, rhs))
}
