//! Platform version comparison.
//!
//! All version gates go through [`compare_versions`]. The default mode
//! compares normalized strings lexicographically, so `23.10.0` sorts before
//! `23.2.0`. [`VersionComparison::Semantic`] compares dotted numeric
//! components instead.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How version strings are ordered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VersionComparison {
    /// Plain string ordering of the normalized versions.
    #[default]
    Lexicographic,
    /// Component-wise numeric ordering; pre-releases sort before releases.
    Semantic,
}

/// Normalizes a version: trims whitespace and quotes, lowercases and drops
/// a leading `v`.
#[must_use]
pub fn normalize_version(raw: &str) -> String {
    let text = raw.trim().trim_matches('"').trim().to_ascii_lowercase();
    text.strip_prefix('v').map_or_else(|| text.clone(), str::to_string)
}

/// Compares two version strings.
#[must_use]
pub fn compare_versions(left: &str, right: &str, mode: VersionComparison) -> Ordering {
    let left = normalize_version(left);
    let right = normalize_version(right);

    match mode {
        VersionComparison::Lexicographic => left.cmp(&right),
        VersionComparison::Semantic => compare_semantic(&left, &right),
    }
}

fn compare_semantic(left: &str, right: &str) -> Ordering {
    let (left_core, left_pre) = split_prerelease(left);
    let (right_core, right_pre) = split_prerelease(right);

    let left_parts: Vec<&str> = left_core.split('.').collect();
    let right_parts: Vec<&str> = right_core.split('.').collect();

    for idx in 0..left_parts.len().max(right_parts.len()) {
        let a = left_parts.get(idx).copied().unwrap_or("0");
        let b = right_parts.get(idx).copied().unwrap_or("0");
        let ord = match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.cmp(b),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    match (left_pre, right_pre) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

fn split_prerelease(version: &str) -> (&str, Option<&str>) {
    let version = version.split('+').next().unwrap_or(version);
    match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_version(" \"v23.1.0\" "), "23.1.0");
        assert_eq!(normalize_version("V24.2.1"), "24.2.1");
        assert_eq!(normalize_version("24.2.1"), "24.2.1");
    }

    #[test]
    fn test_older_patch_is_less_in_both_modes() {
        for mode in [VersionComparison::Lexicographic, VersionComparison::Semantic] {
            assert_eq!(compare_versions("v23.0.9", "v23.1.0", mode), Ordering::Less);
        }
    }

    #[test]
    fn test_lexicographic_double_digit_minor() {
        assert_eq!(
            compare_versions("v23.10.0", "v23.2.0", VersionComparison::Lexicographic),
            Ordering::Less
        );
        assert_eq!(
            compare_versions("v23.10.0", "v23.2.0", VersionComparison::Semantic),
            Ordering::Greater
        );
    }

    #[test]
    fn test_semantic_prerelease_and_padding() {
        assert_eq!(
            compare_versions("v24.1.0-rc1", "v24.1.0", VersionComparison::Semantic),
            Ordering::Less
        );
        assert_eq!(
            compare_versions("v24.1", "v24.1.0", VersionComparison::Semantic),
            Ordering::Equal
        );
    }
}
