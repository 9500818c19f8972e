//! Error types for the preflight gate.
//!
//! This module provides the error hierarchy for every stage of a run:
//! reading and parsing the configuration, typed access to the parsed model,
//! and the cloud inventory lookup.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the preflight gate.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cloud inventory errors.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration text is structurally malformed.
    #[error("Malformed configuration at line {line}: {message}")]
    MalformedConfig {
        /// 1-based source line of the offending statement.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A top-level key was defined more than once.
    #[error("Duplicate key '{key}' at line {line}")]
    DuplicateKey {
        /// The duplicated key.
        key: String,
        /// 1-based source line of the second definition.
        line: usize,
    },

    /// A key required by a check is absent.
    #[error("Missing key: {key}")]
    MissingKey {
        /// The missing key.
        key: String,
    },

    /// A key holds a value of the wrong kind.
    #[error("Key '{key}' should be a {expected}, found {found}")]
    TypeMismatch {
        /// The offending key.
        key: String,
        /// Expected value kind.
        expected: &'static str,
        /// Actual value kind.
        found: &'static str,
    },

    /// A secondary document (rule catalog, export) could not be handled.
    #[error("Failed to parse {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },
}

/// Cloud inventory errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Credentials were rejected or missing.
    #[error("Cloud authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// The inventory endpoint could not be reached.
    #[error("Network error querying cloud inventory: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// The inventory answered with something unusable.
    #[error("Invalid inventory response: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Result type alias for preflight operations.
pub type Result<T> = std::result::Result<T, PreflightError>;

impl ConfigError {
    /// Creates a malformed-config error for a source line.
    #[must_use]
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedConfig {
            line,
            message: message.into(),
        }
    }

    /// Creates a missing-key error.
    #[must_use]
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }
}

impl InventoryError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid-response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
