//! Configuration loader.
//!
//! This module reads a tfvars file from disk (or a string), runs it through
//! the normalizer and the model builder, and locates the file when no path
//! is given.

use crate::error::{ConfigError, PreflightError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::builder::ConfigModelBuilder;
use super::model::ConfigModel;
use super::normalizer::LineNormalizer;

/// Configuration parser for loading deployment configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving the `.env` file.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a tfvars file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ConfigModel> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(PreflightError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PreflightError::Config(ConfigError::ParseError {
                message: format!("file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_str(&content)
    }

    /// Parses configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or defines a key twice.
    pub fn parse_str(&self, content: &str) -> Result<ConfigModel> {
        debug!("Parsing tfvars configuration");

        let normalized = LineNormalizer::new().normalize(content)?;
        let model = ConfigModelBuilder::new().build(normalized)?;

        debug!("Successfully parsed configuration with {} keys", model.len());
        Ok(model)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                PreflightError::Config(ConfigError::ParseError {
                    message: format!(".env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["terraform.tfvars", "deploy.tfvars", "preflight.tfvars"];

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(PreflightError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
# Network
flag_create_new_vpc   = true
flag_use_existing_vpc = false
vpc_new_private_subnets = [
  "10.0.1.0/24",
  "10.0.2.0/24",
]

default_tags = {
  Owner = "platform"
}
"#;

    #[test]
    fn test_parse_str() {
        let model = ConfigParser::new().parse_str(SAMPLE).unwrap();
        assert!(model.bool("flag_create_new_vpc").unwrap());
        assert_eq!(model.string_list("vpc_new_private_subnets").unwrap().len(), 2);
        assert!(model.default_tags().is_some());
    }

    #[test]
    fn test_parsing_twice_is_identical() {
        let parser = ConfigParser::new();
        let first = parser.parse_str(SAMPLE).unwrap();
        let second = parser.parse_str(SAMPLE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let result = ConfigParser::new().load_file(temp.path().join("nope.tfvars"));
        assert!(matches!(
            result,
            Err(PreflightError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp.path().join("terraform.tfvars"), SAMPLE).unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, temp.path().join("terraform.tfvars"));

        let model = ConfigParser::new().load_file(found).unwrap();
        assert!(model.contains_key("flag_use_existing_vpc"));
    }
}
