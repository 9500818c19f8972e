//! Configuration module for the preflight gate.
//!
//! This module handles everything up to the typed model:
//! - Normalizing tfvars text into statements and the tags block
//! - Coercing literals into typed values
//! - Building the immutable `ConfigModel`
//! - Fingerprinting the model for run correlation

mod builder;
mod hash;
mod literal;
mod model;
mod normalizer;
mod parser;

pub use builder::ConfigModelBuilder;
pub use hash::ConfigFingerprint;
pub use literal::coerce;
pub use model::{ConfigModel, ConfigValue, DEFAULT_TAGS_KEY};
pub use normalizer::{LineNormalizer, NormalizedConfig, Statement, TagsBlock};
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
