//! Rule catalog and evaluation.
//!
//! This module provides:
//! - The check types and their evaluation
//! - Version comparison used by version gates
//! - The built-in and YAML-loaded rule catalogs
//! - The engine that runs a catalog and collects a report

mod catalog;
mod checks;
mod engine;
mod outcome;
mod version;

pub use catalog::{InventoryTarget, RuleCatalog};
pub use checks::{
    Check, CheckContext, DEFAULT_SENTINEL, DependencyRule, FlagGroup, InventorySnapshot, Predicate,
    ReferenceSource, Severity, SubnetPrivacyRule, cidr_subset,
};
pub use engine::{FailurePolicy, RuleEngine};
pub use outcome::{CheckResult, OutcomeCounts, ValidationOutcome, ValidationReport};
pub use version::{VersionComparison, compare_versions, normalize_version};
