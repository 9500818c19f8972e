// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfvars preflight
//!
//! A pre-deployment gate for the variable file of a cloud platform template.
//!
//! ## Overview
//!
//! Before an operator runs the infrastructure tooling, `preflight` reads the
//! `.tfvars`-style file, builds a typed key/value model from it and runs an
//! ordered battery of checks:
//!
//! - Mutually exclusive feature flags (exactly one per group)
//! - Credentials that must never be written to the file
//! - Values that must be filled in when a feature is enabled
//! - Subnets that must lie on the public or private side of the network
//! - Minimum and known-bad platform versions
//! - Fixed values and operator reminders
//!
//! Every outcome is reported as a tagged line and any fatal outcome makes
//! the process exit non-zero.
//!
//! ## Architecture
//!
//! 1. **Normalizer**: strips comments and folds multi-line arrays and the
//!    `default_tags` block into logical statements
//! 2. **Builder**: coerces literals and rejects duplicate keys
//! 3. **Engine**: evaluates the rule catalog, asking the cloud inventory at
//!    most once for the subnets of an existing network
//! 4. **Reporter**: renders the outcomes and picks the exit status
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and the typed model
//! - [`inventory`]: Subnet inventory (AWS EC2, static snapshot)
//! - [`rules`]: Checks, rule catalogs and the engine
//! - [`cli`]: Command-line interface and report rendering
//!
//! ## Example
//!
//! ```text
//! flag_create_new_vpc   = true
//! flag_use_existing_vpc = false
//! vpc_new_private_subnets = [
//!   "10.0.1.0/24",
//!   "10.0.2.0/24",
//! ]
//!
//! default_tags = {
//!   Owner = "platform-team"
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod inventory;
pub mod rules;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, Reporter};
pub use config::{ConfigFingerprint, ConfigModel, ConfigParser, ConfigValue};
pub use error::{ConfigError, InventoryError, PreflightError, Result};
pub use inventory::{Ec2Inventory, StaticInventory, SubnetInventory, SubnetPartition};
pub use rules::{RuleCatalog, RuleEngine, ValidationOutcome, ValidationReport};
