//! CLI module for the preflight tool.
//!
//! This module provides the command-line interface and the report renderer.

mod commands;
mod output;
mod run;

pub use commands::{CheckArgs, Cli, Commands, LogFormat, OutputFormat};
pub use output::Reporter;
pub use run::{inventory_for, run_check};
