//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Preflight - gatekeeper for platform deployment variable files.
#[derive(Parser, Debug)]
#[command(name = "preflight")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the tfvars file.
    #[arg(short, long, global = true, env = "PREFLIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Log format on stderr (text, json).
    #[arg(long, global = true, default_value = "text", env = "PREFLIGHT_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Options of the `check` command.
    #[command(flatten)]
    pub check: CheckArgs,

    /// Subcommand to execute; defaults to `check`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate the configuration file.
    Check,

    /// Print the built-in rule catalog as YAML.
    Rules,
}

/// Arguments of the `check` command, accepted with or without the subcommand.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckArgs {
    /// YAML rule catalog replacing the built-in one.
    #[arg(long, global = true, env = "PREFLIGHT_RULES")]
    pub rules: Option<PathBuf>,

    /// Stop at the first fatal outcome.
    #[arg(long, global = true, env = "PREFLIGHT_FAIL_FAST")]
    pub fail_fast: bool,

    /// Compare platform versions numerically.
    #[arg(long, global = true, env = "PREFLIGHT_SEMANTIC_VERSIONS")]
    pub semantic_versions: bool,

    /// Never contact the cloud provider.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Named AWS profile for the subnet lookup.
    #[arg(long, global = true, value_name = "NAME")]
    pub aws_profile: Option<String>,

    /// Write the flat JSON export here when the gate passes.
    #[arg(long, global = true, value_name = "PATH")]
    pub emit_json: Option<PathBuf>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable log lines.
    #[default]
    Text,
    /// One JSON object per log event.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the command to run, `check` with defaults when none was given.
    #[must_use]
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Check)
    }
}
