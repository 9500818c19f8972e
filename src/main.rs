//! Preflight CLI entrypoint.
//!
//! This is the main entrypoint for the preflight command-line tool.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use tfvars_preflight::cli::{Cli, Commands, LogFormat, Reporter, inventory_for, run_check};
use tfvars_preflight::config::find_config_file;
use tfvars_preflight::error::Result;
use tfvars_preflight::rules::RuleCatalog;

use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose, cli.log_format);

    let reporter = Reporter::new(cli.output);

    // A single inventory call per run does not need a multi-threaded runtime
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&cli, reporter)) {
        Ok(code) => code,
        Err(e) => {
            let _ = writeln!(io::stdout().lock(), "{}", reporter.render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Main async entry point.
async fn run(cli: &Cli, reporter: Reporter) -> Result<ExitCode> {
    match cli.resolved_command() {
        Commands::Check => {
            let config_file = resolve_config_path(cli.config.as_ref())?;
            let inventory = inventory_for(&cli.check);
            let status = run_check(
                &config_file,
                &cli.check,
                inventory.as_ref(),
                reporter,
                &mut io::stdout(),
            )
            .await;
            Ok(ExitCode::from(status))
        }
        Commands::Rules => cmd_rules(),
    }
}

/// Print the built-in rule catalog.
fn cmd_rules() -> Result<ExitCode> {
    let yaml = RuleCatalog::builtin().to_yaml()?;
    io::stdout().lock().write_all(yaml.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}
