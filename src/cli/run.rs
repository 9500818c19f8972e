//! The `check` command flow.
//!
//! Everything between a resolved config path and the exit status lives
//! here so it can run against any [`SubnetInventory`] and any writer.

use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{ConfigFingerprint, ConfigParser};
use crate::error::Result;
use crate::inventory::{Ec2Inventory, StaticInventory, SubnetInventory};
use crate::rules::{FailurePolicy, RuleCatalog, RuleEngine, VersionComparison};

use super::commands::CheckArgs;
use super::output::Reporter;

/// Picks the inventory for a run: a failing snapshot offline, EC2 otherwise.
#[must_use]
pub fn inventory_for(args: &CheckArgs) -> Box<dyn SubnetInventory> {
    if args.offline {
        return Box::new(StaticInventory::unavailable("offline mode"));
    }
    match &args.aws_profile {
        Some(profile) => Box::new(Ec2Inventory::new().with_profile(profile)),
        None => Box::new(Ec2Inventory::new()),
    }
}

/// Runs the gate on `config_path` and writes the report to `out`.
///
/// Returns the exit status: 0 iff no check was fatal. Load and parse
/// failures are written as a single `[ERROR]` line and return 1.
pub async fn run_check(
    config_path: &Path,
    args: &CheckArgs,
    inventory: &dyn SubnetInventory,
    reporter: Reporter,
    out: &mut impl Write,
) -> u8 {
    match check(config_path, args, inventory, reporter, &mut *out).await {
        Ok(status) => status,
        Err(e) => {
            let _ = writeln!(out, "{}", reporter.render_error(&e));
            1
        }
    }
}

async fn check(
    config_path: &Path,
    args: &CheckArgs,
    inventory: &dyn SubnetInventory,
    reporter: Reporter,
    out: &mut impl Write,
) -> Result<u8> {
    let parser = ConfigParser::new().with_base_path(
        config_path
            .parent()
            .unwrap_or_else(|| Path::new(".")),
    );
    parser.load_dotenv()?;

    let model = parser.load_file(config_path)?;
    let fingerprint = ConfigFingerprint::new().compute(&model);
    debug!("Configuration fingerprint: {fingerprint}");

    let catalog = match &args.rules {
        Some(path) => RuleCatalog::load_yaml(path)?,
        None => RuleCatalog::builtin(),
    };

    let policy = if args.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::CollectAll
    };
    let comparison = if args.semantic_versions {
        VersionComparison::Semantic
    } else {
        VersionComparison::Lexicographic
    };
    let engine = RuleEngine::new(catalog)
        .with_policy(policy)
        .with_comparison(comparison);

    let report = engine.run(&model, inventory).await;
    reporter.emit(out, &report, &fingerprint)?;

    if let Some(path) = &args.emit_json {
        if report.passed() {
            std::fs::write(path, model.to_json()?)?;
            info!("Wrote configuration export to: {}", path.display());
        } else {
            info!("Gate failed, not writing {}", path.display());
        }
    }

    Ok(Reporter::exit_status(&report))
}
