//! Rule engine.
//!
//! Runs a [`RuleCatalog`] against a [`ConfigModel`]. The inventory is
//! consulted at most once per run, before any check is evaluated, and only
//! when some subnet privacy check takes the existing-network path. Checks
//! themselves are synchronous.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ConfigModel;
use crate::inventory::SubnetInventory;

use super::catalog::RuleCatalog;
use super::checks::{CheckContext, InventorySnapshot};
use super::outcome::ValidationReport;
use super::version::VersionComparison;

/// What to do after a fatal outcome.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Run every check, then fail if any was fatal.
    #[default]
    CollectAll,
    /// Stop at the first fatal outcome.
    FailFast,
}

/// Evaluates a rule catalog.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: RuleCatalog,
    policy: FailurePolicy,
    comparison: VersionComparison,
}

impl RuleEngine {
    /// Creates an engine with the default policies.
    #[must_use]
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog,
            policy: FailurePolicy::default(),
            comparison: VersionComparison::default(),
        }
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the version comparison mode.
    #[must_use]
    pub const fn with_comparison(mut self, comparison: VersionComparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Returns the catalog.
    #[must_use]
    pub const fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Runs all checks, fetching the inventory first if needed.
    pub async fn run(&self, model: &ConfigModel, inventory: &dyn SubnetInventory) -> ValidationReport {
        let snapshot = self.fetch_inventory(model, inventory).await;
        self.run_with_snapshot(model, &snapshot)
    }

    /// Runs all checks against an already-fetched inventory snapshot.
    #[must_use]
    pub fn run_with_snapshot(
        &self,
        model: &ConfigModel,
        snapshot: &InventorySnapshot,
    ) -> ValidationReport {
        let ctx = CheckContext {
            model,
            version_key: &self.catalog.version_key,
            comparison: self.comparison,
            inventory: snapshot,
        };

        let mut report = ValidationReport::default();

        for check in &self.catalog.checks {
            let Some(outcome) = check.evaluate(&ctx) else {
                debug!("{check}: condition not met");
                continue;
            };

            debug!("{check}: {outcome}");
            let fatal = outcome.is_fatal();
            report.push(check.to_string(), outcome);

            if fatal && self.policy == FailurePolicy::FailFast {
                warn!("Stopping at first fatal outcome ({check})");
                report.stopped_early = true;
                break;
            }
        }

        let counts = report.counts();
        info!(
            "Checks finished: {} ok, {} skipped, {} warnings, {} fatal",
            counts.ok, counts.skipped, counts.warnings, counts.fatal
        );
        report
    }

    /// Performs the single inventory lookup, if any check needs it.
    pub async fn fetch_inventory(
        &self,
        model: &ConfigModel,
        inventory: &dyn SubnetInventory,
    ) -> InventorySnapshot {
        if !self.catalog.needs_inventory(model) {
            debug!("No check needs the cloud inventory");
            return InventorySnapshot::NotRequested;
        }

        let target = &self.catalog.inventory;
        let network_id = match model.str(&target.network_id_key) {
            Ok(id) => id,
            Err(e) => return InventorySnapshot::Unavailable(e.to_string()),
        };
        if network_id.trim().is_empty() || network_id == target.unset_id {
            debug!("Network id is the placeholder '{network_id}', skipping lookup");
            return InventorySnapshot::Unavailable(format!(
                "network id not set ('{}' is '{network_id}')",
                target.network_id_key
            ));
        }
        let region = match model.str(&target.region_key) {
            Ok(region) => region,
            Err(e) => return InventorySnapshot::Unavailable(e.to_string()),
        };

        info!(
            "Fetching subnets of {network_id} ({region}) from {}",
            inventory.source_name()
        );
        match inventory.list_subnets(network_id, region).await {
            Ok(partition) => InventorySnapshot::Available(partition),
            Err(e) => {
                warn!("Inventory lookup failed: {e}");
                InventorySnapshot::Unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigParser;
    use crate::error::InventoryError;
    use crate::inventory::{MockSubnetInventory, StaticInventory, SubnetPartition};
    use crate::rules::ValidationOutcome;
    use crate::testing::VALID_TFVARS;

    const VALID: &str = VALID_TFVARS;

    fn parse(text: &str) -> ConfigModel {
        ConfigParser::new().parse_str(text).unwrap()
    }

    fn engine() -> RuleEngine {
        RuleEngine::new(RuleCatalog::builtin())
    }

    fn existing_vpc(text: &str) -> String {
        text.replace("flag_create_new_vpc   = true", "flag_create_new_vpc   = false")
            .replace("flag_use_existing_vpc = false", "flag_use_existing_vpc = true")
            .replace("vpc_existing_id       = \"REPLACE_ME\"", "vpc_existing_id       = \"vpc-0abc\"")
    }

    #[tokio::test]
    async fn test_valid_config_passes() {
        let model = parse(VALID);
        let inventory = StaticInventory::unavailable("must not be called");

        let report = engine().run(&model, &inventory).await;

        let fatal: Vec<_> = report.fatal().map(|r| r.outcome.detail().to_string()).collect();
        assert!(fatal.is_empty(), "unexpected fatal outcomes: {fatal:?}");
        assert!(report.passed());
        assert!(matches!(
            report.outcome_of("exactly_one_of(vpc)"),
            Some(ValidationOutcome::Ok(_))
        ));
        assert!(matches!(
            report.outcome_of("dependency_populated(vpc_existing_id)"),
            Some(ValidationOutcome::Skip(_))
        ));
    }

    #[tokio::test]
    async fn test_both_vpc_flags_fatal_names_group() {
        let text = VALID.replace("flag_use_existing_vpc = false", "flag_use_existing_vpc = true");
        let model = parse(&text);

        let report = engine().run(&model, &StaticInventory::unavailable("offline")).await;

        let Some(ValidationOutcome::Fatal(message)) = report.outcome_of("exactly_one_of(vpc)") else {
            panic!("vpc group should be fatal");
        };
        assert!(message.contains("'vpc'"));
        assert!(matches!(
            report.outcome_of("exactly_one_of(database)"),
            Some(ValidationOutcome::Ok(_))
        ));
    }

    #[tokio::test]
    async fn test_sensitive_key_anywhere_is_fatal() {
        let text = format!("{VALID}\nplatform_db_password = \"\"\n");
        let report = engine().run(&parse(&text), &StaticInventory::new()).await;

        assert!(report.has_fatal());
        assert!(
            report
                .outcome_of("sensitive_key_absent(platform_db_password)")
                .is_some_and(ValidationOutcome::is_fatal)
        );
    }

    #[tokio::test]
    async fn test_inventory_called_once_for_existing_vpc() {
        let model = parse(&existing_vpc(VALID));

        let mut inventory = MockSubnetInventory::new();
        inventory
            .expect_list_subnets()
            .withf(|network_id, region| network_id == "vpc-0abc" && region == "eu-west-1")
            .times(1)
            .returning(|_, _| {
                Ok(SubnetPartition::new(
                    ["10.0.0.0/24"],
                    ["10.0.1.0/24", "10.0.2.0/24"],
                ))
            });
        inventory.expect_source_name().return_const("mock");

        let report = engine().run(&model, &inventory).await;

        assert!(report.passed(), "{report:?}");
        assert!(matches!(
            report.outcome_of("subnet_privacy_match(subnets_ec2)"),
            Some(ValidationOutcome::Ok(_))
        ));
    }

    #[tokio::test]
    async fn test_inventory_failure_is_fatal() {
        let model = parse(&existing_vpc(VALID));

        let mut inventory = MockSubnetInventory::new();
        inventory
            .expect_list_subnets()
            .times(1)
            .returning(|_, _| {
                Err(InventoryError::AuthenticationFailed {
                    message: "expired token".to_string(),
                })
            });
        inventory.expect_source_name().return_const("mock");

        let report = engine().run(&model, &inventory).await;

        assert!(report.has_fatal());
        let outcome = report.outcome_of("subnet_privacy_match(subnets_ec2)").unwrap();
        assert!(outcome.is_fatal());
        assert!(outcome.detail().contains("expired token"));
    }

    #[tokio::test]
    async fn test_new_vpc_never_touches_inventory() {
        let model = parse(VALID);
        let mut inventory = MockSubnetInventory::new();
        inventory.expect_list_subnets().times(0);

        let snapshot = engine().fetch_inventory(&model, &inventory).await;
        assert_eq!(snapshot, InventorySnapshot::NotRequested);
    }

    #[tokio::test]
    async fn test_placeholder_network_id_skips_lookup() {
        let text = existing_vpc(VALID).replace(
            "vpc_existing_id       = \"vpc-0abc\"",
            "vpc_existing_id       = \"REPLACE_ME\"",
        );
        let model = parse(&text);

        let mut inventory = MockSubnetInventory::new();
        inventory.expect_list_subnets().times(0);
        inventory.expect_source_name().times(0);

        let report = engine().run(&model, &inventory).await;

        assert!(
            report
                .outcome_of("dependency_populated(vpc_existing_id)")
                .is_some_and(ValidationOutcome::is_fatal)
        );
        let privacy = report.outcome_of("subnet_privacy_match(subnets_ec2)").unwrap();
        assert!(privacy.is_fatal());
        assert!(privacy.detail().contains("network id not set"));
    }

    #[test]
    fn test_stray_subnet_is_fatal() {
        let text = VALID.replace(
            "subnets_ec2 = [\"10.0.1.0/24\"]",
            "subnets_ec2 = [\"10.0.9.0/24\"]",
        );
        let report = engine().run_with_snapshot(&parse(&text), &InventorySnapshot::NotRequested);
        assert!(
            report
                .outcome_of("subnet_privacy_match(subnets_ec2)")
                .is_some_and(ValidationOutcome::is_fatal)
        );
    }

    #[test]
    fn test_fail_fast_stops_after_first_fatal() {
        let text = VALID
            .replace("flag_use_existing_vpc = false", "flag_use_existing_vpc = true")
            .replace("flag_use_container_redis   = true", "flag_use_container_redis   = false");
        let model = parse(&text);

        let collect = engine().run_with_snapshot(&model, &InventorySnapshot::NotRequested);
        assert!(collect.counts().fatal >= 2);
        assert!(!collect.stopped_early);

        let fast = engine()
            .with_policy(FailurePolicy::FailFast)
            .run_with_snapshot(&model, &InventorySnapshot::NotRequested);
        assert_eq!(fast.counts().fatal, 1);
        assert!(fast.stopped_early);
        assert_eq!(fast.results.len(), 1);
    }

    #[test]
    fn test_version_comparison_is_swappable() {
        // Groundswell needs v23.4.0; "23.10.0" sorts below "23.4.0" as a string.
        let text = VALID.replace("\"v23.4.1\"", "\"v23.10.0\"");
        let model = parse(&text);

        let lexical = engine().run_with_snapshot(&model, &InventorySnapshot::NotRequested);
        assert!(
            lexical
                .outcome_of("version_gate(flag_enable_groundswell)")
                .is_some_and(ValidationOutcome::is_fatal)
        );

        let semantic = engine()
            .with_comparison(VersionComparison::Semantic)
            .run_with_snapshot(&model, &InventorySnapshot::NotRequested);
        assert!(matches!(
            semantic.outcome_of("version_gate(flag_enable_groundswell)"),
            Some(ValidationOutcome::Ok(_))
        ));
    }

    #[test]
    fn test_reminders_are_warnings_only() {
        let text = VALID.replace(
            "default_tags = {\n  Owner = \"platform-team\"\n}\n",
            "",
        );
        let report = engine().run_with_snapshot(&parse(&text), &InventorySnapshot::NotRequested);
        assert!(report.passed());
        assert_eq!(report.counts().warnings, 1);
    }
}
