//! Rule catalogs.
//!
//! A catalog is the ordered list of checks plus the keys the engine needs to
//! locate the platform version and the existing network. The built-in
//! catalog covers the standard platform deployment template; alternative
//! catalogs can be loaded from YAML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{ConfigModel, DEFAULT_TAGS_KEY};
use crate::error::{ConfigError, PreflightError, Result};
use crate::inventory::SubnetVisibility;

use super::checks::{
    Check, DEFAULT_SENTINEL, DependencyRule, FlagGroup, Predicate, Severity, SubnetPrivacyRule,
};

/// Keys locating the existing network for inventory lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTarget {
    /// Key holding the network id.
    pub network_id_key: String,
    /// Key holding the region.
    pub region_key: String,
    /// Placeholder meaning the network id was never filled in.
    #[serde(default = "default_unset_id")]
    pub unset_id: String,
}

fn default_unset_id() -> String {
    DEFAULT_SENTINEL.to_string()
}

/// An ordered rule battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalog {
    /// Key holding the configured platform version.
    pub version_key: String,
    /// Where the existing network is described.
    pub inventory: InventoryTarget,
    /// Checks in evaluation order.
    pub checks: Vec<Check>,
}

impl RuleCatalog {
    /// Loads a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading rule catalog from: {}", path.display());

        if !path.exists() {
            return Err(PreflightError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, Some(path))
    }

    /// Parses a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml_str(content: &str, source: Option<&Path>) -> Result<Self> {
        let catalog: Self = serde_yaml::from_str(content).map_err(|e| {
            PreflightError::Config(ConfigError::ParseError {
                message: format!("rule catalog: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })?;

        debug!("Rule catalog has {} checks", catalog.checks.len());
        Ok(catalog)
    }

    /// Renders the catalog as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            PreflightError::Config(ConfigError::ParseError {
                message: format!("rule catalog: {e}"),
                location: None,
            })
        })
    }

    /// Returns true when some check will consult the inventory for `model`.
    #[must_use]
    pub fn needs_inventory(&self, model: &ConfigModel) -> bool {
        self.checks.iter().any(|check| match check {
            Check::SubnetPrivacyMatch(rule) => rule.needs_inventory(model),
            _ => false,
        })
    }

    /// The built-in battery for the platform deployment template.
    #[must_use]
    pub fn builtin() -> Self {
        let mut checks = vec![
            group("vpc", &["flag_create_new_vpc", "flag_use_existing_vpc"]),
            group(
                "database",
                &[
                    "flag_create_external_db",
                    "flag_use_existing_external_db",
                    "flag_use_container_db",
                ],
            ),
            group("redis", &["flag_create_external_redis", "flag_use_container_redis"]),
            group(
                "ingress",
                &[
                    "flag_create_load_balancer",
                    "flag_use_private_cacert",
                    "flag_do_not_use_https",
                ],
            ),
            group(
                "instance_exposure",
                &["flag_make_instance_public", "flag_make_instance_private"],
            ),
        ];

        checks.extend(
            [
                "platform_db_password",
                "platform_db_master_password",
                "platform_redis_password",
                "platform_smtp_password",
                "platform_jwt_secret",
                "platform_crypto_secretkey",
                "aws_secret_access_key",
            ]
            .into_iter()
            .map(|key| Check::SensitiveKeyAbsent {
                key: key.to_string(),
            }),
        );

        checks.extend([
            dependency(
                "flag_use_existing_vpc",
                "vpc_existing_id",
                "An existing VPC id must be provided",
            ),
            dependency(
                "flag_use_existing_external_db",
                "db_existing_host",
                "The existing database host must be provided",
            ),
            dependency(
                "flag_create_load_balancer",
                "alb_certificate_arn",
                "The load balancer needs a certificate ARN",
            ),
            privacy(
                "flag_make_instance_private",
                "subnets_ec2",
                SubnetVisibility::Private,
                "vpc_new_private_subnets",
            ),
            privacy(
                "flag_make_instance_public",
                "subnets_ec2",
                SubnetVisibility::Public,
                "vpc_new_public_subnets",
            ),
            privacy(
                "flag_create_external_db",
                "subnets_db",
                SubnetVisibility::Private,
                "vpc_new_private_subnets",
            ),
            privacy(
                "flag_create_load_balancer",
                "subnets_alb",
                SubnetVisibility::Public,
                "vpc_new_public_subnets",
            ),
            Check::VersionGate {
                feature_flag: "flag_enable_data_studio".to_string(),
                minimum: "v24.1.0".to_string(),
            },
            Check::VersionGate {
                feature_flag: "flag_enable_groundswell".to_string(),
                minimum: "v23.4.0".to_string(),
            },
            Check::KnownBadVersion {
                version: "v23.4.5".to_string(),
                severity: Severity::Fatal,
                reason: "database migration in this release corrupts pipeline records".to_string(),
            },
            Check::KnownBadVersion {
                version: "v23.3.0".to_string(),
                severity: Severity::Warning,
                reason: "known memory regression, upgrade recommended".to_string(),
            },
            Check::UrlShapeCheck {
                key: "platform_server_url".to_string(),
                forbidden_prefixes: vec!["http://".to_string(), "https://".to_string()],
            },
            Check::FixedFieldValue {
                key: "platform_db_driver".to_string(),
                expected: "org.mariadb.jdbc.Driver".to_string(),
            },
            Check::FixedFieldValue {
                key: "platform_db_dialect".to_string(),
                expected: "org.hibernate.dialect.MySQL8Dialect".to_string(),
            },
            Check::ConditionalWarning {
                when: Predicate::is_true("flag_use_container_db"),
                message: "The container database is not backed up; use an external database for production".to_string(),
            },
            Check::ConditionalWarning {
                when: Predicate::is_true("flag_do_not_use_https"),
                message: "HTTPS is disabled; traffic to the platform will be unencrypted".to_string(),
            },
            Check::ConditionalWarning {
                when: Predicate::absent(DEFAULT_TAGS_KEY),
                message: "No default_tags block; provisioned resources will be untagged".to_string(),
            },
            Check::ConditionalWarning {
                when: Predicate::All {
                    of: vec![
                        Predicate::is_true("flag_use_existing_vpc"),
                        Predicate::is_true("flag_make_instance_public"),
                    ],
                },
                message: "Reminder: the existing VPC must have an internet gateway attached to its public subnets".to_string(),
            },
        ]);

        Self {
            version_key: "platform_container_version".to_string(),
            inventory: InventoryTarget {
                network_id_key: "vpc_existing_id".to_string(),
                region_key: "aws_region".to_string(),
                unset_id: DEFAULT_SENTINEL.to_string(),
            },
            checks,
        }
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn group(name: &str, keys: &[&str]) -> Check {
    Check::ExactlyOneOf(FlagGroup {
        name: name.to_string(),
        keys: keys.iter().map(|k| (*k).to_string()).collect(),
    })
}

fn dependency(parent_flag: &str, dependent_key: &str, message: &str) -> Check {
    Check::DependencyPopulated(DependencyRule {
        parent_flag: parent_flag.to_string(),
        dependent_key: dependent_key.to_string(),
        sentinel: DEFAULT_SENTINEL.to_string(),
        message: message.to_string(),
    })
}

fn privacy(flag_key: &str, subject_key: &str, visibility: SubnetVisibility, static_key: &str) -> Check {
    Check::SubnetPrivacyMatch(SubnetPrivacyRule {
        flag_key: flag_key.to_string(),
        subject_key: subject_key.to_string(),
        visibility,
        static_key: static_key.to_string(),
        existing_network_flag: "flag_use_existing_vpc".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CUSTOM: &str = r#"
version_key: app_version
inventory:
  network_id_key: network_id
  region_key: region
checks:
  - check: exactly_one_of
    name: storage
    keys: [flag_use_s3, flag_use_efs]
  - check: dependency_populated
    parent_flag: flag_use_s3
    dependent_key: bucket_name
    message: Bucket name required
  - check: subnet_privacy_match
    flag_key: flag_private
    subject_key: subnets_app
    visibility: private
    static_key: private_subnets
    existing_network_flag: flag_existing_network
  - check: known_bad_version
    version: v1.2.3
    severity: warning
    reason: flaky
  - check: conditional_warning
    when:
      op: all
      of:
        - op: is_true
          key: flag_use_efs
        - op: absent
          key: efs_backup
    message: EFS is not backed up
"#;

    #[test]
    fn test_parse_custom_catalog() {
        let catalog = RuleCatalog::from_yaml_str(CUSTOM, None).unwrap();
        assert_eq!(catalog.version_key, "app_version");
        assert_eq!(catalog.checks.len(), 5);
        assert_eq!(
            catalog.checks[0],
            Check::ExactlyOneOf(FlagGroup {
                name: "storage".to_string(),
                keys: vec!["flag_use_s3".to_string(), "flag_use_efs".to_string()],
            })
        );
        let Check::DependencyPopulated(rule) = &catalog.checks[1] else {
            panic!("expected dependency rule");
        };
        assert_eq!(rule.sentinel, DEFAULT_SENTINEL);
        assert_eq!(catalog.inventory.unset_id, DEFAULT_SENTINEL);
    }

    #[test]
    fn test_builtin_round_trips_through_yaml() {
        let builtin = RuleCatalog::builtin();
        let yaml = builtin.to_yaml().unwrap();
        let parsed = RuleCatalog::from_yaml_str(&yaml, None).unwrap();
        assert_eq!(parsed, builtin);
    }

    #[test]
    fn test_invalid_catalog_reports_location() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("rules.yaml");
        std::fs::write(&path, "checks: [ { check: no_such_check } ]\n").unwrap();

        let err = RuleCatalog::load_yaml(&path).unwrap_err();
        let PreflightError::Config(ConfigError::ParseError { location, .. }) = err else {
            panic!("expected parse error");
        };
        assert_eq!(location, Some(path.display().to_string()));
    }

    #[test]
    fn test_builtin_order_starts_with_flag_groups() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.checks[0].to_string(), "exactly_one_of(vpc)");
        assert!(
            catalog
                .checks
                .iter()
                .any(|c| matches!(c, Check::SubnetPrivacyMatch(_)))
        );
    }
}
