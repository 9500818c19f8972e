//! Check definitions and their evaluation.
//!
//! Every check reads the model through the typed accessors; a missing or
//! mistyped key becomes a fatal outcome naming the key.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::config::{ConfigModel, ConfigValue};
use crate::error::ConfigError;
use crate::inventory::{SubnetPartition, SubnetVisibility};

use super::outcome::ValidationOutcome;
use super::version::{VersionComparison, compare_versions};

/// Placeholder the configuration template ships for unset values.
pub const DEFAULT_SENTINEL: &str = "REPLACE_ME";

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

/// Boolean keys of which exactly one must be true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagGroup {
    /// Group name used in messages.
    pub name: String,
    /// Member flags.
    pub keys: Vec<String>,
}

/// A value that must be filled in when its parent flag is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRule {
    /// Flag that makes the dependent value required.
    pub parent_flag: String,
    /// Key that must hold a real value.
    pub dependent_key: String,
    /// Template placeholder meaning "not filled in".
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    /// Operator-facing explanation.
    pub message: String,
}

/// Where the reference CIDRs for a subnet privacy check come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// A CIDR list in the configuration (new network).
    Static {
        /// Key of the list.
        key: String,
    },
    /// The cloud inventory (existing network).
    Inventory,
}

/// Subject subnets that must all lie on one side of the public/private split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetPrivacyRule {
    /// Flag enabling the check.
    pub flag_key: String,
    /// Key of the subject CIDR list.
    pub subject_key: String,
    /// Side the subject subnets must be on.
    pub visibility: SubnetVisibility,
    /// CIDR list used when a new network is created.
    pub static_key: String,
    /// Flag selecting the existing-network path.
    pub existing_network_flag: String,
}

impl SubnetPrivacyRule {
    /// Picks the reference source for this model.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector flag is missing or not a bool.
    pub fn reference(&self, model: &ConfigModel) -> Result<ReferenceSource, ConfigError> {
        if model.bool(&self.existing_network_flag)? {
            Ok(ReferenceSource::Inventory)
        } else {
            Ok(ReferenceSource::Static {
                key: self.static_key.clone(),
            })
        }
    }

    /// Returns true when this rule will ask the inventory.
    #[must_use]
    pub fn needs_inventory(&self, model: &ConfigModel) -> bool {
        model.bool(&self.flag_key).unwrap_or(false)
            && matches!(self.reference(model), Ok(ReferenceSource::Inventory))
    }
}

/// Severity tier of a known-bad release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Deployment is blocked.
    Fatal,
    /// Deployment proceeds with a warning.
    Warning,
}

/// Condition for a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Flag is present and true.
    IsTrue {
        /// Flag to read.
        key: String,
    },
    /// Flag is present and false.
    IsFalse {
        /// Flag to read.
        key: String,
    },
    /// Key is present.
    Present {
        /// Key to look for.
        key: String,
    },
    /// Key is absent.
    Absent {
        /// Key to look for.
        key: String,
    },
    /// Value renders exactly as `value`.
    Equals {
        /// Key to read.
        key: String,
        /// Expected rendering.
        value: String,
    },
    /// String value starts with `prefix`.
    StartsWith {
        /// Key to read.
        key: String,
        /// Prefix to look for.
        prefix: String,
    },
    /// Every inner predicate holds.
    All {
        /// Inner predicates.
        of: Vec<Predicate>,
    },
    /// At least one inner predicate holds.
    Any {
        /// Inner predicates.
        of: Vec<Predicate>,
    },
}

impl Predicate {
    /// Shorthand for [`Predicate::IsTrue`].
    #[must_use]
    pub fn is_true(key: impl Into<String>) -> Self {
        Self::IsTrue { key: key.into() }
    }

    /// Shorthand for [`Predicate::Absent`].
    #[must_use]
    pub fn absent(key: impl Into<String>) -> Self {
        Self::Absent { key: key.into() }
    }

    /// Evaluates the predicate. Missing or mistyped keys make it false.
    #[must_use]
    pub fn holds(&self, model: &ConfigModel) -> bool {
        match self {
            Self::IsTrue { key } => model.bool(key).unwrap_or(false),
            Self::IsFalse { key } => model.bool(key).is_ok_and(|b| !b),
            Self::Present { key } => model.contains_key(key),
            Self::Absent { key } => !model.contains_key(key),
            Self::Equals { key, value } => model.get(key).is_some_and(|v| v.to_string() == *value),
            Self::StartsWith { key, prefix } => {
                model.str(key).is_ok_and(|s| s.starts_with(prefix.as_str()))
            }
            Self::All { of } => of.iter().all(|p| p.holds(model)),
            Self::Any { of } => of.iter().any(|p| p.holds(model)),
        }
    }
}

/// A named check in the rule battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// Exactly one flag of the group is true.
    ExactlyOneOf(FlagGroup),
    /// A credential must not appear in the file.
    SensitiveKeyAbsent {
        /// Credential-shaped key.
        key: String,
    },
    /// A dependent value is filled in when its parent flag is on.
    DependencyPopulated(DependencyRule),
    /// Subject subnets lie on the required side.
    SubnetPrivacyMatch(SubnetPrivacyRule),
    /// A feature requires a minimum platform version.
    VersionGate {
        /// Feature flag.
        feature_flag: String,
        /// Minimum version, inclusive.
        minimum: String,
    },
    /// A specific release is known to be broken.
    KnownBadVersion {
        /// Exact version literal.
        version: String,
        /// Fatal or warning.
        severity: Severity,
        /// Why the release is bad.
        reason: String,
    },
    /// A value must not start with a forbidden scheme.
    UrlShapeCheck {
        /// Key to read.
        key: String,
        /// Forbidden prefixes.
        forbidden_prefixes: Vec<String>,
    },
    /// A value must equal a fixed literal.
    FixedFieldValue {
        /// Key to read.
        key: String,
        /// Required value.
        expected: String,
    },
    /// A reminder shown when a condition holds. Never fatal.
    ConditionalWarning {
        /// Condition.
        when: Predicate,
        /// Reminder text.
        message: String,
    },
}

/// What the inventory produced for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventorySnapshot {
    /// No check needed the inventory.
    NotRequested,
    /// Lookup succeeded.
    Available(SubnetPartition),
    /// Lookup failed; the message explains why.
    Unavailable(String),
}

/// Inputs shared by every check of a run.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// The parsed configuration.
    pub model: &'a ConfigModel,
    /// Key holding the platform version.
    pub version_key: &'a str,
    /// Version ordering in use.
    pub comparison: VersionComparison,
    /// Inventory result, fetched at most once.
    pub inventory: &'a InventorySnapshot,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactlyOneOf(group) => write!(f, "exactly_one_of({})", group.name),
            Self::SensitiveKeyAbsent { key } => write!(f, "sensitive_key_absent({key})"),
            Self::DependencyPopulated(rule) => write!(f, "dependency_populated({})", rule.dependent_key),
            Self::SubnetPrivacyMatch(rule) => write!(f, "subnet_privacy_match({})", rule.subject_key),
            Self::VersionGate { feature_flag, .. } => write!(f, "version_gate({feature_flag})"),
            Self::KnownBadVersion { version, .. } => write!(f, "known_bad_version({version})"),
            Self::UrlShapeCheck { key, .. } => write!(f, "url_shape({key})"),
            Self::FixedFieldValue { key, .. } => write!(f, "fixed_field_value({key})"),
            Self::ConditionalWarning { .. } => write!(f, "conditional_warning"),
        }
    }
}

impl Check {
    /// Evaluates the check. Returns `None` only for a reminder whose
    /// condition does not hold.
    #[must_use]
    pub fn evaluate(&self, ctx: &CheckContext<'_>) -> Option<ValidationOutcome> {
        let outcome = match self {
            Self::ExactlyOneOf(group) => exactly_one_of(ctx.model, group),
            Self::SensitiveKeyAbsent { key } => Ok(sensitive_key_absent(ctx.model, key)),
            Self::DependencyPopulated(rule) => dependency_populated(ctx.model, rule),
            Self::SubnetPrivacyMatch(rule) => subnet_privacy_match(ctx, rule),
            Self::VersionGate {
                feature_flag,
                minimum,
            } => version_gate(ctx, feature_flag, minimum),
            Self::KnownBadVersion {
                version,
                severity,
                reason,
            } => known_bad_version(ctx, version, *severity, reason),
            Self::UrlShapeCheck {
                key,
                forbidden_prefixes,
            } => url_shape(ctx.model, key, forbidden_prefixes),
            Self::FixedFieldValue { key, expected } => fixed_field_value(ctx.model, key, expected),
            Self::ConditionalWarning { when, message } => {
                return when
                    .holds(ctx.model)
                    .then(|| ValidationOutcome::Warning(message.clone()));
            }
        };

        Some(outcome.unwrap_or_else(|e| ValidationOutcome::Fatal(format!("{self}: {e}"))))
    }
}

fn exactly_one_of(model: &ConfigModel, group: &FlagGroup) -> Result<ValidationOutcome, ConfigError> {
    let mut enabled = Vec::new();
    for key in &group.keys {
        if model.bool(key)? {
            enabled.push(key.as_str());
        }
    }

    if let [only] = enabled.as_slice() {
        return Ok(ValidationOutcome::Ok(format!(
            "flag group '{}' has exactly one option set ({only})",
            group.name
        )));
    }

    let found = if enabled.is_empty() {
        String::from("none")
    } else {
        enabled.join(", ")
    };
    Ok(ValidationOutcome::Fatal(format!(
        "flag group '{}': exactly one of [{}] must be true, found {} ({found})",
        group.name,
        group.keys.join(", "),
        enabled.len()
    )))
}

fn sensitive_key_absent(model: &ConfigModel, key: &str) -> ValidationOutcome {
    if model.contains_key(key) {
        ValidationOutcome::Fatal(format!(
            "'{key}' must not be set in the configuration file; supply it through the secret store"
        ))
    } else {
        ValidationOutcome::Ok(format!("'{key}' is not present"))
    }
}

fn dependency_populated(
    model: &ConfigModel,
    rule: &DependencyRule,
) -> Result<ValidationOutcome, ConfigError> {
    if !model.bool(&rule.parent_flag)? {
        return Ok(ValidationOutcome::Skip(format!(
            "'{}' is false, '{}' not required",
            rule.parent_flag, rule.dependent_key
        )));
    }

    let unset = match model.get(&rule.dependent_key) {
        None => true,
        Some(ConfigValue::StringList(items)) => {
            items.is_empty() || items.iter().any(|item| *item == rule.sentinel)
        }
        Some(value) => value.to_string() == rule.sentinel,
    };

    if unset {
        Ok(ValidationOutcome::Fatal(format!(
            "{} ('{}' is required because '{}' is true)",
            rule.message, rule.dependent_key, rule.parent_flag
        )))
    } else {
        Ok(ValidationOutcome::Ok(format!(
            "'{}' is populated for '{}'",
            rule.dependent_key, rule.parent_flag
        )))
    }
}

fn subnet_privacy_match(
    ctx: &CheckContext<'_>,
    rule: &SubnetPrivacyRule,
) -> Result<ValidationOutcome, ConfigError> {
    if !ctx.model.bool(&rule.flag_key)? {
        return Ok(ValidationOutcome::Skip(format!(
            "'{}' is false, '{}' not checked",
            rule.flag_key, rule.subject_key
        )));
    }

    let subject = ctx.model.string_list(&rule.subject_key)?;

    let (reference, source): (&[String], String) = match rule.reference(ctx.model)? {
        ReferenceSource::Static { key } => (ctx.model.string_list(&key)?, format!("'{key}'")),
        ReferenceSource::Inventory => match ctx.inventory {
            InventorySnapshot::Available(partition) => (
                partition.cidrs(rule.visibility),
                String::from("the existing network"),
            ),
            InventorySnapshot::Unavailable(reason) => {
                return Ok(ValidationOutcome::Fatal(format!(
                    "cannot verify '{}' are {}: inventory lookup failed: {reason}",
                    rule.subject_key, rule.visibility
                )));
            }
            InventorySnapshot::NotRequested => {
                return Ok(ValidationOutcome::Fatal(format!(
                    "cannot verify '{}': inventory was not consulted",
                    rule.subject_key
                )));
            }
        },
    };

    Ok(cidr_subset(&rule.subject_key, subject, reference, rule.visibility, &source))
}

/// Fatal unless every subject CIDR is in `reference`.
#[must_use]
pub fn cidr_subset(
    subject_key: &str,
    subject: &[String],
    reference: &[String],
    visibility: SubnetVisibility,
    source: &str,
) -> ValidationOutcome {
    let known: HashSet<&str> = reference.iter().map(|c| c.trim()).collect();
    let stray: Vec<&str> = subject
        .iter()
        .map(|c| c.trim())
        .filter(|c| !known.contains(c))
        .collect();

    if stray.is_empty() {
        ValidationOutcome::Ok(format!(
            "all '{subject_key}' subnets are {visibility} subnets of {source}"
        ))
    } else {
        ValidationOutcome::Fatal(format!(
            "'{subject_key}' contains subnets that are not {visibility} subnets of {source}: {}",
            stray.join(", ")
        ))
    }
}

fn version_gate(
    ctx: &CheckContext<'_>,
    feature_flag: &str,
    minimum: &str,
) -> Result<ValidationOutcome, ConfigError> {
    if !ctx.model.bool(feature_flag)? {
        return Ok(ValidationOutcome::Skip(format!("'{feature_flag}' is disabled")));
    }

    let configured = ctx.model.str(ctx.version_key)?;
    if compare_versions(configured, minimum, ctx.comparison) == Ordering::Less {
        Ok(ValidationOutcome::Fatal(format!(
            "'{feature_flag}' requires {} {minimum} or later, configured {configured}",
            ctx.version_key
        )))
    } else {
        Ok(ValidationOutcome::Ok(format!(
            "{configured} satisfies minimum {minimum} for '{feature_flag}'"
        )))
    }
}

fn known_bad_version(
    ctx: &CheckContext<'_>,
    version: &str,
    severity: Severity,
    reason: &str,
) -> Result<ValidationOutcome, ConfigError> {
    let configured = ctx.model.str(ctx.version_key)?;
    if configured != version {
        return Ok(ValidationOutcome::Ok(format!("{configured} is not release {version}")));
    }

    let message = format!("{} {version} must not be deployed: {reason}", ctx.version_key);
    Ok(match severity {
        Severity::Fatal => ValidationOutcome::Fatal(message),
        Severity::Warning => ValidationOutcome::Warning(message),
    })
}

fn url_shape(
    model: &ConfigModel,
    key: &str,
    forbidden_prefixes: &[String],
) -> Result<ValidationOutcome, ConfigError> {
    let value = model.str(key)?;
    match forbidden_prefixes.iter().find(|p| value.starts_with(p.as_str())) {
        Some(prefix) => Ok(ValidationOutcome::Fatal(format!(
            "'{key}' must not start with '{prefix}' (found '{value}')"
        ))),
        None => Ok(ValidationOutcome::Ok(format!("'{key}' has no scheme prefix"))),
    }
}

fn fixed_field_value(
    model: &ConfigModel,
    key: &str,
    expected: &str,
) -> Result<ValidationOutcome, ConfigError> {
    let value = model.require(key)?.to_string();
    if value == expected {
        Ok(ValidationOutcome::Ok(format!("'{key}' is '{expected}'")))
    } else {
        Ok(ValidationOutcome::Fatal(format!(
            "'{key}' must be '{expected}', found '{value}'"
        )))
    }
}
