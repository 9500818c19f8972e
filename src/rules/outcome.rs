//! Check outcomes and the accumulated report.

use serde::Serialize;
use std::fmt;

/// Result of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum ValidationOutcome {
    /// The check passed.
    Ok(String),
    /// The check did not apply.
    Skip(String),
    /// Valid, but worth operator attention.
    Warning(String),
    /// Invalid or unsafe to deploy.
    Fatal(String),
}

impl ValidationOutcome {
    /// Returns true for `Fatal`.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Returns the qualifier or message.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Ok(s) | Self::Skip(s) | Self::Warning(s) | Self::Fatal(s) => s,
        }
    }

    /// Returns the tag printed in front of the detail.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Ok(_) => "[OK]",
            Self::Skip(_) => "[SKIP]",
            Self::Warning(_) => "[WARNING]",
            Self::Fatal(_) => "[ERROR]",
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag(), self.detail())
    }
}

/// One outcome together with the check that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Check label, e.g. `exactly_one_of(vpc)`.
    pub check: String,
    /// The outcome.
    #[serde(flatten)]
    pub outcome: ValidationOutcome,
}

/// All outcomes of one run, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Outcomes in check order.
    pub results: Vec<CheckResult>,
    /// True when the run stopped at the first fatal outcome.
    pub stopped_early: bool,
}

/// Per-tier outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    /// Passed checks.
    pub ok: usize,
    /// Skipped checks.
    pub skipped: usize,
    /// Warnings.
    pub warnings: usize,
    /// Fatal outcomes.
    pub fatal: usize,
}

impl ValidationReport {
    /// Appends an outcome.
    pub fn push(&mut self, check: impl Into<String>, outcome: ValidationOutcome) {
        self.results.push(CheckResult {
            check: check.into(),
            outcome,
        });
    }

    /// Returns true if any outcome is fatal.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.results.iter().any(|r| r.outcome.is_fatal())
    }

    /// Returns true if the configuration may be deployed.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.has_fatal()
    }

    /// Iterates over fatal outcomes.
    pub fn fatal(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.outcome.is_fatal())
    }

    /// Returns the outcome of the first result produced by `check`.
    #[must_use]
    pub fn outcome_of(&self, check: &str) -> Option<&ValidationOutcome> {
        self.results
            .iter()
            .find(|r| r.check == check)
            .map(|r| &r.outcome)
    }

    /// Counts outcomes per tier.
    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for result in &self.results {
            match result.outcome {
                ValidationOutcome::Ok(_) => counts.ok += 1,
                ValidationOutcome::Skip(_) => counts.skipped += 1,
                ValidationOutcome::Warning(_) => counts.warnings += 1,
                ValidationOutcome::Fatal(_) => counts.fatal += 1,
            }
        }
        counts
    }
}
