//! Output formatting for CLI commands.
//!
//! The [`Reporter`] turns a validation report into tagged lines or a JSON
//! document and picks the process exit status.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};

use crate::error::PreflightError;
use crate::rules::{CheckResult, OutcomeCounts, ValidationOutcome, ValidationReport};

use super::commands::OutputFormat;

/// Renders validation results for the operator.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    /// Output format.
    format: OutputFormat,
    /// Whether tags are coloured in text mode.
    color: bool,
}

impl Reporter {
    /// Creates a reporter with coloured text output.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    /// Enables or disables colour.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Renders a full report.
    #[must_use]
    pub fn render(&self, report: &ValidationReport, fingerprint: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ReportJson::new(report, fingerprint, Utc::now()))
                    .unwrap_or_default()
            }
            OutputFormat::Text => self.render_text(report, fingerprint),
        }
    }

    fn render_text(&self, report: &ValidationReport, fingerprint: &str) -> String {
        let mut output = String::new();

        for result in &report.results {
            let _ = writeln!(output, "{} {}", self.tag(&result.outcome), result.outcome.detail());
        }

        if report.stopped_early {
            let _ = writeln!(output, "Stopped at the first fatal outcome; remaining checks were not run.");
        }

        let counts = report.counts();
        let _ = writeln!(
            output,
            "\nConfiguration {}: {} ok, {} skipped, {} warnings, {} fatal",
            short(fingerprint),
            counts.ok,
            counts.skipped,
            counts.warnings,
            counts.fatal
        );

        output
    }

    /// Renders a load or parse failure as a single terminal line.
    #[must_use]
    pub fn render_error(&self, error: &PreflightError) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "error", "message": error.to_string() });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let tag = if self.color {
                    "[ERROR]".red().bold().to_string()
                } else {
                    "[ERROR]".to_string()
                };
                format!("{tag} {error}")
            }
        }
    }

    /// Writes a rendered report, followed by a newline, to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn emit(
        &self,
        out: &mut impl Write,
        report: &ValidationReport,
        fingerprint: &str,
    ) -> io::Result<()> {
        let rendered = self.render(report, fingerprint);
        out.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()
    }

    /// Exit status for a report: 0 iff nothing was fatal.
    #[must_use]
    pub fn exit_status(report: &ValidationReport) -> u8 {
        u8::from(report.has_fatal())
    }

    /// Formats an outcome tag with color.
    fn tag(&self, outcome: &ValidationOutcome) -> String {
        let tag = outcome.tag();
        if !self.color {
            return tag.to_string();
        }
        match outcome {
            ValidationOutcome::Ok(_) => tag.green().to_string(),
            ValidationOutcome::Skip(_) => tag.dimmed().to_string(),
            ValidationOutcome::Warning(_) => tag.yellow().to_string(),
            ValidationOutcome::Fatal(_) => tag.red().bold().to_string(),
        }
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..8).unwrap_or(fingerprint)
}

// JSON serialization helpers

#[derive(Serialize)]
struct ReportJson<'a> {
    generated_at: DateTime<Utc>,
    fingerprint: &'a str,
    passed: bool,
    stopped_early: bool,
    counts: OutcomeCounts,
    results: &'a [CheckResult],
}

impl<'a> ReportJson<'a> {
    fn new(report: &'a ValidationReport, fingerprint: &'a str, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            fingerprint,
            passed: report.passed(),
            stopped_early: report.stopped_early,
            counts: report.counts(),
            results: &report.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    const FINGERPRINT: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn sample() -> ValidationReport {
        let mut report = ValidationReport::default();
        report.push(
            "exactly_one_of(vpc)",
            ValidationOutcome::Ok("flag group 'vpc' has exactly one option set".to_string()),
        );
        report.push(
            "dependency_populated(vpc_existing_id)",
            ValidationOutcome::Skip("'flag_use_existing_vpc' is false".to_string()),
        );
        report.push(
            "conditional_warning",
            ValidationOutcome::Warning("HTTPS is disabled".to_string()),
        );
        report
    }

    fn plain(format: OutputFormat) -> Reporter {
        Reporter::new(format).with_color(false)
    }

    #[test]
    fn test_text_lines_are_tagged_in_order() {
        let text = plain(OutputFormat::Text).render(&sample(), FINGERPRINT);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "[OK] flag group 'vpc' has exactly one option set");
        assert_eq!(lines[1], "[SKIP] 'flag_use_existing_vpc' is false");
        assert_eq!(lines[2], "[WARNING] HTTPS is disabled");
        assert!(text.contains("Configuration 01234567: 1 ok, 1 skipped, 1 warnings, 0 fatal"));
    }

    #[test]
    fn test_fatal_renders_as_error_tag() {
        let mut report = sample();
        report.push(
            "sensitive_key_absent(platform_db_password)",
            ValidationOutcome::Fatal("'platform_db_password' must not be set".to_string()),
        );
        report.stopped_early = true;

        let text = plain(OutputFormat::Text).render(&report, FINGERPRINT);
        assert!(text.contains("[ERROR] 'platform_db_password' must not be set"));
        assert!(text.contains("Stopped at the first fatal outcome"));
    }

    #[test]
    fn test_exit_status() {
        let mut report = sample();
        assert_eq!(Reporter::exit_status(&report), 0);

        report.push("url_shape(platform_server_url)", ValidationOutcome::Fatal("bad".to_string()));
        assert_eq!(Reporter::exit_status(&report), 1);
    }

    #[test]
    fn test_json_document() {
        let report = sample();
        let json = ReportJson::new(&report, FINGERPRINT, Utc::now());
        let value = serde_json::to_value(&json).unwrap();

        assert_eq!(value["fingerprint"], FINGERPRINT);
        assert_eq!(value["passed"], true);
        assert_eq!(value["counts"]["warnings"], 1);
        assert_eq!(value["results"][0]["check"], "exactly_one_of(vpc)");
        assert_eq!(value["results"][0]["status"], "ok");
        assert_eq!(value["results"][2]["status"], "warning");
        assert!(value["generated_at"].is_string());

        let rendered = plain(OutputFormat::Json).render(&report, FINGERPRINT);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["results"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_render_error_is_single_line() {
        let err = PreflightError::Config(ConfigError::MalformedConfig {
            line: 7,
            message: "expected 'key = value', found 'oops'".to_string(),
        });

        let text = plain(OutputFormat::Text).render_error(&err);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("[ERROR] "));
        assert!(text.contains("line 7"));

        let json = plain(OutputFormat::Json).render_error(&err);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["status"], "error");
    }

    #[test]
    fn test_emit_writes_trailing_newline() {
        let mut buffer = Vec::new();
        plain(OutputFormat::Json)
            .emit(&mut buffer, &sample(), FINGERPRINT)
            .unwrap();
        assert!(buffer.ends_with(b"\n"));
    }
}
