//! Plain text and JSON rendering of validation reports.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationReport;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::Config(format!(
                "Unknown output format '{}' (expected 'text' or 'json')",
                other
            ))),
        }
    }
}

/// Render a batch of `(source, report)` pairs in the requested format.
pub fn render(reports: &[(String, ValidationReport)], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(reports
            .iter()
            .map(|(source, report)| render_text(source, report))
            .collect()),
        OutputFormat::Json => render_json(reports),
    }
}

/// One line per finding, followed by a summary line for the source.
pub fn render_text(source: &str, report: &ValidationReport) -> String {
    let mut out = String::new();
    for finding in report.findings() {
        let block = finding.block_as.as_deref().unwrap_or("-");
        let path = if finding.path.is_empty() {
            "/"
        } else {
            finding.path.as_str()
        };
        let _ = writeln!(
            out,
            "{}: {:<7} {} [{}] {}: {}",
            source, finding.severity, path, block, finding.code, finding.message
        );
    }

    let errors = report.error_count();
    let warnings = report.warning_count();
    let verdict = if report.is_valid() { "valid" } else { "invalid" };
    let _ = writeln!(
        out,
        "{}: {} ({} {}, {} {})",
        source,
        verdict,
        errors,
        plural(errors, "error", "errors"),
        warnings,
        plural(warnings, "warning", "warnings"),
    );
    out
}

#[derive(Serialize)]
struct SourceReport<'a> {
    source: &'a str,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

pub fn render_json(reports: &[(String, ValidationReport)]) -> Result<String> {
    let entries: Vec<SourceReport<'_>> = reports
        .iter()
        .map(|(source, report)| SourceReport { source, report })
        .collect();
    let mut json = serde_json::to_string_pretty(&entries)?;
    json.push('\n');
    Ok(json)
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Finding, FindingCode, ReportBuilder};

    fn sample() -> ValidationReport {
        let mut builder = ReportBuilder::default();
        builder.push(Finding::new(
            FindingCode::NonSequentialNumbering,
            "Block number is 2, expected 1",
            Some("step_2".into()),
            "/code/block/0",
        ));
        builder.push(Finding::document(
            FindingCode::MissingConnectionConfig,
            "No connection configured for provider 'box'",
            "/config",
        ));
        builder.finish()
    }

    #[test]
    fn text_has_one_line_per_finding_plus_summary() {
        let text = render_text("r.json", &sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("NON_SEQUENTIAL_NUMBERING"));
        assert!(lines[0].contains("[step_2]"));
        assert!(lines[1].contains("[-]"));
        assert_eq!(lines[2], "r.json: invalid (2 errors, 0 warnings)");
    }

    #[test]
    fn json_carries_validity_and_source() {
        let json = render_json(&[("r.json".to_string(), sample())]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["source"], "r.json");
        assert_eq!(value[0]["is_valid"], false);
        assert_eq!(value[0]["findings"][1]["code"], "MISSING_CONNECTION_CONFIG");
        assert_eq!(value[0]["findings"][1]["block_as"], serde_json::Value::Null);
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
