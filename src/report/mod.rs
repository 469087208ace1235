//! Validation findings and the report that aggregates them.

pub mod render;

pub use render::{OutputFormat, render, render_json, render_text};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Stable identifiers agents and CI scripts can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    // Document
    MalformedDocument,

    // Structure
    RootNotTrigger,
    NestedTrigger,
    NonSequentialNumbering,
    DuplicateAlias,
    MissingBlockField,
    UnknownKeyword,

    // Schema
    MissingRequiredField,
    FieldKindMismatch,

    // Provider
    UnknownProvider,
    InvalidOperation,

    // Data pills
    MalformedDataPill,
    UnresolvedDataPillReference,

    // Connections
    MissingConnectionConfig,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::MalformedDocument => "MALFORMED_DOCUMENT",
            FindingCode::RootNotTrigger => "ROOT_NOT_TRIGGER",
            FindingCode::NestedTrigger => "NESTED_TRIGGER",
            FindingCode::NonSequentialNumbering => "NON_SEQUENTIAL_NUMBERING",
            FindingCode::DuplicateAlias => "DUPLICATE_ALIAS",
            FindingCode::MissingBlockField => "MISSING_BLOCK_FIELD",
            FindingCode::UnknownKeyword => "UNKNOWN_KEYWORD",
            FindingCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            FindingCode::FieldKindMismatch => "FIELD_KIND_MISMATCH",
            FindingCode::UnknownProvider => "UNKNOWN_PROVIDER",
            FindingCode::InvalidOperation => "INVALID_OPERATION",
            FindingCode::MalformedDataPill => "MALFORMED_DATA_PILL",
            FindingCode::UnresolvedDataPillReference => "UNRESOLVED_DATA_PILL_REFERENCE",
            FindingCode::MissingConnectionConfig => "MISSING_CONNECTION_CONFIG",
        }
    }

    /// Unknown connectors may be private custom connectors, so the open-world
    /// codes are warnings; everything else blocks deployment.
    pub fn severity(&self) -> Severity {
        match self {
            FindingCode::UnknownProvider | FindingCode::FieldKindMismatch => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: FindingCode,
    pub message: String,
    /// Alias of the block concerned; `None` for document-level findings.
    pub block_as: Option<String>,
    /// JSON pointer into the recipe document, e.g. `/code/block/0/input/message`.
    pub path: String,
}

impl Finding {
    pub fn new(
        code: FindingCode,
        message: impl Into<String>,
        block_as: Option<String>,
        path: impl Into<String>,
    ) -> Self {
        Finding {
            severity: code.severity(),
            code,
            message: message.into(),
            block_as,
            path: path.into(),
        }
    }

    pub fn document(code: FindingCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Finding::new(code, message, None, path)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.block_as {
            Some(alias) => write!(
                f,
                "{}[{}] {} (block '{}' at {})",
                self.severity, self.code, self.message, alias, self.path
            ),
            None => write!(
                f,
                "{}[{}] {} (at {})",
                self.severity, self.code, self.message, self.path
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Ordered findings for one recipe. Built once per validation call and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    is_valid: bool,
    findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn single(finding: Finding) -> Self {
        let mut builder = ReportBuilder::default();
        builder.push(finding);
        builder.finish()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn count(&self, code: FindingCode) -> usize {
        self.findings.iter().filter(|f| f.code == code).count()
    }

    pub fn has(&self, code: FindingCode) -> bool {
        self.count(code) > 0
    }
}

/// Accumulates findings in the order they are discovered.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    findings: Vec<Finding>,
}

impl ReportBuilder {
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub(crate) fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn finish(self) -> ValidationReport {
        let is_valid = !self.findings.iter().any(Finding::is_error);
        ValidationReport {
            is_valid,
            findings: self.findings,
        }
    }
}

impl Extend<Finding> for ReportBuilder {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        self.findings.extend(iter);
    }
}
