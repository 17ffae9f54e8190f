//! # Violations and Reports
//!
//! A checker run produces one [`Report`]: the ordered list of [`Violation`]s
//! accumulated across every file, plus summary counts. Rules never abort the
//! pass — batch reporting is the contract, so one run surfaces everything a
//! tree has wrong with it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Severity of a violation.
///
/// Warnings never affect the exit code unless the run is strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Advisory finding; exit code stays 0 without `--strict`.
    Warning,
    /// Convention violation; any error makes the run exit non-zero.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Identifier of a convention rule.
///
/// One variant per rule; the default severity lives here so the checker and
/// the report can never disagree about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Firmware file includes packages out of layer order.
    OrderViolation,
    /// Literal credential in a shared package.
    SecretLeak,
    /// Name breaks the lowercase-hyphen / snake_case / Title Case convention.
    NamingViolation,
    /// Diagnostic-pattern entity without `entity_category: diagnostic`.
    MissingCategory,
    /// gpio binary_sensor without both `delayed_on` and `delayed_off`.
    DebounceMissing,
    /// Required substitution not declared for the file's layer.
    MissingSubstitution,
    /// Firmware file not ready for dashboard adoption.
    AdoptionBlocked,
    /// `${x}` reference with no binding at the same or an earlier layer.
    UnboundSubstitution,
    /// File could not be parsed as YAML.
    MalformedYaml,
    /// Document shape fails the layer's structural schema.
    SchemaViolation,
}

impl RuleId {
    /// The severity this rule reports at.
    pub fn default_severity(self) -> Severity {
        match self {
            RuleId::DebounceMissing => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable rule name as it appears in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::OrderViolation => "OrderViolation",
            RuleId::SecretLeak => "SecretLeak",
            RuleId::NamingViolation => "NamingViolation",
            RuleId::MissingCategory => "MissingCategory",
            RuleId::DebounceMissing => "DebounceMissing",
            RuleId::MissingSubstitution => "MissingSubstitution",
            RuleId::AdoptionBlocked => "AdoptionBlocked",
            RuleId::UnboundSubstitution => "UnboundSubstitution",
            RuleId::MalformedYaml => "MalformedYaml",
            RuleId::SchemaViolation => "SchemaViolation",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single convention violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path of the offending file, relative to the tree root.
    pub file: PathBuf,
    /// The rule that was violated.
    pub rule: RuleId,
    /// Severity as computed by the rule.
    pub severity: Severity,
    /// Human-readable description of the finding.
    pub message: String,
}

impl Violation {
    /// Construct a violation at the rule's default severity.
    pub fn new(file: impl Into<PathBuf>, rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            rule,
            severity: rule.default_severity(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: [{}] {}",
            self.severity,
            self.file.display(),
            self.rule,
            self.message
        )
    }
}

/// The accumulated result of a checker run.
///
/// Violations are ordered: files in sorted path order, and within a file in
/// rule-execution order. Two runs over the same unchanged tree produce
/// identical reports.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Number of YAML files that were checked.
    pub files_checked: usize,
    /// All accumulated violations.
    pub violations: Vec<Violation>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Append a batch of violations.
    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    /// Count of error-severity violations.
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    /// Count of warning-severity violations.
    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    /// Count of violations for a specific rule.
    pub fn count_for(&self, rule: RuleId) -> usize {
        self.violations.iter().filter(|v| v.rule == rule).count()
    }

    /// Whether the report contains any error-severity violation.
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Stable-sort violations by file path.
    ///
    /// Within a file, existing order is preserved — callers append rule
    /// findings before schema findings and rely on that staying put.
    pub fn sort_by_file(&mut self) {
        self.violations.sort_by(|a, b| a.file.cmp(&b.file));
    }

    /// Process exit code for this report.
    ///
    /// Errors always fail the run; in strict mode any violation does.
    /// The report body itself is unaffected by strictness.
    pub fn exit_code(&self, strict: bool) -> u8 {
        if self.has_errors() || (strict && !self.violations.is_empty()) {
            1
        } else {
            0
        }
    }
}
