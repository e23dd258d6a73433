//! Shared data models for validation outcomes.
//!
//! Issues flow upward: a rule produces a `ValidationResult` for one file,
//! the validator folds every rule's result into a `ValidationReport`, and
//! a run folds all reports into a `ValidationSummary`. Everything here is
//! constructed once and only read afterwards.

pub mod context;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use context::{RuleOptions, ValidationContext};

/// Static identifier stamped on every report.
pub const VALIDATOR_ID: &str = "mcp-devkit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Issue severity, ordered from most to least blocking.
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
    Hint,
}

impl ValidationSeverity {
    pub const ALL: [ValidationSeverity; 4] = [
        ValidationSeverity::Error,
        ValidationSeverity::Warning,
        ValidationSeverity::Info,
        ValidationSeverity::Hint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationSeverity::Error => "error",
            ValidationSeverity::Warning => "warning",
            ValidationSeverity::Info => "info",
            ValidationSeverity::Hint => "hint",
        }
    }

    /// Whether an issue of this severity fails a file.
    pub fn is_blocking(&self, strict: bool) -> bool {
        match self {
            ValidationSeverity::Error => true,
            ValidationSeverity::Warning => strict,
            _ => false,
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single finding produced by a rule.
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        rule: impl Into<String>,
        severity: ValidationSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
            column: None,
            rule: rule.into(),
            fix: None,
        }
    }

    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, ValidationSeverity::Error, message)
    }

    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, ValidationSeverity::Warning, message)
    }

    /// Attach a 1-based line number.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a 1-based column number.
    pub fn at_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    /// `:line[:column]` suffix used by the renderers; empty without a line.
    pub fn location(&self) -> String {
        match (self.line, self.column) {
            (Some(l), Some(c)) => format!(":{}:{}", l, c),
            (Some(l), None) => format!(":{}", l),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Output of one rule on one file.
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Trivially valid result for files a rule does not handle.
    pub fn pass() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }

    /// `valid` is derived from the issues: false iff any is an error.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error);
        Self { valid, issues }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Aggregate of every selected rule's result for one file.
pub struct ValidationReport {
    pub file_path: String,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// Milliseconds spent on this file across all rules.
    pub execution_time: f64,
    pub validator: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Issue counts per severity; all four keys are always serialized.
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub hint: usize,
}

impl SeverityCounts {
    pub fn record(&mut self, severity: ValidationSeverity) {
        match severity {
            ValidationSeverity::Error => self.error += 1,
            ValidationSeverity::Warning => self.warning += 1,
            ValidationSeverity::Info => self.info += 1,
            ValidationSeverity::Hint => self.hint += 1,
        }
    }

    pub fn get(&self, severity: ValidationSeverity) -> usize {
        match severity {
            ValidationSeverity::Error => self.error,
            ValidationSeverity::Warning => self.warning,
            ValidationSeverity::Info => self.info,
            ValidationSeverity::Hint => self.hint,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Aggregate over all files of one run.
pub struct ValidationSummary {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub total_issues: usize,
    pub issues_by_severity: SeverityCounts,
    pub reports: Vec<ValidationReport>,
    /// Wall-clock milliseconds for the whole run.
    pub execution_time: f64,
}

impl ValidationSummary {
    pub fn empty() -> Self {
        Self {
            total_files: 0,
            valid_files: 0,
            invalid_files: 0,
            total_issues: 0,
            issues_by_severity: SeverityCounts::default(),
            reports: Vec::new(),
            execution_time: 0.0,
        }
    }

    /// Fold reports (kept in the given order) into a summary.
    pub fn from_reports(reports: Vec<ValidationReport>, execution_time: f64) -> Self {
        let mut by_sev = SeverityCounts::default();
        for report in &reports {
            for issue in &report.issues {
                by_sev.record(issue.severity);
            }
        }
        let valid_files = reports.iter().filter(|r| r.valid).count();
        Self {
            total_files: reports.len(),
            valid_files,
            invalid_files: reports.len() - valid_files,
            total_issues: reports.iter().map(|r| r.issues.len()).sum(),
            issues_by_severity: by_sev,
            reports,
            execution_time,
        }
    }
}
