//! Validation runner.
//!
//! Resolves a file set by glob, runs the selected rules over each file and
//! folds the per-file reports into a `ValidationSummary`. Files are spread
//! over a bounded rayon pool; rules for a single file always run one after
//! another in registry order, and reports keep discovery order.

use crate::discovery::discover;
use crate::error::{DevkitError, Result};
use crate::models::{
    RuleOptions, ValidationContext, ValidationIssue, ValidationReport, ValidationSeverity,
    ValidationSummary, VALIDATOR_ID,
};
use crate::registry::{RegisteredRule, RuleRegistry};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Upper bound on files validated at once.
pub const MAX_CONCURRENCY: usize = 5;

/// Project metadata directory holding the context documents.
pub const METADATA_DIR: &str = ".mcp";

/// Glob used by `validate_project`, relative to the project root.
pub const PROJECT_PATTERN: &str = ".mcp/**/*.md";

#[derive(Debug, Clone, Serialize)]
/// Immutable settings for one validator.
pub struct ValidationOptions {
    /// Any issue at all, not just errors, fails a file.
    pub strict: bool,
    /// Rule allow-list; `None` runs every registered rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub parallel: bool,
    /// Reserved for auto-fix; accepted and currently ignored.
    pub fix: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict: false,
            rules: None,
            exclude: Vec::new(),
            parallel: true,
            fix: false,
        }
    }
}

impl ValidationOptions {
    fn as_rule_options(&self) -> RuleOptions {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => RuleOptions::new(),
        }
    }
}

/// Compiled form of one `rules` allow-list entry.
#[derive(Debug)]
struct RulePattern {
    raw: String,
    wildcard: Option<Regex>,
}

impl RulePattern {
    fn new(raw: &str) -> Self {
        // only the first `*` is a wildcard; the match is unanchored
        let wildcard = raw.split_once('*').and_then(|(head, tail)| {
            Regex::new(&format!("{}.*{}", regex::escape(head), regex::escape(tail))).ok()
        });
        Self {
            raw: raw.to_string(),
            wildcard,
        }
    }

    fn selects(&self, entry: &RegisteredRule) -> bool {
        let name = entry.name();
        if name == self.raw {
            return true;
        }
        if let Some(re) = &self.wildcard {
            if re.is_match(name) {
                return true;
            }
        }
        entry.key.ends_with(&format!("/{}", self.raw))
    }
}

pub struct Validator {
    options: ValidationOptions,
    registry: Arc<RuleRegistry>,
    rule_options: RuleOptions,
}

impl Validator {
    pub fn new(registry: Arc<RuleRegistry>, options: ValidationOptions) -> Self {
        if options.fix {
            debug!("--fix requested; automatic fixes are not applied");
        }
        let rule_options = options.as_rule_options();
        Self {
            options,
            registry,
            rule_options,
        }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Registry entries selected by the `rules` allow-list, in registry order.
    pub fn rules_to_run(&self) -> Vec<&RegisteredRule> {
        let entries = self.registry.entries();
        match self.options.rules.as_deref() {
            Some(patterns) if !patterns.is_empty() => {
                let compiled: Vec<RulePattern> =
                    patterns.iter().map(|p| RulePattern::new(p)).collect();
                entries
                    .iter()
                    .filter(|e| compiled.iter().any(|p| p.selects(e)))
                    .collect()
            }
            _ => entries.iter().collect(),
        }
    }

    /// Validate one file with every selected rule.
    ///
    /// Read failures propagate. A rule that errors or panics is recorded as
    /// an error issue and the remaining rules still run.
    pub fn validate_file(&self, file_path: &Path, project_root: &Path) -> Result<ValidationReport> {
        let started = Instant::now();
        let content =
            fs::read_to_string(file_path).map_err(|e| DevkitError::io(file_path, e))?;
        let context = ValidationContext::new(file_path, project_root, content)
            .with_options(self.rule_options.clone());

        let mut issues: Vec<ValidationIssue> = Vec::new();
        for entry in self.rules_to_run() {
            let rule = &entry.rule;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.validate(&context)));
            let failure = match outcome {
                Ok(Ok(result)) => {
                    issues.extend(result.issues);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            error!(rule = rule.name(), file = %file_path.display(), "rule failed: {}", failure);
            issues.push(ValidationIssue::error(
                rule.name(),
                format!("Rule {} failed: {}", rule.name(), failure),
            ));
        }

        let has_errors = issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error);
        let valid = !has_errors && (!self.options.strict || issues.is_empty());
        let rel = pathdiff::diff_paths(file_path, project_root)
            .unwrap_or_else(|| file_path.to_path_buf());

        Ok(ValidationReport {
            file_path: rel.to_string_lossy().to_string(),
            valid,
            issues,
            execution_time: started.elapsed().as_secs_f64() * 1000.0,
            validator: VALIDATOR_ID.to_string(),
        })
    }

    /// Validate every file matching `pattern` under `project_root`.
    pub fn validate_files(&self, pattern: &str, project_root: &Path) -> Result<ValidationSummary> {
        let started = Instant::now();
        if !project_root.exists() {
            return Err(DevkitError::MissingRoot(project_root.to_path_buf()));
        }
        let files = discover(pattern, project_root, &self.options.exclude)?;
        if files.is_empty() {
            warn!("No files found matching pattern: {}", pattern);
            return Ok(ValidationSummary::empty());
        }

        let ceiling = if self.options.parallel {
            MAX_CONCURRENCY
        } else {
            1
        };
        debug!(files = files.len(), concurrency = ceiling, "validating files");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(ceiling)
            .build()?;
        // indexed collect keeps discovery order whatever finishes first
        let reports: Vec<ValidationReport> = pool.install(|| {
            files
                .par_iter()
                .map(|path| self.validate_file(path, project_root))
                .collect::<Result<Vec<_>>>()
        })?;

        Ok(ValidationSummary::from_reports(
            reports,
            started.elapsed().as_secs_f64() * 1000.0,
        ))
    }

    /// Validate all markdown documents under the project's `.mcp` directory.
    pub fn validate_project(&self, project_root: &Path) -> Result<ValidationSummary> {
        self.validate_files(PROJECT_PATTERN, project_root)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}
