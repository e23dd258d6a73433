//! JSON Schema validation for `.json` documents.
//!
//! The schema is chosen by convention: an explicit `$schema` URL ending in
//! `/<name>.json`, otherwise a well-known file path. Compiled validators are
//! memoized per rule instance; schemas never change during a process.

use super::ValidationRule;
use crate::error::{DevkitError, RuleError};
use crate::models::{ValidationContext, ValidationIssue, ValidationResult};
use jsonschema::error::{TypeKind, ValidationErrorKind};
use regex::Regex;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};
use tracing::debug;

pub const SCHEMA_RULE: &str = "schema";

static SCHEMA_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+)\.json$").expect("schema url regex"));

/// Where named schema documents come from.
pub trait SchemaSource: Send + Sync {
    fn load(&self, name: &str) -> Result<Json, DevkitError>;
}

#[derive(Debug, Clone)]
/// Reads `<dir>/<name>.json`.
pub struct DirectorySchemaSource {
    dir: PathBuf,
}

impl DirectorySchemaSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SchemaSource for DirectorySchemaSource {
    fn load(&self, name: &str) -> Result<Json, DevkitError> {
        let path = self.dir.join(format!("{}.json", name));
        let text = fs::read_to_string(&path).map_err(|e| DevkitError::io(&path, e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Validates JSON documents against conventionally named schemas.
pub struct SchemaRule {
    source: Box<dyn SchemaSource>,
    validators: Mutex<HashMap<String, Arc<jsonschema::Validator>>>,
}

impl SchemaRule {
    pub fn new(source: impl SchemaSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            validators: Mutex::new(HashMap::new()),
        }
    }

    /// Rule backed by schema files in `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirectorySchemaSource::new(dir))
    }

    /// Register a schema document under `name`, replacing any cached one.
    pub fn add_schema(&self, name: &str, schema: &Json) -> Result<(), DevkitError> {
        let compiled = compile(schema).map_err(|message| DevkitError::SchemaLoad {
            name: name.to_string(),
            path: PathBuf::from("<inline>"),
            message,
        })?;
        self.cache().insert(name.to_string(), Arc::new(compiled));
        Ok(())
    }

    /// Load a schema from an explicit file and register it under `name`.
    pub fn load_schema(&self, name: &str, path: &Path) -> Result<(), DevkitError> {
        let fail = |message: String| DevkitError::SchemaLoad {
            name: name.to_string(),
            path: path.to_path_buf(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let schema: Json = serde_json::from_str(&text).map_err(|e| fail(e.to_string()))?;
        let compiled = compile(&schema).map_err(fail)?;
        self.cache().insert(name.to_string(), Arc::new(compiled));
        Ok(())
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<jsonschema::Validator>>> {
        // a poisoned cache only ever holds fully compiled validators
        self.validators
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached validator for `name`, loading and compiling on first use.
    /// Failures are not cached.
    fn validator_for(&self, name: &str) -> Option<Arc<jsonschema::Validator>> {
        if let Some(v) = self.cache().get(name) {
            return Some(Arc::clone(v));
        }
        let schema = match self.source.load(name) {
            Ok(s) => s,
            Err(e) => {
                debug!(schema = name, error = %e, "could not load schema");
                return None;
            }
        };
        match compile(&schema) {
            Ok(compiled) => {
                let compiled = Arc::new(compiled);
                self.cache()
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::clone(&compiled));
                Some(compiled)
            }
            Err(message) => {
                debug!(schema = name, error = %message, "could not compile schema");
                None
            }
        }
    }
}

fn compile(schema: &Json) -> Result<jsonschema::Validator, String> {
    jsonschema::options()
        .should_validate_formats(true)
        .build(schema)
        .map_err(|e| e.to_string())
}

/// Schema name declared by `$schema`, else inferred from the file path.
pub fn schema_name(path: &str, data: &Json) -> Option<String> {
    if let Some(url) = data.get("$schema").and_then(Json::as_str) {
        if let Some(caps) = SCHEMA_URL.captures(url) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    let name = if path.contains("package.json") {
        "package"
    } else if path.contains("tsconfig.json") {
        "tsconfig"
    } else if path.contains(".vscode/settings.json") {
        "vscode-settings"
    } else if path.contains(".mcp/config.json") {
        "mcp-config"
    } else {
        return None;
    };
    Some(name.to_string())
}

fn suggest_fix(kind: &ValidationErrorKind) -> Option<String> {
    match kind {
        ValidationErrorKind::Required { property } => Some(format!(
            "Add required property: {}",
            property.as_str().map(str::to_string).unwrap_or_else(|| property.to_string())
        )),
        ValidationErrorKind::Type { kind } => Some(format!(
            "Expected type: {}",
            match kind {
                TypeKind::Single(t) => t.to_string(),
                other => format!("{:?}", other),
            }
        )),
        ValidationErrorKind::Enum { options } => {
            let allowed = match options {
                Json::Array(values) => values
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            Some(format!("Must be one of: {}", allowed))
        }
        ValidationErrorKind::Format { format } => Some(format!("Must match format: {}", format)),
        _ => None,
    }
}

impl ValidationRule for SchemaRule {
    fn name(&self) -> &str {
        SCHEMA_RULE
    }

    fn description(&self) -> &str {
        "Validates JSON documents against JSON schemas"
    }

    fn validate(&self, context: &ValidationContext) -> Result<ValidationResult, RuleError> {
        if !context.has_extension(".json") {
            return Ok(ValidationResult::pass());
        }
        let data: Json = match serde_json::from_str(&context.content) {
            Ok(v) => v,
            Err(e) => {
                let mut issue =
                    ValidationIssue::error(SCHEMA_RULE, format!("Invalid JSON: {}", e));
                if e.line() > 0 {
                    issue = issue.at_line(e.line()).at_column(e.column().max(1));
                }
                return Ok(ValidationResult::from_issues(vec![issue]));
            }
        };

        let Some(name) = schema_name(&context.path_str(), &data) else {
            return Ok(ValidationResult::pass());
        };
        let Some(validator) = self.validator_for(&name) else {
            return Ok(ValidationResult::from_issues(vec![ValidationIssue::warning(
                SCHEMA_RULE,
                format!("Schema '{}' not found", name),
            )]));
        };

        let issues: Vec<ValidationIssue> = validator
            .iter_errors(&data)
            .map(|err| {
                let path = err.instance_path.to_string();
                let message = if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{}: {}", path, err)
                };
                let issue = ValidationIssue::error(SCHEMA_RULE, message);
                match suggest_fix(&err.kind) {
                    Some(fix) => issue.with_fix(fix),
                    None => issue,
                }
            })
            .collect();
        Ok(ValidationResult::from_issues(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationSeverity;
    use serde_json::json;
    use tempfile::tempdir;

    fn ctx(path: &str, content: &str) -> ValidationContext {
        ValidationContext::new(path, "/proj", content)
    }

    #[test]
    fn test_non_json_is_skipped() {
        let rule = SchemaRule::from_dir("/nonexistent");
        let res = rule.validate(&ctx("notes.md", "{not json")).unwrap();
        assert!(res.valid);
        assert!(res.issues.is_empty());
    }

    #[test]
    fn test_malformed_json_single_error() {
        let rule = SchemaRule::from_dir("/nonexistent");
        let res = rule.validate(&ctx("/proj/package.json", r#"{"a":}"#)).unwrap();
        assert!(!res.valid);
        assert_eq!(res.issues.len(), 1);
        assert_eq!(res.issues[0].severity, ValidationSeverity::Error);
        assert!(res.issues[0].message.starts_with("Invalid JSON"));
        // no schema lookup happened, so no "not found" warning either
        assert!(rule.cache().is_empty());
    }

    #[test]
    fn test_schema_name_resolution() {
        let data = json!({"$schema": "https://example.org/schemas/widget.json"});
        assert_eq!(schema_name("a/b.json", &data).as_deref(), Some("widget"));
        let data = json!({});
        assert_eq!(schema_name("/p/package.json", &data).as_deref(), Some("package"));
        assert_eq!(schema_name("/p/tsconfig.json", &data).as_deref(), Some("tsconfig"));
        assert_eq!(
            schema_name("/p/.vscode/settings.json", &data).as_deref(),
            Some("vscode-settings")
        );
        assert_eq!(
            schema_name("/p/.mcp/config.json", &data).as_deref(),
            Some("mcp-config")
        );
        assert_eq!(schema_name("/p/data.json", &data), None);
    }

    #[test]
    fn test_unknown_document_is_valid() {
        let rule = SchemaRule::from_dir("/nonexistent");
        let res = rule.validate(&ctx("/proj/data.json", r#"{"x": 1}"#)).unwrap();
        assert!(res.valid);
        assert!(res.issues.is_empty());
    }

    #[test]
    fn test_missing_schema_degrades_to_warning() {
        let dir = tempdir().unwrap();
        let rule = SchemaRule::from_dir(dir.path());
        let res = rule
            .validate(&ctx("/proj/package.json", r#"{"name": "x"}"#))
            .unwrap();
        assert!(res.valid);
        assert_eq!(res.issues.len(), 1);
        assert_eq!(res.issues[0].severity, ValidationSeverity::Warning);
        assert_eq!(res.issues[0].message, "Schema 'package' not found");
    }

    #[test]
    fn test_schema_errors_become_issues_with_fixes() {
        let dir = tempdir().unwrap();
        let schema = json!({
            "type": "object",
            "required": ["name", "version"],
            "properties": {
                "name": {"type": "string"},
                "phase": {"enum": ["planning", "testing"]}
            }
        });
        fs::write(dir.path().join("package.json"), schema.to_string()).unwrap();
        let rule = SchemaRule::from_dir(dir.path());
        let res = rule
            .validate(&ctx("/proj/package.json", r#"{"name": 5, "phase": "done"}"#))
            .unwrap();
        assert!(!res.valid);
        assert_eq!(res.issues.len(), 3);
        assert!(res.issues.iter().all(|i| i.severity == ValidationSeverity::Error));
        let fixes: Vec<&str> = res.issues.iter().filter_map(|i| i.fix.as_deref()).collect();
        assert!(fixes.contains(&"Add required property: version"));
        assert!(fixes.iter().any(|f| f.starts_with("Expected type: ")));
        assert!(fixes.contains(&"Must be one of: planning, testing"));
        assert!(res.issues.iter().any(|i| i.message.starts_with("/name: ")));
    }

    #[test]
    fn test_compiled_schema_is_cached() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tsconfig.json"), r#"{"type": "object"}"#).unwrap();
        let rule = SchemaRule::from_dir(dir.path());
        let first = rule.validate(&ctx("/p/tsconfig.json", "{}")).unwrap();
        assert!(first.valid);
        fs::remove_file(dir.path().join("tsconfig.json")).unwrap();
        let second = rule.validate(&ctx("/p/tsconfig.json", "[]")).unwrap();
        // still compiled from the first load
        assert!(!second.valid);
        assert_eq!(second.issues.len(), 1);
    }

    #[test]
    fn test_add_schema_programmatically() {
        let rule = SchemaRule::from_dir("/nonexistent");
        rule.add_schema("widget", &json!({"type": "object", "required": ["id"]}))
            .unwrap();
        let res = rule
            .validate(&ctx(
                "/p/w.json",
                r#"{"$schema": "https://x.dev/widget.json"}"#,
            ))
            .unwrap();
        assert_eq!(res.issues.len(), 1);
        assert_eq!(res.issues[0].fix.as_deref(), Some("Add required property: id"));
    }
}
