//! Input handed to a rule invocation.

use serde_json::{Map, Value as Json};
use std::path::{Path, PathBuf};

/// Opaque key/value bag passed through from the validator's configuration.
pub type RuleOptions = Map<String, Json>;

#[derive(Debug, Clone)]
/// One file's content plus where it lives.
pub struct ValidationContext {
    pub file_path: PathBuf,
    pub project_root: PathBuf,
    pub content: String,
    pub options: RuleOptions,
}

impl ValidationContext {
    pub fn new(
        file_path: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            project_root: project_root.into(),
            content: content.into(),
            options: RuleOptions::new(),
        }
    }

    pub fn with_options(mut self, options: RuleOptions) -> Self {
        self.options = options;
        self
    }

    /// True when the path ends with `ext` (given with the leading dot).
    pub fn has_extension(&self, ext: &str) -> bool {
        self.path_str().ends_with(ext)
    }

    /// Path with forward slashes, for substring conventions.
    pub fn path_str(&self) -> String {
        self.file_path.to_string_lossy().replace('\\', "/")
    }

    /// Lower-cased final path component.
    pub fn file_name_lower(&self) -> String {
        file_name_lower(&self.file_path)
    }
}

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
