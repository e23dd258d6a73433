//! Error taxonomy for the library and CLI.
//!
//! Failures local to one rule or one file's content are reported as issues
//! instead; these variants cover what makes a run as a whole meaningless.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevkitError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Path does not exist: {}", .0.display())]
    MissingRoot(PathBuf),
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("file discovery failed: {0}")]
    Discovery(#[from] glob::GlobError),
    #[error("Validator plugin '{0}' is already registered")]
    DuplicatePlugin(String),
    #[error("Validation rule '{0}' is already registered")]
    DuplicateRule(String),
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to load schema '{name}' from '{}': {message}", path.display())]
    SchemaLoad {
        name: String,
        path: PathBuf,
        message: String,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl DevkitError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DevkitError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Internal failure of a single rule; converted into an issue by the validator.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct RuleError(pub String);

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        RuleError(message.into())
    }
}

pub type Result<T, E = DevkitError> = std::result::Result<T, E>;
