//! Validation rules and plugins.
//!
//! A rule is a named check over one file's content. Rules dispatch on file
//! extension and return `ValidationResult::pass()` for files they do not
//! understand. Plugins bundle rules under a namespace for the registry.

pub mod builtin;
pub mod markdown;
pub mod schema;

use crate::error::RuleError;
use crate::models::{RuleOptions, ValidationContext, ValidationResult};
use std::sync::Arc;

pub use builtin::BuiltinPlugin;
pub use markdown::MarkdownRule;
pub use schema::{DirectorySchemaSource, SchemaRule, SchemaSource};

/// A named, independently testable check over one file.
///
/// Implementations must not touch the filesystem beyond what `context`
/// carries; schema-backed rules may lazily load their schemas.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn validate(&self, context: &ValidationContext) -> Result<ValidationResult, RuleError>;
}

/// A named, versioned bundle of rules.
pub trait ValidatorPlugin: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    /// Rules in declaration order.
    fn rules(&self) -> Vec<Arc<dyn ValidationRule>>;
    /// One-time hook invoked by the registry after registration.
    fn configure(&mut self, _options: &RuleOptions) {}
}
