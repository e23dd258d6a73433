//! Built-in plugin bundling the core rules.

use super::{MarkdownRule, SchemaRule, ValidationRule, ValidatorPlugin};
use crate::models::RuleOptions;
use std::path::PathBuf;
use std::sync::Arc;

pub const BUILTIN_PLUGIN: &str = "builtin";

/// `schema` then `markdown`, in that order.
pub struct BuiltinPlugin {
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl BuiltinPlugin {
    /// Schema documents are looked up in `schema_dir`.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules: vec![
                Arc::new(SchemaRule::from_dir(schema_dir)),
                Arc::new(MarkdownRule::new()),
            ],
        }
    }
}

impl ValidatorPlugin for BuiltinPlugin {
    fn name(&self) -> &str {
        BUILTIN_PLUGIN
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn rules(&self) -> Vec<Arc<dyn ValidationRule>> {
        self.rules.clone()
    }

    // rules take their settings from the validator's options at run time
    fn configure(&mut self, _options: &RuleOptions) {}
}
