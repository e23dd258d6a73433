//! Rule registry: plugin registration and rule lookup.
//!
//! Rules are keyed `plugin/rule`. The registry is populated once at startup
//! and then shared read-only (`Arc<RuleRegistry>`) with validators; it must
//! not be mutated while a run is in progress.

use crate::error::{DevkitError, Result};
use crate::models::RuleOptions;
use crate::rules::{BuiltinPlugin, ValidationRule, ValidatorPlugin};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
/// A rule together with its qualified key.
pub struct RegisteredRule {
    pub key: String,
    pub plugin: String,
    pub rule: Arc<dyn ValidationRule>,
}

impl RegisteredRule {
    pub fn name(&self) -> &str {
        self.rule.name()
    }
}

#[derive(Default)]
pub struct RuleRegistry {
    plugins: Vec<Box<dyn ValidatorPlugin>>,
    rules: Vec<RegisteredRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in plugin.
    pub fn with_builtins(schema_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(BuiltinPlugin::new(schema_dir)))?;
        Ok(registry)
    }

    /// Register a plugin and all of its rules.
    ///
    /// Fails without inserting anything when the plugin name or any
    /// `plugin/rule` key is already taken.
    pub fn register(&mut self, mut plugin: Box<dyn ValidatorPlugin>) -> Result<()> {
        let plugin_name = plugin.name().to_string();
        if self.get_plugin(&plugin_name).is_some() {
            return Err(DevkitError::DuplicatePlugin(plugin_name));
        }

        let mut fresh: Vec<RegisteredRule> = Vec::new();
        let mut seen: HashSet<String> = self.rules.iter().map(|r| r.key.clone()).collect();
        for rule in plugin.rules() {
            let key = format!("{}/{}", plugin_name, rule.name());
            if !seen.insert(key.clone()) {
                return Err(DevkitError::DuplicateRule(key));
            }
            fresh.push(RegisteredRule {
                key,
                plugin: plugin_name.clone(),
                rule,
            });
        }

        debug!(plugin = %plugin_name, rules = fresh.len(), "registered validator plugin");
        self.rules.extend(fresh);
        plugin.configure(&RuleOptions::new());
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn get_plugin(&self, name: &str) -> Option<&dyn ValidatorPlugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn ValidatorPlugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    /// Exact `plugin/rule` match first, then the first registered key ending
    /// in `/name`. With same-named rules in several plugins the earliest
    /// registration wins.
    pub fn get_rule(&self, name: &str) -> Option<Arc<dyn ValidationRule>> {
        let suffix = format!("/{}", name);
        self.rules
            .iter()
            .find(|r| r.key == name)
            .or_else(|| self.rules.iter().find(|r| r.key.ends_with(&suffix)))
            .map(|r| Arc::clone(&r.rule))
    }

    /// All rules in registration order.
    pub fn all_rules(&self) -> Vec<Arc<dyn ValidationRule>> {
        self.rules.iter().map(|r| Arc::clone(&r.rule)).collect()
    }

    pub fn entries(&self) -> &[RegisteredRule] {
        &self.rules
    }

    pub fn rule_keys(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Drop every plugin and rule. Meant for test isolation.
    pub fn clear(&mut self) {
        self.plugins.clear();
        self.rules.clear();
    }
}
