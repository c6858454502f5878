//! Rule trait and registry for helperize rewrite rules

use helperize_core::{ClassHierarchy, Edit};
use mago_syntax::ast::Program;
use std::collections::HashSet;

use crate::config::{ConfigurationError, RewriteConfig};
use crate::faker_helper::FakerHelperRule;

/// A rewrite rule that can detect and suggest code transformations
pub trait Rule: Send + Sync {
    /// The unique identifier for this rule (e.g., "faker_helper")
    fn name(&self) -> &'static str;

    /// A short description of what this rule does
    fn description(&self) -> &'static str;

    /// Check a PHP program and return suggested edits.
    ///
    /// `hierarchy` holds the class declarations of the whole project and is
    /// only read.
    fn check<'a>(&self, program: &Program<'a>, source: &str, hierarchy: &ClassHierarchy) -> Vec<Edit>;
}

/// Registry of available rewrite rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a registry with the built-in rules in their default configuration
    pub fn new() -> Self {
        let mut registry = Self { rules: Vec::new() };
        registry.register(Box::new(FakerHelperRule::new()));
        registry
    }

    /// Create a registry whose built-in rules use `config`
    pub fn with_config(config: RewriteConfig) -> Result<Self, ConfigurationError> {
        let mut registry = Self { rules: Vec::new() };
        registry.register(Box::new(FakerHelperRule::with_config(config)?));
        Ok(registry)
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn all_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Get rules filtered by enabled names
    pub fn get_enabled(&self, enabled: &HashSet<String>) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|r| enabled.contains(r.name()))
            .map(|r| r.as_ref())
            .collect()
    }

    /// Names and descriptions (for --list-rules)
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.description()))
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules() {
        let registry = RuleRegistry::new();
        assert_eq!(registry.all_names(), vec!["faker_helper"]);
        assert_eq!(
            registry.list_rules(),
            vec![(
                "faker_helper",
                "Replace $this->faker with the fake() helper function in Factories"
            )]
        );
    }

    #[test]
    fn test_get_enabled_filters() {
        let registry = RuleRegistry::new();
        let none = HashSet::new();
        assert!(registry.get_enabled(&none).is_empty());

        let enabled: HashSet<String> = ["faker_helper".to_string()].into_iter().collect();
        assert_eq!(registry.get_enabled(&enabled).len(), 1);
    }

    #[test]
    fn test_with_invalid_config() {
        let config = RewriteConfig {
            member_name: String::new(),
            ..RewriteConfig::default()
        };
        assert!(matches!(
            RuleRegistry::with_config(config),
            Err(ConfigurationError::MissingField("member_name"))
        ));
    }
}
