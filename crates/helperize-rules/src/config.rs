//! Rewrite configuration
//!
//! Every name the rule matches on or produces is data, so the same engine
//! handles other "legacy accessor to helper function" migrations.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Setup-time failure. Never raised while rewriting.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required setting `{0}`")]
    MissingField(&'static str),

    #[error("Invalid value for `{field}`: {value:?}")]
    InvalidName { field: &'static str, value: String },

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Names driving the member-chain to helper rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Only classes descending from this one are rewritten
    pub base_class: String,
    /// Name of the self-reference variable, without sigil
    pub self_reference: String,
    /// Property accessed on the self-reference (`$this->faker`)
    pub member_name: String,
    /// Function whose zero-argument call replaces the property fetch
    pub helper_function: String,
    /// Calls on the property that must keep the raw instance
    pub excluded_calls: Vec<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            base_class: "Illuminate\\Database\\Eloquent\\Factories\\Factory".to_string(),
            self_reference: "this".to_string(),
            member_name: "faker".to_string(),
            helper_function: "fake".to_string(),
            // spatie/laravel-enum's faker provider needs the instance itself
            excluded_calls: vec!["randomEnum".to_string()],
        }
    }
}

impl RewriteConfig {
    /// Check that every required name is present and well-formed
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_name("base_class", &self.base_class)?;
        check_name("self_reference", &self.self_reference)?;
        check_name("member_name", &self.member_name)?;
        check_name("helper_function", &self.helper_function)?;
        for call in &self.excluded_calls {
            check_name("excluded_calls", call)?;
        }
        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        let config: RewriteConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// True if `call` is on the exclusion list (case-insensitive, like PHP method names)
    pub fn is_excluded_call(&self, call: &str) -> bool {
        self.excluded_calls
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(call))
    }
}

fn check_name(field: &'static str, value: &str) -> Result<(), ConfigurationError> {
    if value.trim().is_empty() {
        return Err(ConfigurationError::MissingField(field));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigurationError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
