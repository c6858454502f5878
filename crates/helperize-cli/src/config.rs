//! Configuration file support for helperize
//!
//! Loads `.helperize.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use helperize_rules::RewriteConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".helperize.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: RuleConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

/// Overrides of the rewrite names; unset fields keep the Laravel defaults
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub base_class: Option<String>,
    pub self_reference: Option<String>,
    pub member_name: Option<String>,
    pub helper_function: Option<String>,
    /// Replaces the default exclusion list
    pub excluded_calls: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl RuleConfig {
    /// Layer these overrides on top of `base`
    pub fn apply(&self, base: RewriteConfig) -> RewriteConfig {
        RewriteConfig {
            base_class: self.base_class.clone().unwrap_or(base.base_class),
            self_reference: self.self_reference.clone().unwrap_or(base.self_reference),
            member_name: self.member_name.clone().unwrap_or(base.member_name),
            helper_function: self.helper_function.clone().unwrap_or(base.helper_function),
            excluded_calls: self.excluded_calls.clone().unwrap_or(base.excluded_calls),
        }
    }
}

impl Config {
    /// Load config from `.helperize.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // `vendor/` style patterns match a directory anywhere in the path
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}
