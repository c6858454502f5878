//! Rule: Replace `$this->faker` with the `fake()` helper inside factories
//!
//! ```php
//! // before
//! 'name' => $this->faker->name(),
//! // after
//! 'name' => fake()->name(),
//! ```
//!
//! Only array literals inside classes descending from the configured base
//! class are touched. Calls listed in `excluded_calls` (`randomEnum` by
//! default) keep the instance.

use helperize_core::{dedup_edits, ClassHierarchy, Edit, FileScope, NodeId, SyntaxTree};
use mago_syntax::ast::Program;
use tracing::{debug, trace};

use crate::config::{ConfigurationError, RewriteConfig};
use crate::engine::{Outcome, RewriteEngine};
use crate::php::{collect_declarations, collect_edits, lower_array_literals};
use crate::registry::Rule;

/// Check a parsed PHP program with an explicit engine
pub fn check_faker_helper_with_engine(
    program: &Program<'_>,
    source: &str,
    hierarchy: &ClassHierarchy,
    engine: &RewriteEngine,
) -> Vec<Edit> {
    let declarations = collect_declarations(program, source);
    if declarations.is_empty() {
        return Vec::new();
    }

    let scope = FileScope::new(hierarchy, declarations);
    let (mut tree, roots) = lower_array_literals(program, source);
    trace!(roots = roots.len(), "evaluating array literals");

    let message = edit_message(engine.config());
    let mut edits = Vec::new();
    for root in roots {
        edits.extend(rewrite_root(engine, &mut tree, root, &scope, source, &message));
    }

    dedup_edits(edits)
}

/// Check a parsed PHP program with the default Laravel configuration
pub fn check_faker_helper(
    program: &Program<'_>,
    source: &str,
    hierarchy: &ClassHierarchy,
) -> Vec<Edit> {
    FakerHelperRule::new().check(program, source, hierarchy)
}

fn rewrite_root(
    engine: &RewriteEngine,
    tree: &mut SyntaxTree,
    root: NodeId,
    scope: &FileScope<'_>,
    source: &str,
    message: &str,
) -> Vec<Edit> {
    match engine.apply(tree, root, scope) {
        Outcome::Unchanged => Vec::new(),
        Outcome::Changed { root, replacements } => {
            debug!(
                offset = ?tree.span(root).map(|s| s.start.offset),
                replacements, "rewrote array literal"
            );
            collect_edits(tree, root, source, message)
        }
    }
}

fn edit_message(config: &RewriteConfig) -> String {
    format!(
        "Replace ${}->{} with {}()",
        config.self_reference, config.member_name, config.helper_function
    )
}

/// Rewrite rule wrapping a validated [`RewriteEngine`]
pub struct FakerHelperRule {
    engine: RewriteEngine,
}

impl FakerHelperRule {
    pub fn new() -> Self {
        Self {
            engine: RewriteEngine::default(),
        }
    }

    pub fn with_config(config: RewriteConfig) -> Result<Self, ConfigurationError> {
        Ok(Self {
            engine: RewriteEngine::new(config)?,
        })
    }

    pub fn config(&self) -> &RewriteConfig {
        self.engine.config()
    }
}

impl Default for FakerHelperRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for FakerHelperRule {
    fn name(&self) -> &'static str {
        "faker_helper"
    }

    fn description(&self) -> &'static str {
        "Replace $this->faker with the fake() helper function in Factories"
    }

    fn check<'a>(&self, program: &Program<'a>, source: &str, hierarchy: &ClassHierarchy) -> Vec<Edit> {
        check_faker_helper_with_engine(program, source, hierarchy, &self.engine)
    }
}
