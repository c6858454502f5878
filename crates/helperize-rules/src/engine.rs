//! Rewrite engine: eligibility, traversal and substitution for one root
//!
//! `apply` is silent on the common path. Most array literals a host hands
//! over are not inside a matching class and simply come back `Unchanged`.

use helperize_core::{walk, NodeId, NodeKind, PruneSignal, SymbolContextResolver, SyntaxTree};

use crate::config::{ConfigurationError, RewriteConfig};
use crate::matcher::{CallOnMemberMatcher, MemberChainMatcher, NodeMatcher};

/// Result of evaluating one root node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing matched; the caller keeps its original text
    Unchanged,
    /// `root` was mutated in place by `replacements` substitutions and
    /// should be re-emitted
    Changed { root: NodeId, replacements: usize },
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed { .. })
    }
}

/// Applies the member-chain to helper rewrite under array literals
#[derive(Debug, Clone)]
pub struct RewriteEngine {
    config: RewriteConfig,
}

impl RewriteEngine {
    /// Validate `config` and build an engine around it
    pub fn new(config: RewriteConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Evaluate `root` and rewrite matching entries in place.
    pub fn apply<R>(&self, tree: &mut SyntaxTree, root: NodeId, resolver: &R) -> Outcome
    where
        R: SymbolContextResolver + ?Sized,
    {
        let NodeKind::ArrayLiteral { items } = tree.kind(root) else {
            return Outcome::Unchanged;
        };
        let items = items.clone();

        let Some(context) = resolver.resolve(tree, root) else {
            return Outcome::Unchanged;
        };
        if !context.is_subclass_of(&self.config.base_class) {
            return Outcome::Unchanged;
        }

        let call_on_member = CallOnMemberMatcher::new(&self.config);
        let member_chain = MemberChainMatcher::new(&self.config);
        let mut replacements = 0;

        walk(tree, &items, |tree, node| {
            let node_ref = tree.node(node);
            if node_ref.is_synthesized() {
                return PruneSignal::SkipSubtree;
            }

            match node_ref.kind {
                NodeKind::InterpolatedString { .. } => return PruneSignal::SkipSubtree,
                // A call never falls through to the property matcher, even
                // when its name is excluded.
                NodeKind::MethodCall { .. } => {
                    if let Some(found) = call_on_member.try_match(tree, node) {
                        if tree.replace_child(found.parent, found.old, found.new) {
                            replacements += 1;
                        }
                    }
                }
                NodeKind::PropertyFetch { .. } => {
                    if let Some(found) = member_chain.try_match(tree, node) {
                        if tree.replace_child(found.parent, found.old, found.new) {
                            replacements += 1;
                        }
                    }
                }
                _ => {}
            }

            PruneSignal::Continue
        });

        if replacements == 0 {
            Outcome::Unchanged
        } else {
            Outcome::Changed { root, replacements }
        }
    }
}

impl Default for RewriteEngine {
    fn default() -> Self {
        Self {
            config: RewriteConfig::default(),
        }
    }
}
