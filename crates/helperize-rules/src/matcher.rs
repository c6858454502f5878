//! Shape matchers for the member-chain rewrite
//!
//! Each matcher inspects one node and its immediate neighbourhood. On a
//! match it builds the replacement through [`TreeBuilder`] and reports which
//! child of which node it stands in for; the engine performs the swap.

use helperize_core::{NodeId, NodeKind, SyntaxTree, TreeBuilder};

use crate::config::RewriteConfig;

/// A matched substitution: `old`, a child of `parent`, becomes `new`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub parent: NodeId,
    pub old: NodeId,
    pub new: NodeId,
}

/// A predicate plus rewrite over a single node
pub trait NodeMatcher {
    fn try_match(&self, tree: &mut SyntaxTree, node: NodeId) -> Option<Replacement>;
}

/// Matches `<self>-><member>-><anything>` where the outer node is a plain
/// property fetch, replacing the inner `<self>-><member>` with `<helper>()`.
pub struct MemberChainMatcher<'c> {
    config: &'c RewriteConfig,
}

impl<'c> MemberChainMatcher<'c> {
    pub fn new(config: &'c RewriteConfig) -> Self {
        Self { config }
    }

    /// Replace the container of `node` if it is `<self>-><member>`.
    ///
    /// Shared by both matchers: `node` may be a property fetch or a method
    /// call, whichever holds the container in its `object` field.
    fn replace_container(&self, tree: &mut SyntaxTree, node: NodeId) -> Option<Replacement> {
        let container = match tree.kind(node) {
            NodeKind::PropertyFetch { object, .. } | NodeKind::MethodCall { object, .. } => *object,
            _ => return None,
        };

        if !self.is_self_member(tree, container) {
            return None;
        }

        let helper = tree.function_call(&self.config.helper_function, Vec::new());
        Some(Replacement {
            parent: node,
            old: container,
            new: helper,
        })
    }

    /// True for `<self>-><member>` with an identifier member name
    fn is_self_member(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        let NodeKind::PropertyFetch {
            object,
            name: Some(name),
        } = tree.kind(node)
        else {
            return false;
        };

        if !name.eq_ignore_ascii_case(&self.config.member_name) {
            return false;
        }

        matches!(
            tree.kind(*object),
            NodeKind::Variable { name } if *name == self.config.self_reference
        )
    }
}

impl NodeMatcher for MemberChainMatcher<'_> {
    fn try_match(&self, tree: &mut SyntaxTree, node: NodeId) -> Option<Replacement> {
        if !matches!(tree.kind(node), NodeKind::PropertyFetch { .. }) {
            return None;
        }
        self.replace_container(tree, node)
    }
}

/// Matches `<self>-><member>-><call>(...)`, unless `<call>` is excluded.
pub struct CallOnMemberMatcher<'c> {
    config: &'c RewriteConfig,
    chain: MemberChainMatcher<'c>,
}

impl<'c> CallOnMemberMatcher<'c> {
    pub fn new(config: &'c RewriteConfig) -> Self {
        Self {
            config,
            chain: MemberChainMatcher::new(config),
        }
    }
}

impl NodeMatcher for CallOnMemberMatcher<'_> {
    fn try_match(&self, tree: &mut SyntaxTree, node: NodeId) -> Option<Replacement> {
        let NodeKind::MethodCall { object, name, .. } = tree.kind(node) else {
            return None;
        };

        if !matches!(tree.kind(*object), NodeKind::PropertyFetch { .. }) {
            return None;
        }

        if name
            .as_deref()
            .is_some_and(|call| self.config.is_excluded_call(call))
        {
            return None;
        }

        self.chain.replace_container(tree, node)
    }
}
