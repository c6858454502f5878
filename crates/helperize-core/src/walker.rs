//! Depth-first traversal over a [`SyntaxTree`]
//!
//! The callback decides per node whether to descend. Children are read
//! after the callback returns, so a callback that rewrites a child slot
//! sees the walk continue into the new child rather than the old one.

use crate::tree::{NodeId, SyntaxTree};

/// Traversal control returned by a visit callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneSignal {
    /// Descend into the node's children
    Continue,
    /// Do not descend into this node's children
    SkipSubtree,
}

/// Walk `roots` and all of their descendants in pre-order.
///
/// Siblings are visited in the order [`SyntaxTree::children`] returns them,
/// which is source order.
pub fn walk<F>(tree: &mut SyntaxTree, roots: &[NodeId], mut visit: F)
where
    F: FnMut(&mut SyntaxTree, NodeId) -> PruneSignal,
{
    let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if visit(tree, id) == PruneSignal::SkipSubtree {
            continue;
        }
        stack.extend(tree.children(id).into_iter().rev());
    }
}
