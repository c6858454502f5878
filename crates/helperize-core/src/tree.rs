//! Arena-backed syntax tree used by the rewrite kernel
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. The
//! front-end lowers host AST nodes into this shape; rewrite rules replace
//! child slots in place and build new nodes through [`TreeBuilder`].

use mago_span::Span;

/// Index of a node inside a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Lowered from the original source
    Source,
    /// Built during a rewrite. `replaces` is the span of the source node it
    /// took the place of, if it was substituted into the tree.
    Synthesized { replaces: Option<Span> },
}

/// Shape of a node and its sub-fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `[...]` or `array(...)`
    ArrayLiteral { items: Vec<NodeId> },
    /// One entry of an array literal: `key => value` or just `value`
    ArrayItem { key: Option<NodeId>, value: NodeId },
    /// `object->name`. `name` is `None` for dynamic member names.
    PropertyFetch { object: NodeId, name: Option<String> },
    /// `object->name(arguments)`
    MethodCall {
        object: NodeId,
        name: Option<String>,
        arguments: Vec<NodeId>,
    },
    /// `name(arguments)`
    FunctionCall {
        name: Option<String>,
        arguments: Vec<NodeId>,
    },
    /// A plain variable, stored without sigil
    Variable { name: String },
    /// A string with embedded expressions
    InterpolatedString { parts: Vec<NodeId> },
    /// Any literal, kept as its source text
    Literal { text: String },
    /// Anything the front-end does not model
    Opaque { children: Vec<NodeId> },
}

/// A single node in the arena
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Option<Span>,
    pub origin: Origin,
}

impl SyntaxNode {
    pub fn is_synthesized(&self) -> bool {
        matches!(self.origin, Origin::Synthesized { .. })
    }
}

/// Owner of every node lowered or built for one unit of work (usually a file)
#[derive(Debug, Default, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena, including detached ones
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node lowered from source
    pub fn push_source(&mut self, kind: NodeKind, span: Option<Span>) -> NodeId {
        self.push(SyntaxNode {
            kind,
            span,
            origin: Origin::Source,
        })
    }

    fn push(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.node(id).span
    }

    /// Ordered children of a node, in source order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::ArrayLiteral { items } => items.clone(),
            NodeKind::ArrayItem { key, value } => key.iter().copied().chain([*value]).collect(),
            NodeKind::PropertyFetch { object, .. } => vec![*object],
            NodeKind::MethodCall {
                object, arguments, ..
            } => std::iter::once(*object).chain(arguments.iter().copied()).collect(),
            NodeKind::FunctionCall { arguments, .. } => arguments.clone(),
            NodeKind::InterpolatedString { parts } => parts.clone(),
            NodeKind::Opaque { children } => children.clone(),
            NodeKind::Variable { .. } | NodeKind::Literal { .. } => Vec::new(),
        }
    }

    /// Substitute `new` for `old` in whichever field of `parent` holds it.
    ///
    /// `new` becomes synthesized and remembers the span of `old`, so the
    /// text it stands in for can be re-emitted. Returns `false` when `old`
    /// is not a direct child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let slot = match &mut self.nodes[parent.index()].kind {
            NodeKind::ArrayLiteral { items } => items.iter_mut().find(|c| **c == old),
            NodeKind::ArrayItem { key, value } => {
                if *value == old {
                    Some(value)
                } else {
                    key.as_mut().filter(|k| **k == old)
                }
            }
            NodeKind::PropertyFetch { object, .. } => Some(object).filter(|o| **o == old),
            NodeKind::MethodCall {
                object, arguments, ..
            } => {
                if *object == old {
                    Some(object)
                } else {
                    arguments.iter_mut().find(|c| **c == old)
                }
            }
            NodeKind::FunctionCall { arguments, .. } => arguments.iter_mut().find(|c| **c == old),
            NodeKind::InterpolatedString { parts } => parts.iter_mut().find(|c| **c == old),
            NodeKind::Opaque { children } => children.iter_mut().find(|c| **c == old),
            NodeKind::Variable { .. } | NodeKind::Literal { .. } => None,
        };

        let Some(slot) = slot else {
            return false;
        };
        *slot = new;

        let replaced = self.nodes[old.index()].span;
        self.nodes[new.index()].origin = Origin::Synthesized { replaces: replaced };
        true
    }
}

/// Constructors for nodes created during a rewrite
///
/// Rules never assemble `NodeKind` values themselves; they ask the builder,
/// which keeps them independent of how a host represents new nodes.
pub trait TreeBuilder {
    fn function_call(&mut self, name: &str, arguments: Vec<NodeId>) -> NodeId;
    fn method_call(&mut self, object: NodeId, name: &str, arguments: Vec<NodeId>) -> NodeId;
    fn property_fetch(&mut self, object: NodeId, name: &str) -> NodeId;
    fn variable(&mut self, name: &str) -> NodeId;
    fn literal(&mut self, text: &str) -> NodeId;
}

impl SyntaxTree {
    fn push_synthesized(&mut self, kind: NodeKind) -> NodeId {
        self.push(SyntaxNode {
            kind,
            span: None,
            origin: Origin::Synthesized { replaces: None },
        })
    }
}

impl TreeBuilder for SyntaxTree {
    fn function_call(&mut self, name: &str, arguments: Vec<NodeId>) -> NodeId {
        self.push_synthesized(NodeKind::FunctionCall {
            name: Some(name.to_string()),
            arguments,
        })
    }

    fn method_call(&mut self, object: NodeId, name: &str, arguments: Vec<NodeId>) -> NodeId {
        self.push_synthesized(NodeKind::MethodCall {
            object,
            name: Some(name.to_string()),
            arguments,
        })
    }

    fn property_fetch(&mut self, object: NodeId, name: &str) -> NodeId {
        self.push_synthesized(NodeKind::PropertyFetch {
            object,
            name: Some(name.to_string()),
        })
    }

    fn variable(&mut self, name: &str) -> NodeId {
        self.push_synthesized(NodeKind::Variable {
            name: name.trim_start_matches('$').to_string(),
        })
    }

    fn literal(&mut self, text: &str) -> NodeId {
        self.push_synthesized(NodeKind::Literal {
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mago_database::file::FileId;
    use mago_span::Position;

    fn make_span(start: u32, end: u32) -> Span {
        Span::new(FileId::zero(), Position::new(start), Position::new(end))
    }

    fn this_faker(tree: &mut SyntaxTree) -> NodeId {
        let this = tree.push_source(
            NodeKind::Variable {
                name: "this".into(),
            },
            Some(make_span(0, 5)),
        );
        tree.push_source(
            NodeKind::PropertyFetch {
                object: this,
                name: Some("faker".into()),
            },
            Some(make_span(0, 12)),
        )
    }

    #[test]
    fn test_children_in_source_order() {
        let mut tree = SyntaxTree::new();
        let object = this_faker(&mut tree);
        let arg = tree.push_source(NodeKind::Literal { text: "1".into() }, None);
        let call = tree.push_source(
            NodeKind::MethodCall {
                object,
                name: Some("numberBetween".into()),
                arguments: vec![arg],
            },
            None,
        );

        assert_eq!(tree.children(call), vec![object, arg]);
    }

    #[test]
    fn test_array_item_children_key_first() {
        let mut tree = SyntaxTree::new();
        let key = tree.push_source(NodeKind::Literal { text: "'a'".into() }, None);
        let value = tree.push_source(NodeKind::Literal { text: "1".into() }, None);
        let item = tree.push_source(
            NodeKind::ArrayItem {
                key: Some(key),
                value,
            },
            None,
        );

        assert_eq!(tree.children(item), vec![key, value]);
    }

    #[test]
    fn test_replace_child_records_replaced_span() {
        let mut tree = SyntaxTree::new();
        let object = this_faker(&mut tree);
        let fetch = tree.push_source(
            NodeKind::PropertyFetch {
                object,
                name: Some("name".into()),
            },
            Some(make_span(0, 18)),
        );

        let helper = tree.function_call("fake", Vec::new());
        assert!(tree.replace_child(fetch, object, helper));

        assert_eq!(tree.children(fetch), vec![helper]);
        assert_eq!(
            tree.node(helper).origin,
            Origin::Synthesized {
                replaces: Some(make_span(0, 12))
            }
        );
    }

    #[test]
    fn test_replace_child_rejects_non_child() {
        let mut tree = SyntaxTree::new();
        let object = this_faker(&mut tree);
        let unrelated = tree.push_source(NodeKind::Literal { text: "1".into() }, None);
        let helper = tree.function_call("fake", Vec::new());

        assert!(!tree.replace_child(object, unrelated, helper));
        assert_eq!(tree.node(helper).origin, Origin::Synthesized { replaces: None });
    }

    #[test]
    fn test_builder_nodes_are_synthesized() {
        let mut tree = SyntaxTree::new();
        let var = tree.variable("$user");
        let fetch = tree.property_fetch(var, "name");

        assert!(tree.node(fetch).is_synthesized());
        assert_eq!(
            tree.kind(var),
            &NodeKind::Variable {
                name: "user".into()
            }
        );
        assert_eq!(tree.span(fetch), None);
    }
}
