//! Declaration lookup for rewrite eligibility
//!
//! A rule asks "which class encloses this node, and what does it extend?".
//! The answer comes from a read-only index built by the host before any
//! rewriting starts: a project-wide [`ClassHierarchy`] plus the declarations
//! of the file being rewritten ([`FileScope`]).

use mago_span::Span;
use std::collections::{HashMap, HashSet};

use crate::tree::{NodeId, SyntaxTree};

/// A class-like declaration found in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationInfo {
    /// Fully qualified name, without leading backslash
    pub name: String,
    /// Fully qualified name of the direct parent
    pub parent: Option<String>,
    /// Span of the whole declaration
    pub span: Span,
}

/// Resolved context of the declaration enclosing a node
///
/// Only valid for the evaluation it was resolved for; the index behind it
/// may change between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolContext {
    pub declaration: String,
    /// Ancestors, nearest first
    pub ancestors: Vec<String>,
}

impl SymbolContext {
    /// True if `ancestor` appears anywhere in the ancestor chain
    pub fn is_subclass_of(&self, ancestor: &str) -> bool {
        let wanted = normalize_name(ancestor);
        self.ancestors.iter().any(|a| normalize_name(a) == wanted)
    }
}

/// Source of declaration information
pub trait SymbolIndex {
    /// Innermost declaration whose span contains `span`
    fn enclosing_declaration(&self, span: Span) -> Option<&DeclarationInfo>;

    /// Ancestor names of `declaration`, nearest first
    fn ancestor_chain(&self, declaration: &DeclarationInfo) -> Vec<String>;
}

/// Resolves the [`SymbolContext`] of a tree node
pub trait SymbolContextResolver {
    /// `None` when the node has no span or is not inside a known declaration
    fn resolve(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolContext>;
}

impl<T: SymbolIndex + ?Sized> SymbolContextResolver for T {
    fn resolve(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolContext> {
        let span = tree.span(node)?;
        let declaration = self.enclosing_declaration(span)?;

        Some(SymbolContext {
            declaration: declaration.name.clone(),
            ancestors: self.ancestor_chain(declaration),
        })
    }
}

/// Normalize a class name for comparison (case-insensitive, no leading `\`)
pub fn normalize_name(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

/// Project-wide class -> parent map
#[derive(Debug, Default, Clone)]
pub struct ClassHierarchy {
    /// normalized name -> parent as written in the declaration
    parents: HashMap<String, Option<String>>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. A later registration of the same name wins.
    pub fn register(&mut self, declaration: &DeclarationInfo) {
        self.parents
            .insert(normalize_name(&declaration.name), declaration.parent.clone());
    }

    pub fn extend<'d>(&mut self, declarations: impl IntoIterator<Item = &'d DeclarationInfo>) {
        for declaration in declarations {
            self.register(declaration);
        }
    }

    /// Merge another hierarchy into this one
    pub fn merge(&mut self, other: ClassHierarchy) {
        self.parents.extend(other.parents);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Direct parent of a registered class: `None` if the class is unknown,
    /// `Some(None)` if it is known to have no parent.
    pub fn parent_of(&self, name: &str) -> Option<Option<&str>> {
        self.parents
            .get(&normalize_name(name))
            .map(|parent| parent.as_deref())
    }
}

/// Follow parent links starting at `parent`.
///
/// A parent that `lookup` does not know (a vendor class, say) ends the chain
/// but is still part of it. Cycles end the chain too.
fn walk_ancestors<F>(name: &str, parent: Option<&str>, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<Option<String>>,
{
    let mut chain = Vec::new();
    let mut seen = HashSet::from([normalize_name(name)]);
    let mut next = parent.map(str::to_string);

    while let Some(current) = next.take() {
        if !seen.insert(normalize_name(&current)) {
            break;
        }
        next = lookup(&current).flatten();
        chain.push(current.trim_start_matches('\\').to_string());
    }

    chain
}

/// Declarations of a single file, backed by the project hierarchy
#[derive(Debug, Clone)]
pub struct FileScope<'h> {
    hierarchy: &'h ClassHierarchy,
    declarations: Vec<DeclarationInfo>,
}

impl<'h> FileScope<'h> {
    pub fn new(hierarchy: &'h ClassHierarchy, declarations: Vec<DeclarationInfo>) -> Self {
        Self {
            hierarchy,
            declarations,
        }
    }

    pub fn declarations(&self) -> &[DeclarationInfo] {
        &self.declarations
    }
}

impl SymbolIndex for FileScope<'_> {
    fn enclosing_declaration(&self, span: Span) -> Option<&DeclarationInfo> {
        self.declarations
            .iter()
            .filter(|d| {
                d.span.start.offset <= span.start.offset && span.end.offset <= d.span.end.offset
            })
            .min_by_key(|d| d.span.end.offset - d.span.start.offset)
    }

    fn ancestor_chain(&self, declaration: &DeclarationInfo) -> Vec<String> {
        walk_ancestors(&declaration.name, declaration.parent.as_deref(), |class| {
            let key = normalize_name(class);
            self.declarations
                .iter()
                .find(|d| normalize_name(&d.name) == key)
                .map(|d| d.parent.clone())
                .or_else(|| self.hierarchy.parent_of(class).map(|p| p.map(str::to_string)))
        })
    }
}
