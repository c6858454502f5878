//! helperize-core: kernel abstractions for context-aware tree rewriting
//!
//! This crate provides:
//! - `SyntaxTree`: an arena of nodes that rules mutate in place
//! - `TreeBuilder`: constructors for nodes created during a rewrite
//! - `walk()`: pre-order traversal with `PruneSignal` control
//! - `SymbolContextResolver`: enclosing-declaration lookup backed by a
//!   `ClassHierarchy` and per-file `FileScope`
//! - `Edit` / `apply_edits()`: span-based re-emission of rewritten nodes

mod edit;
pub mod symbols;
pub mod tree;
pub mod walker;

pub use edit::{apply_edits, dedup_edits, Edit, EditError};
pub use symbols::{
    ClassHierarchy, DeclarationInfo, FileScope, SymbolContext, SymbolContextResolver, SymbolIndex,
};
pub use tree::{NodeId, NodeKind, Origin, SyntaxNode, SyntaxTree, TreeBuilder};
pub use walker::{walk, PruneSignal};
