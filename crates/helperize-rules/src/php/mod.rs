//! PHP front-end: declarations, lowering into the rewrite tree, re-emission

pub mod declarations;
pub mod lower;
pub mod render;
pub mod visitor;

pub use declarations::collect_declarations;
pub use lower::{lower_array_literals, Lowerer};
pub use render::{collect_edits, render_node};
pub use visitor::Visitor;
