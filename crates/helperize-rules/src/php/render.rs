//! Re-emission of rewritten trees as PHP source edits

use helperize_core::{Edit, NodeId, NodeKind, Origin, SyntaxTree};

/// One edit per synthesized node under `root` that took a source node's place
pub fn collect_edits(tree: &SyntaxTree, root: NodeId, source: &str, message: &str) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Origin::Synthesized {
            replaces: Some(span),
        } = tree.node(node).origin
        {
            edits.push(Edit::new(span, render_node(tree, node, source), message));
            continue;
        }
        stack.extend(tree.children(node).into_iter().rev());
    }

    edits
}

/// Print a node as PHP.
///
/// Source nodes are copied from `source`, with any synthesized descendants
/// spliced in; synthesized nodes are printed from their kind.
pub fn render_node(tree: &SyntaxTree, node: NodeId, source: &str) -> String {
    let entry = tree.node(node);
    if !entry.is_synthesized() {
        if let Some(span) = entry.span {
            return render_source(tree, node, span, source);
        }
    }

    match &entry.kind {
        NodeKind::FunctionCall { name, arguments } => format!(
            "{}({})",
            name.as_deref().unwrap_or_default(),
            render_list(tree, arguments, source)
        ),
        NodeKind::MethodCall {
            object,
            name,
            arguments,
        } => format!(
            "{}->{}({})",
            render_node(tree, *object, source),
            name.as_deref().unwrap_or_default(),
            render_list(tree, arguments, source)
        ),
        NodeKind::PropertyFetch { object, name } => format!(
            "{}->{}",
            render_node(tree, *object, source),
            name.as_deref().unwrap_or_default()
        ),
        NodeKind::Variable { name } => format!("${}", name),
        NodeKind::Literal { text } => text.clone(),
        NodeKind::ArrayLiteral { items } => format!("[{}]", render_list(tree, items, source)),
        NodeKind::ArrayItem { key, value } => match key {
            Some(key) => format!(
                "{} => {}",
                render_node(tree, *key, source),
                render_node(tree, *value, source)
            ),
            None => render_node(tree, *value, source),
        },
        NodeKind::InterpolatedString { parts } | NodeKind::Opaque { children: parts } => parts
            .iter()
            .map(|part| render_node(tree, *part, source))
            .collect(),
    }
}

fn render_list(tree: &SyntaxTree, nodes: &[NodeId], source: &str) -> String {
    nodes
        .iter()
        .map(|node| render_node(tree, *node, source))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Source text of `node` with nested replacements applied
fn render_source(tree: &SyntaxTree, node: NodeId, span: mago_span::Span, source: &str) -> String {
    let start = span.start.offset as usize;
    let end = span.end.offset as usize;
    let Some(original) = source.get(start..end) else {
        return String::new();
    };

    let mut nested = Vec::new();
    for child in tree.children(node) {
        nested.extend(collect_edits(tree, child, source, ""));
    }
    if nested.is_empty() {
        return original.to_string();
    }

    nested.sort_by_key(|edit| std::cmp::Reverse(edit.start_offset()));
    let mut text = original.to_string();
    for edit in nested {
        let (from, to) = (edit.start_offset(), edit.end_offset());
        if from < start || to > end || from > to {
            continue;
        }
        text.replace_range(from - start..to - start, &edit.replacement);
    }
    text
}
