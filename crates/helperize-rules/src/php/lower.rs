//! Lowering of mago expressions into a [`SyntaxTree`]
//!
//! Only the shapes the rewrite engine inspects are modelled precisely.
//! Everything else becomes `Opaque`, keeping its span and, where an array
//! literal can hide inside it, its sub-expressions as children.

use helperize_core::{NodeId, NodeKind, SyntaxTree};
use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use super::visitor::Visitor;

/// Lower every array literal of `program`, outermost first.
///
/// Nested literals are lowered twice: once inside their parent and once as
/// a root of their own.
pub fn lower_array_literals(program: &Program<'_>, source: &str) -> (SyntaxTree, Vec<NodeId>) {
    let mut collector = ArrayRootCollector {
        lowerer: Lowerer::new(source),
        roots: Vec::new(),
    };
    collector.visit_program(program);
    (collector.lowerer.into_tree(), collector.roots)
}

struct ArrayRootCollector<'s> {
    lowerer: Lowerer<'s>,
    roots: Vec<NodeId>,
}

impl<'a> Visitor<'a> for ArrayRootCollector<'_> {
    fn visit_expression(&mut self, expr: &Expression<'a>) -> bool {
        if let Some(root) = self.lowerer.lower_array(expr) {
            self.roots.push(root);
        }
        true
    }
}

/// Converts mago expressions into nodes of one tree
pub struct Lowerer<'s> {
    source: &'s str,
    tree: SyntaxTree,
}

impl<'s> Lowerer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            tree: SyntaxTree::new(),
        }
    }

    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }

    fn text(&self, span: Span) -> &'s str {
        self.source
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }

    fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.tree.push_source(kind, Some(span))
    }

    /// Lower `expr` if it is an array literal (`[...]` or `array(...)`)
    pub fn lower_array(&mut self, expr: &Expression<'_>) -> Option<NodeId> {
        match expr {
            Expression::Array(array) => Some(self.lower_elements(array.elements.iter(), expr.span())),
            Expression::LegacyArray(array) => {
                Some(self.lower_elements(array.elements.iter(), expr.span()))
            }
            _ => None,
        }
    }

    fn lower_elements<'a: 'b, 'b>(
        &mut self,
        elements: impl Iterator<Item = &'b ArrayElement<'a>>,
        span: Span,
    ) -> NodeId {
        let mut items = Vec::new();

        for element in elements {
            let item = match element {
                ArrayElement::KeyValue(kv) => {
                    let key = self.lower_expression(&kv.key);
                    let value = self.lower_expression(&kv.value);
                    NodeKind::ArrayItem {
                        key: Some(key),
                        value,
                    }
                }
                ArrayElement::Value(val) => NodeKind::ArrayItem {
                    key: None,
                    value: self.lower_expression(&val.value),
                },
                ArrayElement::Variadic(var) => {
                    let inner = self.lower_expression(&var.value);
                    let spread = self.push(
                        NodeKind::Opaque {
                            children: vec![inner],
                        },
                        element.span(),
                    );
                    NodeKind::ArrayItem {
                        key: None,
                        value: spread,
                    }
                }
                // holes in list() destructuring
                _ => continue,
            };
            items.push(self.push(item, element.span()));
        }

        self.push(NodeKind::ArrayLiteral { items }, span)
    }

    fn lower_arguments<'a: 'b, 'b>(
        &mut self,
        arguments: impl Iterator<Item = &'b Argument<'a>>,
    ) -> Vec<NodeId> {
        arguments
            .map(|argument| self.lower_expression(argument.value()))
            .collect()
    }

    fn member_name(&self, selector: &ClassLikeMemberSelector<'_>) -> Option<String> {
        match selector {
            ClassLikeMemberSelector::Identifier(ident) => Some(self.text(ident.span()).to_string()),
            _ => None,
        }
    }

    fn opaque(&mut self, children: Vec<NodeId>, span: Span) -> NodeId {
        self.push(NodeKind::Opaque { children }, span)
    }

    /// Lower any expression
    pub fn lower_expression(&mut self, expr: &Expression<'_>) -> NodeId {
        let span = expr.span();

        if let Some(array) = self.lower_array(expr) {
            return array;
        }

        match expr {
            Expression::Parenthesized(paren) => self.lower_expression(&paren.expression),
            Expression::Variable(Variable::Direct(var)) => self.push(
                NodeKind::Variable {
                    name: var.name.trim_start_matches('$').to_string(),
                },
                span,
            ),
            Expression::Literal(_) => {
                let text = self.text(span).to_string();
                self.push(NodeKind::Literal { text }, span)
            }
            Expression::Access(Access::Property(access)) => {
                let object = self.lower_expression(&access.object);
                let name = self.member_name(&access.property);
                self.push(NodeKind::PropertyFetch { object, name }, span)
            }
            Expression::Access(Access::NullSafeProperty(access)) => {
                let object = self.lower_expression(&access.object);
                self.opaque(vec![object], span)
            }
            Expression::Call(Call::Method(call)) => {
                let object = self.lower_expression(&call.object);
                let name = self.member_name(&call.method);
                let arguments = self.lower_arguments(call.argument_list.arguments.iter());
                self.push(
                    NodeKind::MethodCall {
                        object,
                        name,
                        arguments,
                    },
                    span,
                )
            }
            Expression::Call(Call::NullSafeMethod(call)) => {
                let object = self.lower_expression(&call.object);
                let mut children = vec![object];
                children.extend(self.lower_arguments(call.argument_list.arguments.iter()));
                self.opaque(children, span)
            }
            Expression::Call(Call::StaticMethod(call)) => {
                let arguments = self.lower_arguments(call.argument_list.arguments.iter());
                self.opaque(arguments, span)
            }
            Expression::Call(Call::Function(call)) => {
                let arguments = self.lower_arguments(call.argument_list.arguments.iter());
                match call.function {
                    Expression::Identifier(ident) => {
                        let name = Some(self.text(ident.span()).to_string());
                        self.push(NodeKind::FunctionCall { name, arguments }, span)
                    }
                    callee => {
                        let callee = self.lower_expression(callee);
                        let mut children = vec![callee];
                        children.extend(arguments);
                        self.opaque(children, span)
                    }
                }
            }
            Expression::Binary(binary) => {
                let lhs = self.lower_expression(&binary.lhs);
                let rhs = self.lower_expression(&binary.rhs);
                self.opaque(vec![lhs, rhs], span)
            }
            Expression::UnaryPrefix(unary) => {
                let operand = self.lower_expression(&unary.operand);
                self.opaque(vec![operand], span)
            }
            Expression::Conditional(cond) => {
                let mut children = vec![self.lower_expression(&cond.condition)];
                if let Some(then) = &cond.then {
                    children.push(self.lower_expression(then));
                }
                children.push(self.lower_expression(&cond.r#else));
                self.opaque(children, span)
            }
            Expression::Assignment(assign) => {
                let lhs = self.lower_expression(&assign.lhs);
                let rhs = self.lower_expression(&assign.rhs);
                self.opaque(vec![lhs, rhs], span)
            }
            Expression::ArrayAccess(access) => {
                let array = self.lower_expression(&access.array);
                let index = self.lower_expression(&access.index);
                self.opaque(vec![array, index], span)
            }
            Expression::ArrowFunction(arrow) => {
                let body = self.lower_expression(&arrow.expression);
                self.opaque(vec![body], span)
            }
            Expression::Closure(closure) => {
                let body = self.lower_block(&closure.body);
                self.opaque(body, span)
            }
            Expression::Instantiation(inst) => {
                let arguments = match &inst.argument_list {
                    Some(argument_list) => self.lower_arguments(argument_list.arguments.iter()),
                    None => Vec::new(),
                };
                self.opaque(arguments, span)
            }
            Expression::Match(m) => {
                let mut children = vec![self.lower_expression(&m.expression)];
                for arm in m.arms.iter() {
                    match arm {
                        MatchArm::Expression(arm) => {
                            for condition in arm.conditions.iter() {
                                children.push(self.lower_expression(condition));
                            }
                            children.push(self.lower_expression(&arm.expression));
                        }
                        MatchArm::Default(arm) => {
                            children.push(self.lower_expression(&arm.expression));
                        }
                    }
                }
                self.opaque(children, span)
            }
            // nowdocs never interpolate
            Expression::CompositeString(CompositeString::Document(doc))
                if doc.kind == DocumentKind::Nowdoc =>
            {
                let text = self.text(span).to_string();
                self.push(NodeKind::Literal { text }, span)
            }
            Expression::CompositeString(_) => {
                self.push(NodeKind::InterpolatedString { parts: Vec::new() }, span)
            }
            _ => self.opaque(Vec::new(), span),
        }
    }

    /// Values a function body evaluates at its top level, in source order
    fn lower_block(&mut self, block: &Block<'_>) -> Vec<NodeId> {
        let mut values = Vec::new();
        for statement in block.statements.iter() {
            match statement {
                Statement::Return(ret) => {
                    if let Some(value) = &ret.value {
                        values.push(self.lower_expression(value));
                    }
                }
                Statement::Expression(expr_stmt) => {
                    values.push(self.lower_expression(&expr_stmt.expression));
                }
                Statement::Block(inner) => values.extend(self.lower_block(inner)),
                _ => {}
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use mago_database::file::FileId;

    fn lower(code: &str) -> (SyntaxTree, Vec<NodeId>) {
        let arena = Bump::new();
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(&arena, file_id, code);
        lower_array_literals(program, code)
    }

    fn text_of(tree: &SyntaxTree, node: NodeId, code: &str) -> String {
        let span = tree.span(node).unwrap();
        code[span.start.offset as usize..span.end.offset as usize].to_string()
    }

    #[test]
    fn test_roots_in_source_order() {
        let code = "<?php\n$a = ['x' => [1, 2], 'y' => array(3)];\n";
        let (tree, roots) = lower(code);

        let texts: Vec<_> = roots.iter().map(|r| text_of(&tree, *r, code)).collect();
        assert_eq!(texts, vec!["['x' => [1, 2], 'y' => array(3)]", "[1, 2]", "array(3)"]);
    }

    #[test]
    fn test_member_chain_shape() {
        let code = "<?php\n$a = ['name' => $this->faker->name()];\n";
        let (tree, roots) = lower(code);

        let NodeKind::ArrayLiteral { items } = tree.kind(roots[0]) else {
            panic!("expected array literal");
        };
        let NodeKind::ArrayItem { key: Some(key), value } = tree.kind(items[0]) else {
            panic!("expected keyed item");
        };
        assert_eq!(tree.kind(*key), &NodeKind::Literal { text: "'name'".into() });

        let NodeKind::MethodCall { object, name, arguments } = tree.kind(*value) else {
            panic!("expected method call");
        };
        assert_eq!(name.as_deref(), Some("name"));
        assert!(arguments.is_empty());

        let NodeKind::PropertyFetch { object: this, name } = tree.kind(*object) else {
            panic!("expected property fetch");
        };
        assert_eq!(name.as_deref(), Some("faker"));
        assert_eq!(tree.kind(*this), &NodeKind::Variable { name: "this".into() });
        assert_eq!(text_of(&tree, *object, code), "$this->faker");
    }

    #[test]
    fn test_dynamic_member_has_no_name() {
        let code = "<?php\n$a = [$this->{$member}->word];\n";
        let (tree, roots) = lower(code);

        let NodeKind::ArrayLiteral { items } = tree.kind(roots[0]) else {
            panic!("expected array literal");
        };
        let NodeKind::ArrayItem { value, .. } = tree.kind(items[0]) else {
            panic!("expected item");
        };
        let NodeKind::PropertyFetch { object, .. } = tree.kind(*value) else {
            panic!("expected property fetch");
        };
        assert!(matches!(tree.kind(*object), NodeKind::PropertyFetch { name: None, .. }));
    }

    #[test]
    fn test_interpolated_string() {
        let code = "<?php\n$a = [\"{$this->faker->name}\", 'plain'];\n";
        let (tree, roots) = lower(code);

        let NodeKind::ArrayLiteral { items } = tree.kind(roots[0]) else {
            panic!("expected array literal");
        };
        let NodeKind::ArrayItem { value, .. } = tree.kind(items[0]) else {
            panic!("expected item");
        };
        assert!(matches!(tree.kind(*value), NodeKind::InterpolatedString { .. }));
    }

    #[test]
    fn test_parentheses_lowered_through() {
        let code = "<?php\n$a = [($this->faker)->name];\n";
        let (tree, roots) = lower(code);

        let NodeKind::ArrayLiteral { items } = tree.kind(roots[0]) else {
            panic!("expected array literal");
        };
        let NodeKind::ArrayItem { value, .. } = tree.kind(items[0]) else {
            panic!("expected item");
        };
        let NodeKind::PropertyFetch { object, .. } = tree.kind(*value) else {
            panic!("expected property fetch");
        };
        assert_eq!(text_of(&tree, *object, code), "$this->faker");
    }

    #[test]
    fn test_nowdoc_is_literal() {
        let code = "<?php\n$a = [\n<<<'EOT'\n{$this->faker->name}\nEOT\n, \"{$x}\"];\n";
        let (tree, roots) = lower(code);

        let NodeKind::ArrayLiteral { items } = tree.kind(roots[0]) else {
            panic!("expected array literal");
        };
        let values: Vec<_> = items
            .iter()
            .map(|item| match tree.kind(*item) {
                NodeKind::ArrayItem { value, .. } => tree.kind(*value).clone(),
                other => panic!("expected item, got {:?}", other),
            })
            .collect();
        assert!(matches!(values[0], NodeKind::Literal { .. }));
        assert!(matches!(values[1], NodeKind::InterpolatedString { .. }));
    }

    #[test]
    fn test_closure_body_values_are_children() {
        let code = "<?php\n$a = ['t' => function () { $x = 1; return $this->faker->sentence; }];\n";
        let (tree, roots) = lower(code);

        let NodeKind::ArrayLiteral { items } = tree.kind(roots[0]) else {
            panic!("expected array literal");
        };
        let NodeKind::ArrayItem { value, .. } = tree.kind(items[0]) else {
            panic!("expected item");
        };
        let NodeKind::Opaque { children } = tree.kind(*value) else {
            panic!("expected opaque closure");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(tree.kind(children[1]), NodeKind::PropertyFetch { .. }));
        assert_eq!(text_of(&tree, children[1], code), "$this->faker->sentence");
    }

    #[test]
    fn test_new_and_match_operands_are_children() {
        let code = "<?php\n$a = ['m' => new Bag(['w' => 1]), 's' => match ($x) { 1 => 'a', default => $y }];\n";
        let (tree, roots) = lower(code);

        let texts: Vec<_> = roots.iter().map(|r| text_of(&tree, *r, code)).collect();
        assert_eq!(texts[1], "['w' => 1]");

        let NodeKind::ArrayLiteral { items } = tree.kind(roots[0]) else {
            panic!("expected array literal");
        };
        let child_count = |item: NodeId| match tree.kind(item) {
            NodeKind::ArrayItem { value, .. } => tree.children(*value).len(),
            _ => 0,
        };
        assert_eq!(child_count(items[0]), 1);
        // subject, one condition and two results
        assert_eq!(child_count(items[1]), 4);
    }

    #[test]
    fn test_arrays_inside_closures_are_roots() {
        let code = "<?php\n$f = function () { return ['a' => 1]; };\n";
        let (tree, roots) = lower(code);

        assert_eq!(roots.len(), 1);
        assert_eq!(text_of(&tree, roots[0], code), "['a' => 1]");
    }
}
