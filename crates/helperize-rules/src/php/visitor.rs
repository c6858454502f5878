//! Traversal of mago PHP syntax trees
//!
//! Implementors override `visit_statement` / `visit_expression`; the default
//! `traverse_*` methods walk into every place an array literal can appear in
//! a factory: method bodies, closures, arrow functions, call and `new`
//! arguments, `match` arms and nested expressions.

use mago_syntax::ast::*;

pub trait Visitor<'a> {
    /// Called for each statement. Return `true` to continue into children.
    fn visit_statement(&mut self, _stmt: &Statement<'a>) -> bool {
        true
    }

    /// Called for each expression. Return `true` to continue into children.
    fn visit_expression(&mut self, _expr: &Expression<'a>) -> bool {
        true
    }

    fn visit_program(&mut self, program: &Program<'a>) {
        for stmt in program.statements.iter() {
            self.traverse_statement(stmt);
        }
    }

    fn traverse_statement(&mut self, stmt: &Statement<'a>) {
        if !self.visit_statement(stmt) {
            return;
        }

        match stmt {
            Statement::Expression(expr_stmt) => {
                self.traverse_expression(&expr_stmt.expression);
            }
            Statement::Block(block) => self.traverse_block(block),
            Statement::If(if_stmt) => {
                self.traverse_expression(&if_stmt.condition);
                self.traverse_if_body(&if_stmt.body);
            }
            Statement::Foreach(foreach) => {
                self.traverse_expression(&foreach.expression);
                match &foreach.body {
                    ForeachBody::Statement(inner) => self.traverse_statement(inner),
                    ForeachBody::ColonDelimited(block) => {
                        for inner in block.statements.iter() {
                            self.traverse_statement(inner);
                        }
                    }
                }
            }
            Statement::For(for_stmt) => {
                for expr in for_stmt.initializations.iter() {
                    self.traverse_expression(expr);
                }
                for expr in for_stmt.conditions.iter() {
                    self.traverse_expression(expr);
                }
                for expr in for_stmt.increments.iter() {
                    self.traverse_expression(expr);
                }
                match &for_stmt.body {
                    ForBody::Statement(inner) => self.traverse_statement(inner),
                    ForBody::ColonDelimited(block) => {
                        for inner in block.statements.iter() {
                            self.traverse_statement(inner);
                        }
                    }
                }
            }
            Statement::While(while_stmt) => {
                self.traverse_expression(&while_stmt.condition);
                match &while_stmt.body {
                    WhileBody::Statement(inner) => self.traverse_statement(inner),
                    WhileBody::ColonDelimited(block) => {
                        for inner in block.statements.iter() {
                            self.traverse_statement(inner);
                        }
                    }
                }
            }
            Statement::DoWhile(do_while) => {
                self.traverse_statement(&do_while.statement);
                self.traverse_expression(&do_while.condition);
            }
            Statement::Class(class) => {
                for member in class.members.iter() {
                    self.traverse_class_like_member(member);
                }
            }
            Statement::Trait(tr) => {
                for member in tr.members.iter() {
                    self.traverse_class_like_member(member);
                }
            }
            Statement::Function(func) => self.traverse_block(&func.body),
            Statement::Namespace(ns) => match &ns.body {
                NamespaceBody::Implicit(body) => {
                    for inner in body.statements.iter() {
                        self.traverse_statement(inner);
                    }
                }
                NamespaceBody::BraceDelimited(body) => {
                    for inner in body.statements.iter() {
                        self.traverse_statement(inner);
                    }
                }
            },
            Statement::Try(try_stmt) => {
                self.traverse_block(&try_stmt.block);
                for catch in try_stmt.catch_clauses.iter() {
                    self.traverse_block(&catch.block);
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    self.traverse_block(&finally.block);
                }
            }
            Statement::Switch(switch) => {
                self.traverse_expression(&switch.expression);
                match &switch.body {
                    SwitchBody::BraceDelimited(block) => {
                        for case in block.cases.iter() {
                            for inner in case.statements().iter() {
                                self.traverse_statement(inner);
                            }
                        }
                    }
                    SwitchBody::ColonDelimited(block) => {
                        for case in block.cases.iter() {
                            for inner in case.statements().iter() {
                                self.traverse_statement(inner);
                            }
                        }
                    }
                }
            }
            Statement::Return(ret) => {
                if let Some(expr) = &ret.value {
                    self.traverse_expression(expr);
                }
            }
            Statement::Echo(echo) => {
                for expr in echo.values.iter() {
                    self.traverse_expression(expr);
                }
            }
            _ => {}
        }
    }

    fn traverse_block(&mut self, block: &Block<'a>) {
        for inner in block.statements.iter() {
            self.traverse_statement(inner);
        }
    }

    fn traverse_if_body(&mut self, body: &IfBody<'a>) {
        match body {
            IfBody::Statement(stmt_body) => {
                self.traverse_statement(stmt_body.statement);
                for else_if in stmt_body.else_if_clauses.iter() {
                    self.traverse_expression(&else_if.condition);
                    self.traverse_statement(else_if.statement);
                }
                if let Some(else_clause) = &stmt_body.else_clause {
                    self.traverse_statement(else_clause.statement);
                }
            }
            IfBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.traverse_statement(inner);
                }
                for else_if in block.else_if_clauses.iter() {
                    self.traverse_expression(&else_if.condition);
                    for inner in else_if.statements.iter() {
                        self.traverse_statement(inner);
                    }
                }
                if let Some(else_clause) = &block.else_clause {
                    for inner in else_clause.statements.iter() {
                        self.traverse_statement(inner);
                    }
                }
            }
        }
    }

    fn traverse_class_like_member(&mut self, member: &ClassLikeMember<'a>) {
        if let ClassLikeMember::Method(method) = member {
            if let MethodBody::Concrete(body) = &method.body {
                self.traverse_block(body);
            }
        }
    }

    fn traverse_argument(&mut self, argument: &Argument<'a>) {
        self.traverse_expression(argument.value());
    }

    fn traverse_array_element(&mut self, element: &ArrayElement<'a>) {
        match element {
            ArrayElement::KeyValue(kv) => {
                self.traverse_expression(&kv.key);
                self.traverse_expression(&kv.value);
            }
            ArrayElement::Value(val) => self.traverse_expression(&val.value),
            ArrayElement::Variadic(var) => self.traverse_expression(&var.value),
            _ => {}
        }
    }

    fn traverse_expression(&mut self, expr: &Expression<'a>) {
        if !self.visit_expression(expr) {
            return;
        }

        match expr {
            Expression::Array(array) => {
                for element in array.elements.iter() {
                    self.traverse_array_element(element);
                }
            }
            Expression::LegacyArray(array) => {
                for element in array.elements.iter() {
                    self.traverse_array_element(element);
                }
            }
            Expression::Call(call) => match call {
                Call::Function(func_call) => {
                    self.traverse_expression(&func_call.function);
                    for arg in func_call.argument_list.arguments.iter() {
                        self.traverse_argument(arg);
                    }
                }
                Call::Method(method_call) => {
                    self.traverse_expression(&method_call.object);
                    for arg in method_call.argument_list.arguments.iter() {
                        self.traverse_argument(arg);
                    }
                }
                Call::NullSafeMethod(ns_call) => {
                    self.traverse_expression(&ns_call.object);
                    for arg in ns_call.argument_list.arguments.iter() {
                        self.traverse_argument(arg);
                    }
                }
                Call::StaticMethod(static_call) => {
                    for arg in static_call.argument_list.arguments.iter() {
                        self.traverse_argument(arg);
                    }
                }
            },
            Expression::Access(Access::Property(access)) => {
                self.traverse_expression(&access.object);
            }
            Expression::Access(Access::NullSafeProperty(access)) => {
                self.traverse_expression(&access.object);
            }
            Expression::Closure(closure) => self.traverse_block(&closure.body),
            Expression::ArrowFunction(arrow) => self.traverse_expression(&arrow.expression),
            Expression::UnaryPrefix(unary) => self.traverse_expression(&unary.operand),
            Expression::Parenthesized(paren) => self.traverse_expression(&paren.expression),
            Expression::Binary(binary) => {
                self.traverse_expression(&binary.lhs);
                self.traverse_expression(&binary.rhs);
            }
            Expression::Conditional(ternary) => {
                self.traverse_expression(&ternary.condition);
                if let Some(then) = &ternary.then {
                    self.traverse_expression(then);
                }
                self.traverse_expression(&ternary.r#else);
            }
            Expression::Assignment(assign) => {
                self.traverse_expression(&assign.lhs);
                self.traverse_expression(&assign.rhs);
            }
            Expression::ArrayAccess(access) => {
                self.traverse_expression(&access.array);
                self.traverse_expression(&access.index);
            }
            Expression::Instantiation(inst) => {
                if let Some(argument_list) = &inst.argument_list {
                    for arg in argument_list.arguments.iter() {
                        self.traverse_argument(arg);
                    }
                }
            }
            Expression::Match(m) => {
                self.traverse_expression(&m.expression);
                for arm in m.arms.iter() {
                    match arm {
                        MatchArm::Expression(arm) => {
                            for condition in arm.conditions.iter() {
                                self.traverse_expression(condition);
                            }
                            self.traverse_expression(&arm.expression);
                        }
                        MatchArm::Default(arm) => self.traverse_expression(&arm.expression),
                    }
                }
            }
            _ => {}
        }
    }
}
