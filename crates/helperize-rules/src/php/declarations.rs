//! Class declarations of a PHP file
//!
//! Names are resolved against the file's namespace and `use` imports so the
//! parent of `class UserFactory extends Factory` becomes the fully
//! qualified `Illuminate\Database\Eloquent\Factories\Factory`.

use helperize_core::DeclarationInfo;
use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;
use std::collections::HashMap;

use super::visitor::Visitor;

/// Collect every class declaration in `program`, in source order
pub fn collect_declarations(program: &Program<'_>, source: &str) -> Vec<DeclarationInfo> {
    let mut collector = DeclarationCollector::new(source);
    collector.visit_program(program);
    collector.declarations
}

struct DeclarationCollector<'s> {
    source: &'s str,
    namespace: Option<String>,
    /// alias (lowercase) -> fully qualified name
    imports: HashMap<String, String>,
    declarations: Vec<DeclarationInfo>,
}

impl<'s> DeclarationCollector<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            namespace: None,
            imports: HashMap::new(),
            declarations: Vec::new(),
        }
    }

    fn text(&self, span: Span) -> &'s str {
        self.source
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }

    /// Resolve a class name as written to its fully qualified form
    fn qualify(&self, name: &str) -> String {
        let name = name.trim();
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }
        if let Some(relative) = name.strip_prefix("namespace\\") {
            return self.in_namespace(relative);
        }

        let (first, rest) = match name.find('\\') {
            Some(pos) => (&name[..pos], &name[pos..]),
            None => (name, ""),
        };

        match self.imports.get(&first.to_ascii_lowercase()) {
            Some(imported) => format!("{}{}", imported, rest),
            None => self.in_namespace(name),
        }
    }

    fn in_namespace(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }

    fn enter_namespace(&mut self, text: &str) {
        let after_keyword = text.trim_start().trim_start_matches("namespace");
        let end = after_keyword
            .find(|c: char| c == '{' || c == ';')
            .unwrap_or(after_keyword.len());
        let name = after_keyword[..end].trim();

        self.namespace = (!name.is_empty()).then(|| name.to_string());
        self.imports.clear();
    }

    /// Record class imports from a `use` statement.
    ///
    /// `use function` and `use const` never name classes and are skipped.
    fn record_imports(&mut self, text: &str) {
        let body = text
            .trim()
            .trim_start_matches("use")
            .trim()
            .trim_end_matches(';')
            .trim();

        let lowered = body.to_ascii_lowercase();
        if lowered.starts_with("function ") || lowered.starts_with("const ") {
            return;
        }

        if let (Some(open), Some(close)) = (body.find('{'), body.rfind('}')) {
            let prefix = body[..open].trim().trim_end_matches('\\');
            for item in body[open + 1..close].split(',') {
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                let full = if prefix.is_empty() {
                    item.to_string()
                } else {
                    format!("{}\\{}", prefix, item)
                };
                self.record_import(&full);
            }
            return;
        }

        for item in body.split(',') {
            self.record_import(item.trim());
        }
    }

    /// `Foo\Bar` or `Foo\Bar as Baz`
    fn record_import(&mut self, item: &str) {
        let lowered = item.to_ascii_lowercase();
        let (name, alias) = match lowered.find(" as ") {
            Some(pos) => (item[..pos].trim(), item[pos + 4..].trim()),
            None => {
                let name = item.trim();
                (name, name.rsplit('\\').next().unwrap_or(name))
            }
        };

        if name.is_empty() || alias.is_empty() {
            return;
        }

        self.imports.insert(
            alias.to_ascii_lowercase(),
            name.trim_start_matches('\\').to_string(),
        );
    }
}

impl<'a> Visitor<'a> for DeclarationCollector<'_> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) -> bool {
        match stmt {
            Statement::Namespace(ns) => {
                let text = self.text(ns.span());
                self.enter_namespace(text);
                true
            }
            Statement::Use(use_stmt) => {
                let text = self.text(use_stmt.span());
                self.record_imports(text);
                false
            }
            Statement::Class(class) => {
                let name = self.text(class.name.span);
                let parent = class
                    .extends
                    .as_ref()
                    .and_then(|extends| extends.types.first())
                    .map(|parent| self.qualify(self.text(parent.span())));

                self.declarations.push(DeclarationInfo {
                    name: self.qualify(name),
                    parent,
                    span: class.span(),
                });
                true
            }
            _ => true,
        }
    }

    fn visit_expression(&mut self, _expr: &Expression<'a>) -> bool {
        false
    }
}
