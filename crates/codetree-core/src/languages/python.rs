//! Python language analyzer, backed by the tree-sitter grammar.
//!
//! This is the one structural variant: symbols, docstrings and imports come
//! out of a real parse tree. A tree containing syntax errors degrades to an
//! empty symbol tree plus a diagnostic.

use tree_sitter::{Node, Parser};

use super::{
    dedup_qualified_names, module_symbol, FileAnalysis, LanguageAnalyzer,
};
use crate::config::{Language, RawReference, ReferenceKind, Symbol, SymbolKind};

pub struct PythonAnalyzer;

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self
    }
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn get_name(node: &Node, source: &[u8]) -> Option<String> {
        node.child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok())
            .map(|s| s.to_string())
    }

    /// Docstring of a module or of a definition body: the first statement,
    /// when it is a bare string expression.
    fn docstring(body: &Node, source: &[u8]) -> Option<String> {
        let first = body.named_child(0)?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let inner = first.named_child(0)?;
        if inner.kind() != "string" {
            return None;
        }
        let raw = inner.utf8_text(source).ok()?;
        let doc = strip_string_quotes(raw).trim().to_string();
        if doc.is_empty() {
            None
        } else {
            Some(doc)
        }
    }

    fn walk_definitions(
        node: &Node,
        source: &[u8],
        parent_qualified: &str,
        in_class: bool,
        out: &mut Vec<Symbol>,
        refs: &mut Vec<RawReference>,
        file_path: &str,
    ) {
        for i in 0..node.named_child_count() {
            let child = match node.named_child(i) {
                Some(c) => c,
                None => continue,
            };

            match child.kind() {
                "class_definition" => {
                    Self::collect_class(&child, source, parent_qualified, out, refs, file_path);
                }
                "function_definition" => {
                    Self::collect_function(&child, source, parent_qualified, in_class, out);
                }
                "decorated_definition" => {
                    if let Some(def) = child.child_by_field_name("definition") {
                        match def.kind() {
                            "class_definition" => Self::collect_class(
                                &def,
                                source,
                                parent_qualified,
                                out,
                                refs,
                                file_path,
                            ),
                            "function_definition" => Self::collect_function(
                                &def,
                                source,
                                parent_qualified,
                                in_class,
                                out,
                            ),
                            _ => {}
                        }
                    }
                }
                // Plain statements may still contain definitions (if/try
                // blocks); descend without changing the qualification.
                "if_statement" | "try_statement" | "with_statement" | "block"
                | "else_clause" | "except_clause" | "finally_clause" => {
                    Self::walk_definitions(
                        &child,
                        source,
                        parent_qualified,
                        in_class,
                        out,
                        refs,
                        file_path,
                    );
                }
                _ => {}
            }
        }
    }

    fn collect_class(
        node: &Node,
        source: &[u8],
        parent_qualified: &str,
        out: &mut Vec<Symbol>,
        refs: &mut Vec<RawReference>,
        file_path: &str,
    ) {
        let name = match Self::get_name(node, source) {
            Some(n) => n,
            None => return,
        };
        let qualified = format!("{parent_qualified}.{name}");
        let mut sym = Symbol::new(
            SymbolKind::Class,
            &name,
            &qualified,
            node.start_position().row + 1,
        );
        sym.line_end = node.end_position().row + 1;

        // Base classes become extends references.
        if let Some(supers) = node.child_by_field_name("superclasses") {
            for j in 0..supers.named_child_count() {
                if let Some(base) = supers.named_child(j) {
                    if matches!(base.kind(), "identifier" | "attribute") {
                        if let Ok(text) = base.utf8_text(source) {
                            refs.push(RawReference::new(
                                file_path,
                                text,
                                ReferenceKind::Extends,
                                base.start_position().row + 1,
                            ));
                        }
                    }
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            sym.doc = Self::docstring(&body, source);
            Self::walk_definitions(
                &body,
                source,
                &qualified,
                true,
                &mut sym.children,
                refs,
                file_path,
            );
        }
        out.push(sym);
    }

    fn collect_function(
        node: &Node,
        source: &[u8],
        parent_qualified: &str,
        in_class: bool,
        out: &mut Vec<Symbol>,
    ) {
        let name = match Self::get_name(node, source) {
            Some(n) => n,
            None => return,
        };
        let kind = if in_class {
            SymbolKind::Method
        } else {
            SymbolKind::Function
        };
        let qualified = format!("{parent_qualified}.{name}");
        let mut sym = Symbol::new(kind, &name, &qualified, node.start_position().row + 1);
        sym.line_end = node.end_position().row + 1;
        if let Some(body) = node.child_by_field_name("body") {
            sym.doc = Self::docstring(&body, source);
        }
        out.push(sym);
    }

    /// Collect import statements anywhere in the tree.
    fn collect_imports(node: &Node, source: &[u8], file_path: &str, refs: &mut Vec<RawReference>) {
        match node.kind() {
            "import_statement" => {
                // import foo, import foo.bar as baz
                for i in 0..node.named_child_count() {
                    if let Some(child) = node.named_child(i) {
                        let target = match child.kind() {
                            "dotted_name" => child.utf8_text(source).ok(),
                            "aliased_import" => child
                                .child_by_field_name("name")
                                .and_then(|n| n.utf8_text(source).ok()),
                            _ => None,
                        };
                        if let Some(target) = target {
                            refs.push(RawReference::new(
                                file_path,
                                target,
                                ReferenceKind::Import,
                                node.start_position().row + 1,
                            ));
                        }
                    }
                }
                return;
            }
            "import_from_statement" => {
                // from foo.bar import baz / from ..pkg import baz
                // One reference per statement, carrying the module path with
                // any leading dots intact.
                if let Some(module) = node.child_by_field_name("module_name") {
                    if let Ok(target) = module.utf8_text(source) {
                        refs.push(RawReference::new(
                            file_path,
                            target,
                            ReferenceKind::Import,
                            node.start_position().row + 1,
                        ));
                    }
                }
                return;
            }
            _ => {}
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                Self::collect_imports(&child, source, file_path, refs);
            }
        }
    }

    fn first_error_line(node: &Node) -> Option<usize> {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.has_error() {
                    if let Some(line) = Self::first_error_line(&child) {
                        return Some(line);
                    }
                }
            }
        }
        None
    }
}

/// Strip a string literal's prefix characters and quotes, leaving content.
fn strip_string_quotes(raw: &str) -> &str {
    let body = raw.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body.strip_prefix(quote) {
            return inner.strip_suffix(quote).unwrap_or(inner);
        }
    }
    body
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn extensions(&self) -> &[&str] {
        &["py", "pyi"]
    }

    fn language_for_ext(&self, _ext: &str) -> Language {
        Language::Python
    }

    fn analyze(&self, source: &str, path: &str) -> FileAnalysis {
        let mut parser = Parser::new();
        if parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .is_err()
        {
            return FileAnalysis::degraded(path, "python grammar unavailable".to_string());
        }
        let tree = match parser.parse(source, None) {
            Some(t) => t,
            None => return FileAnalysis::degraded(path, "parse produced no tree".to_string()),
        };

        let root = tree.root_node();
        if root.has_error() {
            let line = Self::first_error_line(&root).unwrap_or(1);
            return FileAnalysis::degraded(path, format!("syntax error near line {line}"));
        }

        let bytes = source.as_bytes();
        let mut module = module_symbol(path, Some(source.lines().count()));
        module.doc = Self::docstring(&root, bytes);

        let mut refs = Vec::new();
        let qualified = module.qualified_name.clone();
        Self::walk_definitions(
            &root,
            bytes,
            &qualified,
            false,
            &mut module.children,
            &mut refs,
            path,
        );
        Self::collect_imports(&root, bytes, path, &mut refs);
        dedup_qualified_names(&mut module);

        FileAnalysis {
            symbols: module,
            references: refs,
            diagnostic: None,
        }
    }
}
