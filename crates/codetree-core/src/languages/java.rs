//! Java language analyzer.
//!
//! A tolerant heuristic scan over lines with brace-depth tracking, not a
//! grammar. Lines that match nothing are skipped; annotations, generics
//! and unbalanced fragments never fail the file.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    dedup_qualified_names, module_symbol, FileAnalysis, LanguageAnalyzer,
};
use crate::config::{Language, RawReference, ReferenceKind, Symbol, SymbolKind};

static PACKAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*package\s+([A-Za-z_][\w.]*)\s*;").unwrap());

static IMPORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;").unwrap());

static TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|protected|private|abstract|final|static|sealed|non-sealed|strictfp)\s+)*(class|interface|enum|record)\s+(\w+)",
    )
    .unwrap()
});

static METHOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Return type + name + opening paren, modifiers optional so that
    // interface signatures like `void m();` still match. The character
    // class cannot cross `=`, which keeps assignments and calls out.
    Regex::new(
        r"^\s*(?:(?:public|protected|private|static|final|synchronized|abstract|default|native)\s+)*(?:<[^>]*>\s*)?[\w\[\]<>?,.\s]+?\s+(\w+)\s*\(",
    )
    .unwrap()
});

static EXTENDS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bextends\s+([\w.<>,\s]+?)(?:\s+implements\b|\s*\{|$)").unwrap());

static IMPLEMENTS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimplements\s+([\w.<>,\s]+?)(?:\s*\{|$)").unwrap());

/// A declaration awaiting its closing brace.
struct OpenDecl {
    symbol: Symbol,
    /// Brace depth once the body opens; the decl closes when depth drops
    /// below this again.
    body_depth: Option<usize>,
}

pub struct JavaAnalyzer;

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self
    }
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Blank out string literals, char literals and `//` comments so brace
    /// counting and keyword matching stay honest. Best-effort only.
    fn scrub_line(line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        let mut in_string = false;
        let mut in_char = false;
        while let Some(c) = chars.next() {
            if in_string {
                if c == '\\' {
                    chars.next();
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            if in_char {
                if c == '\\' {
                    chars.next();
                } else if c == '\'' {
                    in_char = false;
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '\'' => in_char = true,
                '/' if chars.peek() == Some(&'/') => break,
                _ => out.push(c),
            }
        }
        out
    }

    fn split_type_list(list: &str) -> Vec<String> {
        // Drop generic arguments before splitting on commas.
        let mut flat = String::with_capacity(list.len());
        let mut angle_depth = 0usize;
        for c in list.chars() {
            match c {
                '<' => angle_depth += 1,
                '>' => angle_depth = angle_depth.saturating_sub(1),
                _ if angle_depth == 0 => flat.push(c),
                _ => {}
            }
        }
        flat.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn looks_like_keyword(name: &str) -> bool {
        matches!(
            name,
            "if" | "for"
                | "while"
                | "switch"
                | "catch"
                | "return"
                | "new"
                | "throw"
                | "else"
                | "do"
                | "try"
                | "case"
                | "break"
                | "continue"
                | "assert"
                | "super"
                | "this"
        )
    }

    /// First identifier on a line, used to reject statements that open
    /// with a control keyword before pattern matching.
    fn first_word(line: &str) -> &str {
        let trimmed = line.trim_start();
        let end = trimmed
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn extensions(&self) -> &[&str] {
        &["java"]
    }

    fn language_for_ext(&self, _ext: &str) -> Language {
        Language::Java
    }

    fn analyze(&self, source: &str, path: &str) -> FileAnalysis {
        let line_count = source.lines().count();
        let mut module = module_symbol(path, Some(line_count));
        let mut refs: Vec<RawReference> = Vec::new();

        let mut stack: Vec<OpenDecl> = Vec::new();
        let mut depth: usize = 0;
        let mut in_block_comment = false;

        // Attach a finished declaration to its enclosing type or the module.
        fn attach(stack: &mut Vec<OpenDecl>, module: &mut Symbol, done: Symbol) {
            match stack.last_mut() {
                Some(parent) => parent.symbol.children.push(done),
                None => module.children.push(done),
            }
        }

        for (idx, raw_line) in source.lines().enumerate() {
            let line_no = idx + 1;

            // Strip /* ... */ spans, tolerating multi-line comments.
            let mut line = String::new();
            let mut rest = raw_line;
            loop {
                if in_block_comment {
                    match rest.find("*/") {
                        Some(end) => {
                            in_block_comment = false;
                            rest = &rest[end + 2..];
                        }
                        None => break,
                    }
                } else {
                    match rest.find("/*") {
                        Some(start) => {
                            line.push_str(&rest[..start]);
                            in_block_comment = true;
                            rest = &rest[start + 2..];
                        }
                        None => {
                            line.push_str(rest);
                            break;
                        }
                    }
                }
            }
            let line = Self::scrub_line(&line);

            if let Some(caps) = PACKAGE_PATTERN.captures(&line) {
                let package = caps[1].to_string();
                module.name = package
                    .rsplit('.')
                    .next()
                    .unwrap_or(&package)
                    .to_string();
                module.qualified_name = package;
            } else if let Some(caps) = IMPORT_PATTERN.captures(&line) {
                refs.push(RawReference::new(
                    path,
                    &caps[1],
                    ReferenceKind::Import,
                    line_no,
                ));
            } else if let Some(caps) = TYPE_PATTERN.captures(&line) {
                let keyword = &caps[1];
                let name = caps[2].to_string();
                let kind = if keyword == "interface" {
                    SymbolKind::Interface
                } else {
                    SymbolKind::Class
                };
                let parent_qualified = stack
                    .last()
                    .map(|d| d.symbol.qualified_name.clone())
                    .unwrap_or_else(|| module.qualified_name.clone());
                let symbol = Symbol::new(
                    kind,
                    &name,
                    &format!("{parent_qualified}.{name}"),
                    line_no,
                );

                if let Some(ext) = EXTENDS_PATTERN.captures(&line) {
                    for base in Self::split_type_list(&ext[1]) {
                        refs.push(RawReference::new(
                            path,
                            &base,
                            ReferenceKind::Extends,
                            line_no,
                        ));
                    }
                }
                if keyword != "interface" {
                    if let Some(imp) = IMPLEMENTS_PATTERN.captures(&line) {
                        for iface in Self::split_type_list(&imp[1]) {
                            refs.push(RawReference::new(
                                path,
                                &iface,
                                ReferenceKind::Implements,
                                line_no,
                            ));
                        }
                    }
                }

                stack.push(OpenDecl {
                    symbol,
                    body_depth: None,
                });
            } else if let Some(caps) = METHOD_PATTERN
                .captures(&line)
                .filter(|_| !Self::looks_like_keyword(Self::first_word(&line)))
            {
                let name = caps[1].to_string();
                let inside_type = stack
                    .iter()
                    .any(|d| d.symbol.kind != SymbolKind::Method);
                // A name matching the enclosing type is a constructor.
                let is_constructor = stack.last().is_some_and(|d| d.symbol.name == name);
                if inside_type && !is_constructor && !Self::looks_like_keyword(&name) {
                    let parent_qualified = stack
                        .last()
                        .map(|d| d.symbol.qualified_name.clone())
                        .unwrap_or_else(|| module.qualified_name.clone());
                    let symbol = Symbol::new(
                        SymbolKind::Method,
                        &name,
                        &format!("{parent_qualified}.{name}"),
                        line_no,
                    );
                    // Abstract/interface signatures end at the semicolon.
                    let semi = line.find(';');
                    let brace = line.find('{');
                    if semi.is_some() && (brace.is_none() || semi < brace) {
                        attach(&mut stack, &mut module, symbol);
                    } else {
                        stack.push(OpenDecl {
                            symbol,
                            body_depth: None,
                        });
                    }
                }
            }

            // Brace accounting closes declarations when their body ends.
            for c in line.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        if let Some(top) = stack.last_mut() {
                            if top.body_depth.is_none() {
                                top.body_depth = Some(depth);
                            }
                        }
                    }
                    '}' => {
                        depth = depth.saturating_sub(1);
                        while stack
                            .last()
                            .and_then(|d| d.body_depth)
                            .is_some_and(|bd| depth < bd)
                        {
                            let Some(mut done) = stack.pop() else { break };
                            done.symbol.line_end = line_no;
                            attach(&mut stack, &mut module, done.symbol);
                        }
                    }
                    _ => {}
                }
            }
        }

        // Unbalanced input: close whatever is still open at the last line.
        while let Some(mut open) = stack.pop() {
            open.symbol.line_end = line_count.max(open.symbol.line_start);
            attach(&mut stack, &mut module, open.symbol);
        }

        dedup_qualified_names(&mut module);
        FileAnalysis {
            symbols: module,
            references: refs,
            diagnostic: None,
        }
    }
}
