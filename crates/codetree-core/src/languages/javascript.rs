//! JavaScript / TypeScript / JSX / TSX language analyzer.
//!
//! A heuristic scan shared by the whole ECMAScript family. Import and
//! require specifiers, top-level declarations and exports are matched by
//! pattern; UI components are recognized either by a body that evidently
//! returns JSX markup or by a class extending a known component base.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{
    dedup_qualified_names, module_symbol, FileAnalysis, LanguageAnalyzer,
};
use crate::config::{Language, RawReference, ReferenceKind, Symbol, SymbolKind};

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:[^'"\n]+?\s+from\s+)?['"]([^'"]+)['"]"#).unwrap()
});

static REEXPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*export\s+(?:\*(?:\s+as\s+\w+)?|\{[^}]*\})\s+from\s+['"]([^'"]+)['"]"#)
        .unwrap()
});

static REQUIRE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

static DYNAMIC_IMPORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:default\s+)?class\s+([A-Za-z_$][\w$]*)(?:\s+extends\s+([\w.$]+))?")
        .unwrap()
});

static FUNCTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)?\s*\(")
        .unwrap()
});

static ARROW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?(?:\([^)\n]*\)\s*(?::[^=\n]+?)?|[A-Za-z_$][\w$]*)\s*=>",
    )
    .unwrap()
});

/// Evidence that a body renders JSX-like markup.
static MARKUP_RETURN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:return|=>)\s*\(?\s*<[A-Za-z>/]").unwrap());

static COMPONENT_BASES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "React.Component",
        "React.PureComponent",
        "Component",
        "PureComponent",
    ]
    .into_iter()
    .collect()
});

fn line_number_from_offset(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// A candidate declaration before classification.
struct Candidate {
    offset: usize,
    name: String,
    line: usize,
    base: CandidateBase,
}

enum CandidateBase {
    Function,
    Arrow,
    Class { extends: Option<String> },
}

pub struct JavaScriptAnalyzer;

impl Default for JavaScriptAnalyzer {
    fn default() -> Self {
        Self
    }
}

impl JavaScriptAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn collect_references(source: &str, path: &str, refs: &mut Vec<RawReference>) {
        for caps in IMPORT_PATTERN.captures_iter(source) {
            let m = caps.get(1).expect("pattern has one group");
            refs.push(RawReference::new(
                path,
                m.as_str(),
                ReferenceKind::Import,
                line_number_from_offset(source, m.start()),
            ));
        }
        for caps in REEXPORT_PATTERN.captures_iter(source) {
            let m = caps.get(1).expect("pattern has one group");
            refs.push(RawReference::new(
                path,
                m.as_str(),
                ReferenceKind::Import,
                line_number_from_offset(source, m.start()),
            ));
        }
        for caps in REQUIRE_PATTERN.captures_iter(source) {
            let m = caps.get(1).expect("pattern has one group");
            refs.push(RawReference::new(
                path,
                m.as_str(),
                ReferenceKind::Require,
                line_number_from_offset(source, m.start()),
            ));
        }
        for caps in DYNAMIC_IMPORT_PATTERN.captures_iter(source) {
            let m = caps.get(1).expect("pattern has one group");
            refs.push(RawReference::new(
                path,
                m.as_str(),
                ReferenceKind::Import,
                line_number_from_offset(source, m.start()),
            ));
        }
    }

    fn collect_candidates(source: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for caps in CLASS_PATTERN.captures_iter(source) {
            let whole = caps.get(0).expect("match exists");
            let name = caps.get(1).expect("pattern has a name group");
            candidates.push(Candidate {
                offset: whole.start(),
                name: name.as_str().to_string(),
                line: line_number_from_offset(source, name.start()),
                base: CandidateBase::Class {
                    extends: caps.get(2).map(|m| m.as_str().to_string()),
                },
            });
        }
        for caps in FUNCTION_PATTERN.captures_iter(source) {
            let whole = caps.get(0).expect("match exists");
            let (name, name_start) = match caps.get(1) {
                Some(m) => (m.as_str().to_string(), m.start()),
                // Anonymous default export.
                None => ("default".to_string(), whole.start()),
            };
            candidates.push(Candidate {
                offset: whole.start(),
                name,
                line: line_number_from_offset(source, name_start),
                base: CandidateBase::Function,
            });
        }
        for caps in ARROW_PATTERN.captures_iter(source) {
            let whole = caps.get(0).expect("match exists");
            let name = caps.get(1).expect("pattern has a name group");
            candidates.push(Candidate {
                offset: whole.start(),
                name: name.as_str().to_string(),
                line: line_number_from_offset(source, name.start()),
                base: CandidateBase::Arrow,
            });
        }

        candidates.sort_by_key(|c| c.offset);
        candidates
    }
}

impl LanguageAnalyzer for JavaScriptAnalyzer {
    fn extensions(&self) -> &[&str] {
        &["js", "jsx", "ts", "tsx", "mjs", "cjs"]
    }

    fn language_for_ext(&self, ext: &str) -> Language {
        match ext {
            "ts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "jsx" => Language::Jsx,
            _ => Language::JavaScript,
        }
    }

    fn analyze(&self, source: &str, path: &str) -> FileAnalysis {
        let line_count = source.lines().count();
        let mut module = module_symbol(path, Some(line_count));
        let mut refs = Vec::new();
        Self::collect_references(source, path, &mut refs);

        let candidates = Self::collect_candidates(source);

        // The body of each declaration runs until the next one starts;
        // good enough for markup detection and line ranges.
        let mut seen = HashSet::new();
        for (i, candidate) in candidates.iter().enumerate() {
            if !seen.insert(candidate.name.clone()) {
                continue;
            }
            let body_end = candidates
                .get(i + 1)
                .map(|next| next.offset)
                .unwrap_or(source.len());
            let body = &source[candidate.offset..body_end];

            let kind = match &candidate.base {
                CandidateBase::Class { extends } => {
                    if let Some(base) = extends {
                        refs.push(RawReference::new(
                            path,
                            base,
                            ReferenceKind::Extends,
                            candidate.line,
                        ));
                        if COMPONENT_BASES.contains(base.as_str()) {
                            SymbolKind::Component
                        } else {
                            SymbolKind::Class
                        }
                    } else {
                        SymbolKind::Class
                    }
                }
                CandidateBase::Function | CandidateBase::Arrow => {
                    if MARKUP_RETURN_PATTERN.is_match(body) {
                        SymbolKind::Component
                    } else {
                        SymbolKind::Function
                    }
                }
            };

            let qualified = format!("{}.{}", module.qualified_name, candidate.name);
            let mut sym = Symbol::new(kind, &candidate.name, &qualified, candidate.line);
            sym.line_end = line_number_from_offset(source, body_end.saturating_sub(1))
                .max(candidate.line);
            module.children.push(sym);
        }

        dedup_qualified_names(&mut module);
        FileAnalysis {
            symbols: module,
            references: refs,
            diagnostic: None,
        }
    }
}
