//! Core data types and configuration for codetree analysis.

use serde::{Deserialize, Serialize};

/// Source language inferred from a file's extension at discovery time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Jsx => "jsx",
            Self::Tsx => "tsx",
            Self::Unknown => "unknown",
        }
    }

    /// Whether two languages share import/extension semantics for resolution.
    pub fn same_family(&self, other: Language) -> bool {
        self.family() == other.family()
    }

    fn family(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::JavaScript | Self::TypeScript | Self::Jsx | Self::Tsx => "ecmascript",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of symbol extracted from source code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Module,
    Class,
    Interface,
    Function,
    Method,
    Component,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Function => "function",
            Self::Method => "method",
            Self::Component => "component",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in a file's symbol tree. Ownership is strictly tree-shaped:
/// each symbol has exactly one parent, the file's module symbol is the root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    /// Dotted name qualified by the enclosing module/class chain,
    /// unique within the file.
    pub qualified_name: String,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub children: Vec<Symbol>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: &str, qualified_name: &str, line: usize) -> Self {
        Self {
            kind,
            name: name.to_string(),
            qualified_name: qualified_name.to_string(),
            line_start: line,
            line_end: line,
            doc: None,
            children: Vec::new(),
        }
    }

    /// Total number of symbols in this subtree, the root included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Symbol::count).sum::<usize>()
    }
}

/// How a raw reference was written in source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Import,
    Require,
    Extends,
    Implements,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Require => "require",
            Self::Extends => "extends",
            Self::Implements => "implements",
        }
    }
}

/// An unresolved dependency reference, exactly as written in source.
/// Consumed entirely by the resolver, never serialized into the artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReference {
    /// Relative path of the referencing file.
    pub file: String,
    /// The literal specifier: dotted Python module path (leading dots kept),
    /// Java qualified name, JS module specifier, or a base-type name.
    pub spec: String,
    pub kind: ReferenceKind,
    pub line: usize,
}

impl RawReference {
    pub fn new(file: &str, spec: &str, kind: ReferenceKind, line: usize) -> Self {
        Self {
            file: file.to_string(),
            spec: spec.to_string(),
            kind,
            line,
        }
    }
}

/// Classification of a resolved reference. Only `Exact` and `Heuristic`
/// appear on edges; `External` and `Unresolved` become per-file counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Heuristic,
    External,
    Unresolved,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Heuristic => "heuristic",
            Self::External => "external",
            Self::Unresolved => "unresolved",
        }
    }
}

/// A resolved, directed dependency between two inventory files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub kind: ReferenceKind,
    pub confidence: Confidence,
}

/// A source file in the inventory. Created by discovery, enriched with a
/// symbol tree and diagnostics during analysis, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    pub language: Language,
    pub size: u64,
}

/// Configuration for an analysis run, supplied by the CLI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub target_root: String,
    /// Extensions to include (no leading dot). None means every extension
    /// a registered analyzer handles.
    pub include_extensions: Option<Vec<String>>,
    /// Glob patterns pruned during discovery, on top of the built-in list.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    1_000_000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_root: String::new(),
            include_extensions: None,
            ignore_patterns: Vec::new(),
            max_file_size: default_max_file_size(),
        }
    }
}
