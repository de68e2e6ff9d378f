//! Language analyzer trait and registry.

use std::collections::HashMap;
use std::path::Path;

use crate::config::{Language, RawReference, Symbol, SymbolKind};

pub mod java;
pub mod javascript;
pub mod python;

/// Everything one file's analysis produces: a module-rooted symbol tree,
/// the raw references found in it, and an optional parse diagnostic.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub symbols: Symbol,
    pub references: Vec<RawReference>,
    pub diagnostic: Option<String>,
}

impl FileAnalysis {
    /// A bare module root with a diagnostic attached. Used when content
    /// could not be structurally analyzed; the file stays in the artifact.
    pub fn degraded(path: &str, diagnostic: String) -> Self {
        Self {
            symbols: module_symbol(path, None),
            references: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Trait that all language analyzers implement. Implementations vary in
/// rigor (a real grammar for Python, tolerant scans for Java and JS/TS)
/// but share this interface; a malformed file must yield a degraded
/// result, never a panic or an abort.
pub trait LanguageAnalyzer: Send + Sync {
    /// File extensions this analyzer handles, without the leading dot.
    fn extensions(&self) -> &[&str];

    /// Language tag for a specific extension.
    fn language_for_ext(&self, ext: &str) -> Language;

    /// Analyze one file's content.
    fn analyze(&self, source: &str, path: &str) -> FileAnalysis;
}

/// Registry mapping file extensions to analyzers. Adding a language means
/// adding one variant here; dispatch sites never change.
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn LanguageAnalyzer>>,
    extension_map: HashMap<String, usize>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        let analyzers: Vec<Box<dyn LanguageAnalyzer>> = vec![
            Box::new(python::PythonAnalyzer::new()),
            Box::new(java::JavaAnalyzer::new()),
            Box::new(javascript::JavaScriptAnalyzer::new()),
        ];

        let mut extension_map = HashMap::new();
        for (i, analyzer) in analyzers.iter().enumerate() {
            for ext in analyzer.extensions() {
                extension_map.insert(ext.to_string(), i);
            }
        }

        Self {
            analyzers,
            extension_map,
        }
    }

    /// Get the analyzer for a file extension, if one is registered.
    pub fn get_by_extension(&self, ext: &str) -> Option<&dyn LanguageAnalyzer> {
        self.extension_map
            .get(ext)
            .map(|&i| self.analyzers[i].as_ref())
    }

    /// Language tag for an extension; `Unknown` when unregistered.
    pub fn language_for_extension(&self, ext: &str) -> Language {
        self.get_by_extension(ext)
            .map(|a| a.language_for_ext(ext))
            .unwrap_or(Language::Unknown)
    }

    /// All registered extensions.
    pub fn extensions(&self) -> Vec<&str> {
        self.extension_map.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dotted module name derived from a relative path. `pkg/__init__.py` and
/// `pkg/index.js` collapse onto the package directory (`pkg`); Java files
/// may override this with their declared package name.
pub fn module_qualified_name(path: &str) -> String {
    let stem_path = match path.rsplit_once('.') {
        Some((head, _ext)) => head,
        None => path,
    };
    let stem_path = stem_path
        .strip_suffix("/__init__")
        .or_else(|| stem_path.strip_suffix("/index"))
        .unwrap_or(stem_path);
    stem_path.replace('/', ".")
}

/// The root symbol every file's tree hangs off of.
pub fn module_symbol(path: &str, line_count: Option<usize>) -> Symbol {
    let qualified = module_qualified_name(path);
    let name = qualified
        .rsplit('.')
        .next()
        .unwrap_or(&qualified)
        .to_string();
    let mut sym = Symbol::new(SymbolKind::Module, &name, &qualified, 1);
    sym.line_end = line_count.unwrap_or(1).max(1);
    sym
}

/// Make `qualified_name`s unique within one file by suffixing duplicates,
/// walking the tree in document order.
pub fn dedup_qualified_names(root: &mut Symbol) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    fn walk(sym: &mut Symbol, seen: &mut HashMap<String, usize>) {
        let count = seen.entry(sym.qualified_name.clone()).or_insert(0);
        if *count > 0 {
            sym.qualified_name = format!("{}_{}", sym.qualified_name, count);
        }
        *count += 1;
        for child in &mut sym.children {
            walk(child, seen);
        }
    }
    walk(root, &mut seen);
}

/// Extension of a path, lowercased, without the dot.
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
