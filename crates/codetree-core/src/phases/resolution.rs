//! Stage 3: global dependency resolution.
//!
//! A pure function over the complete inventory and the batch of raw
//! references collected during analysis. Nothing here depends on the
//! order files were analyzed in, so the output is deterministic
//! regardless of concurrency upstream.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::debug;

use crate::config::{Confidence, DependencyEdge, Language, RawReference, SourceFile};
use crate::graph::DependencyGraph;

const PY_EXTS: &[&str] = &["py", "pyi"];
const JS_EXTS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Per-file counters for references that produced no edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionCounts {
    pub unresolved: usize,
    pub external: usize,
}

/// The resolver's complete output.
pub struct Resolution {
    /// Deduplicated edges, sorted by `(from, to, kind)`.
    pub edges: Vec<DependencyEdge>,
    /// Unresolved/external counts keyed by referencing file.
    pub counts: HashMap<String, ResolutionCounts>,
}

enum Outcome {
    Resolved(String, Confidence),
    External,
    Unresolved,
}

/// Lookup tables built once from the inventory.
struct Index<'a> {
    paths: HashSet<&'a str>,
    /// File stem (no extension) → paths, in inventory order.
    basenames: HashMap<String, Vec<&'a str>>,
    /// Directories that directly contain at least one inventory file.
    dirs: HashSet<String>,
    /// First path segments of nested files.
    top_level_dirs: HashSet<&'a str>,
}

impl<'a> Index<'a> {
    fn build(files: &'a [SourceFile]) -> Self {
        let mut paths = HashSet::new();
        let mut basenames: HashMap<String, Vec<&str>> = HashMap::new();
        let mut dirs = HashSet::new();
        let mut top_level_dirs = HashSet::new();

        for file in files {
            paths.insert(file.path.as_str());
            if let Some(stem) = Path::new(&file.path)
                .file_stem()
                .and_then(|s| s.to_str())
            {
                basenames
                    .entry(stem.to_string())
                    .or_default()
                    .push(&file.path);
            }
            if let Some((dir, _)) = file.path.rsplit_once('/') {
                dirs.insert(dir.to_string());
                if let Some((head, _)) = file.path.split_once('/') {
                    top_level_dirs.insert(head);
                }
            }
        }

        Self {
            paths,
            basenames,
            dirs,
            top_level_dirs,
        }
    }
}

/// Resolve every raw reference against the inventory and build the graph.
pub fn resolve(files: &[SourceFile], references: &[RawReference]) -> Resolution {
    let index = Index::build(files);
    let languages: HashMap<&str, Language> = files
        .iter()
        .map(|f| (f.path.as_str(), f.language))
        .collect();

    let mut graph = DependencyGraph::new();
    for file in files {
        graph.add_file(&file.path);
    }

    let mut counts: HashMap<String, ResolutionCounts> = files
        .iter()
        .map(|f| (f.path.clone(), ResolutionCounts::default()))
        .collect();

    for reference in references {
        let language = languages
            .get(reference.file.as_str())
            .copied()
            .unwrap_or(Language::Unknown);
        let outcome = resolve_reference(reference, language, &index);
        match outcome {
            Outcome::Resolved(target, confidence) => {
                graph.add_edge(&reference.file, &target, reference.kind, confidence);
            }
            Outcome::External => {
                counts.entry(reference.file.clone()).or_default().external += 1;
            }
            Outcome::Unresolved => {
                counts
                    .entry(reference.file.clone())
                    .or_default()
                    .unresolved += 1;
            }
        }
    }

    let edges = graph.edges();
    debug!(
        "resolved {} edges from {} raw references",
        edges.len(),
        references.len()
    );
    Resolution { edges, counts }
}

fn resolve_reference(reference: &RawReference, language: Language, index: &Index) -> Outcome {
    match language {
        Language::Python => resolve_python(reference, index),
        Language::Java => resolve_java(reference, index),
        Language::JavaScript | Language::TypeScript | Language::Jsx | Language::Tsx => {
            resolve_js(reference, index)
        }
        Language::Unknown => fallback_or_external(last_dotted_segment(&reference.spec), index),
    }
}

// ---------------------------------------------------------------------------
// Python
// ---------------------------------------------------------------------------

fn resolve_python(reference: &RawReference, index: &Index) -> Outcome {
    let spec = reference.spec.as_str();

    if spec.starts_with('.') {
        let dots = spec.chars().take_while(|&c| c == '.').count();
        let remainder = &spec[dots..];

        let mut base = parent_dir(&reference.file);
        for _ in 0..dots.saturating_sub(1) {
            base = parent_of(&base);
        }

        if remainder.is_empty() {
            // `from . import x` — the package itself.
            let candidate = join(&base, "__init__.py");
            if index.paths.contains(candidate.as_str()) {
                return Outcome::Resolved(candidate, Confidence::Exact);
            }
            return Outcome::External;
        }

        let rel = remainder.replace('.', "/");
        if let Some(target) = probe_python(&join(&base, &rel), index) {
            return Outcome::Resolved(target, Confidence::Exact);
        }
        return fallback_or_external(last_dotted_segment(remainder), index);
    }

    // Absolute dotted module path from the repository root.
    let segments: Vec<&str> = spec.split('.').collect();
    if let Some(target) = probe_python(&segments.join("/"), index) {
        return Outcome::Resolved(target, Confidence::Exact);
    }

    // A proper prefix resolving to a module means the tail segments name
    // symbols inside it.
    for end in (1..segments.len()).rev() {
        if let Some(target) = probe_python(&segments[..end].join("/"), index) {
            return Outcome::Resolved(target, Confidence::Heuristic);
        }
    }

    fallback_or_external(last_dotted_segment(spec), index)
}

fn probe_python(path: &str, index: &Index) -> Option<String> {
    for ext in PY_EXTS {
        let candidate = format!("{path}.{ext}");
        if index.paths.contains(candidate.as_str()) {
            return Some(candidate);
        }
    }
    let candidate = format!("{path}/__init__.py");
    if index.paths.contains(candidate.as_str()) {
        return Some(candidate);
    }
    None
}

// ---------------------------------------------------------------------------
// Java
// ---------------------------------------------------------------------------

fn resolve_java(reference: &RawReference, index: &Index) -> Outcome {
    let spec = reference.spec.as_str();

    // Wildcard imports name a package directory, not a file. A directory
    // is ambiguous as an edge target, so it is never linked.
    if let Some(package) = spec.strip_suffix(".*") {
        let dir = package.replace('.', "/");
        if index.dirs.contains(&dir) {
            return Outcome::Unresolved;
        }
        return Outcome::External;
    }

    let segments: Vec<&str> = spec.split('.').collect();
    let full = format!("{}.java", segments.join("/"));
    if index.paths.contains(full.as_str()) {
        return Outcome::Resolved(full, Confidence::Exact);
    }

    // Qualified names often end in nested type or member segments.
    for end in (1..segments.len()).rev() {
        let candidate = format!("{}.java", segments[..end].join("/"));
        if index.paths.contains(candidate.as_str()) {
            return Outcome::Resolved(candidate, Confidence::Heuristic);
        }
    }

    fallback_or_external(last_dotted_segment(spec), index)
}

// ---------------------------------------------------------------------------
// JavaScript / TypeScript
// ---------------------------------------------------------------------------

fn resolve_js(reference: &RawReference, index: &Index) -> Outcome {
    let spec = reference.spec.as_str();

    if spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../") {
        let joined = normalize_path(&format!("{}/{}", parent_dir(&reference.file), spec));
        if let Some(target) = probe_js(&joined, index) {
            return Outcome::Resolved(target, Confidence::Exact);
        }
        return fallback_or_external(last_slash_segment(spec), index);
    }

    if let Some(rooted) = spec.strip_prefix('/') {
        // Repository-absolute alias.
        if let Some(target) = probe_js(&normalize_path(rooted), index) {
            return Outcome::Resolved(target, Confidence::Exact);
        }
        return fallback_or_external(last_slash_segment(spec), index);
    }

    // A bare specifier is only an intra-repo path when its head names a
    // top-level directory; anything else is a package from outside.
    let head = spec.split('/').next().unwrap_or(spec);
    if index.top_level_dirs.contains(head) {
        if let Some(target) = probe_js(&normalize_path(spec), index) {
            return Outcome::Resolved(target, Confidence::Exact);
        }
    }

    fallback_or_external(last_slash_segment(spec), index)
}

fn probe_js(path: &str, index: &Index) -> Option<String> {
    if index.paths.contains(path) {
        return Some(path.to_string());
    }
    for ext in JS_EXTS {
        let candidate = format!("{path}.{ext}");
        if index.paths.contains(candidate.as_str()) {
            return Some(candidate);
        }
    }
    for ext in JS_EXTS {
        let candidate = format!("{path}/index.{ext}");
        if index.paths.contains(candidate.as_str()) {
            return Some(candidate);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Name-only fallback
// ---------------------------------------------------------------------------

/// Rule 3: a lone basename match is linkable with heuristic confidence;
/// several equally plausible candidates are never guessed between.
fn fallback_or_external(segment: &str, index: &Index) -> Outcome {
    if segment.is_empty() {
        return Outcome::External;
    }
    match index.basenames.get(segment).map(Vec::as_slice) {
        Some([only]) => Outcome::Resolved(only.to_string(), Confidence::Heuristic),
        Some([_, ..]) => Outcome::Unresolved,
        _ => Outcome::External,
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn parent_dir(path: &str) -> String {
    path.rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default()
}

fn parent_of(dir: &str) -> String {
    dir.rsplit_once('/')
        .map(|(parent, _)| parent.to_string())
        .unwrap_or_default()
}

fn join(base: &str, rel: &str) -> String {
    if base.is_empty() {
        rel.to_string()
    } else {
        format!("{base}/{rel}")
    }
}

fn last_dotted_segment(spec: &str) -> &str {
    spec.rsplit('.').next().unwrap_or(spec)
}

fn last_slash_segment(spec: &str) -> &str {
    spec.rsplit('/').next().unwrap_or(spec)
}

/// Collapse `.` and `..` segments, `/`-separated.
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(segment),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceKind;
    use pretty_assertions::assert_eq;

    fn file(path: &str, language: Language) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            language,
            size: 0,
        }
    }

    fn py(path: &str) -> SourceFile {
        file(path, Language::Python)
    }

    fn js(path: &str) -> SourceFile {
        file(path, Language::JavaScript)
    }

    fn import_ref(from: &str, spec: &str) -> RawReference {
        RawReference::new(from, spec, ReferenceKind::Import, 1)
    }

    #[test]
    fn relative_python_import_is_exact() {
        let files = vec![py("pkg/__init__.py"), py("pkg/a.py"), py("pkg/b.py")];
        let refs = vec![import_ref("pkg/a.py", ".b")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges.len(), 1);
        assert_eq!(r.edges[0].from, "pkg/a.py");
        assert_eq!(r.edges[0].to, "pkg/b.py");
        assert_eq!(r.edges[0].confidence, Confidence::Exact);
    }

    #[test]
    fn double_dot_relative_import() {
        let files = vec![py("pkg/sub/a.py"), py("pkg/b.py")];
        let refs = vec![import_ref("pkg/sub/a.py", "..b")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "pkg/b.py");
        assert_eq!(r.edges[0].confidence, Confidence::Exact);
    }

    #[test]
    fn bare_dot_import_lands_on_package_init() {
        let files = vec![py("pkg/__init__.py"), py("pkg/a.py")];
        let refs = vec![import_ref("pkg/a.py", ".")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "pkg/__init__.py");
    }

    #[test]
    fn absolute_dotted_python_path() {
        let files = vec![py("app/services/db.py"), py("main.py")];
        let refs = vec![import_ref("main.py", "app.services.db")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "app/services/db.py");
        assert_eq!(r.edges[0].confidence, Confidence::Exact);
    }

    #[test]
    fn module_prefix_resolves_heuristically() {
        // `import app.db.connect` where connect is a symbol inside db.py.
        let files = vec![py("app/db.py"), py("main.py")];
        let refs = vec![import_ref("main.py", "app.db.connect")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "app/db.py");
        assert_eq!(r.edges[0].confidence, Confidence::Heuristic);
    }

    #[test]
    fn stdlib_import_is_external() {
        let files = vec![py("main.py")];
        let refs = vec![import_ref("main.py", "os.path")];
        let r = resolve(&files, &refs);
        assert!(r.edges.is_empty());
        assert_eq!(r.counts["main.py"].external, 1);
    }

    #[test]
    fn bare_package_import_without_react_dir_is_external() {
        let files = vec![js("main.js")];
        let refs = vec![import_ref("main.js", "react")];
        let r = resolve(&files, &refs);
        assert!(r.edges.is_empty());
        assert_eq!(r.counts["main.js"].external, 1);
    }

    #[test]
    fn js_relative_with_extension_probing() {
        let files = vec![js("src/main.js"), js("src/util.js")];
        let refs = vec![import_ref("src/main.js", "./util")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "src/util.js");
        assert_eq!(r.edges[0].confidence, Confidence::Exact);
    }

    #[test]
    fn js_directory_import_hits_index_file() {
        let files = vec![js("src/main.js"), js("src/components/index.jsx")];
        let refs = vec![import_ref("src/main.js", "./components")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "src/components/index.jsx");
    }

    #[test]
    fn js_parent_relative_normalizes() {
        let files = vec![js("src/app/main.js"), js("src/util.ts")];
        let refs = vec![import_ref("src/app/main.js", "../util")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "src/util.ts");
    }

    #[test]
    fn bare_specifier_matching_top_level_dir() {
        let files = vec![js("src/main.js"), js("lib/helpers.js")];
        let refs = vec![import_ref("src/main.js", "lib/helpers")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "lib/helpers.js");
        assert_eq!(r.edges[0].confidence, Confidence::Exact);
    }

    #[test]
    fn repo_absolute_alias() {
        let files = vec![js("src/deep/page.js"), js("src/shared/api.js")];
        let refs = vec![import_ref("src/deep/page.js", "/src/shared/api")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "src/shared/api.js");
    }

    #[test]
    fn java_qualified_import_exact() {
        let files = vec![
            file("com/example/App.java", Language::Java),
            file("com/example/util/Helper.java", Language::Java),
        ];
        let refs = vec![import_ref("com/example/App.java", "com.example.util.Helper")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "com/example/util/Helper.java");
        assert_eq!(r.edges[0].confidence, Confidence::Exact);
    }

    #[test]
    fn java_source_root_prefix_falls_back_to_basename() {
        let files = vec![
            file("src/com/example/App.java", Language::Java),
            file("src/com/example/util/Helper.java", Language::Java),
        ];
        let refs = vec![import_ref(
            "src/com/example/App.java",
            "com.example.util.Helper",
        )];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "src/com/example/util/Helper.java");
        assert_eq!(r.edges[0].confidence, Confidence::Heuristic);
    }

    #[test]
    fn java_wildcard_package_is_unresolved_when_present() {
        let files = vec![
            file("com/example/App.java", Language::Java),
            file("com/example/util/Helper.java", Language::Java),
        ];
        let refs = vec![import_ref("com/example/App.java", "com.example.util.*")];
        let r = resolve(&files, &refs);
        assert!(r.edges.is_empty());
        assert_eq!(r.counts["com/example/App.java"].unresolved, 1);
    }

    #[test]
    fn ambiguous_basename_is_unresolved() {
        let files = vec![py("foo.py"), py("sub/foo.py"), py("user.py")];
        let refs = vec![import_ref("user.py", "foo")];
        let r = resolve(&files, &refs);
        // Both foo.py and sub/foo.py match `foo` exactly, so the direct
        // probe wins on the root-level one.
        assert_eq!(r.edges[0].to, "foo.py");

        // But a name that only the fallback can see stays unresolved.
        let files = vec![py("a/foo.py"), py("b/foo.py"), py("user.py")];
        let refs = vec![import_ref("user.py", "foo")];
        let r = resolve(&files, &refs);
        assert!(r.edges.is_empty());
        assert_eq!(r.counts["user.py"].unresolved, 1);
    }

    #[test]
    fn unique_basename_fallback_is_heuristic() {
        let files = vec![py("nested/deep/helpers.py"), py("main.py")];
        let refs = vec![import_ref("main.py", "helpers")];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges[0].to, "nested/deep/helpers.py");
        assert_eq!(r.edges[0].confidence, Confidence::Heuristic);
    }

    #[test]
    fn self_reference_is_dropped() {
        let files = vec![py("pkg/a.py")];
        let refs = vec![import_ref("pkg/a.py", ".a")];
        let r = resolve(&files, &refs);
        assert!(r.edges.is_empty());
        assert_eq!(r.counts["pkg/a.py"], ResolutionCounts::default());
    }

    #[test]
    fn duplicate_references_collapse_to_one_edge() {
        let files = vec![py("pkg/a.py"), py("pkg/b.py")];
        let refs = vec![
            import_ref("pkg/a.py", ".b"),
            import_ref("pkg/a.py", "pkg.b"),
        ];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges.len(), 1);
    }

    #[test]
    fn extends_and_import_edges_coexist() {
        let files = vec![py("base.py"), py("impl.py")];
        let refs = vec![
            import_ref("impl.py", "base"),
            RawReference::new("impl.py", "base", ReferenceKind::Extends, 3),
        ];
        let r = resolve(&files, &refs);
        assert_eq!(r.edges.len(), 2);
        let kinds: Vec<_> = r.edges.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ReferenceKind::Import));
        assert!(kinds.contains(&ReferenceKind::Extends));
    }

    #[test]
    fn output_independent_of_reference_order() {
        let files = vec![py("pkg/a.py"), py("pkg/b.py"), py("pkg/c.py")];
        let forward = vec![import_ref("pkg/a.py", ".b"), import_ref("pkg/c.py", ".a")];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();
        let r1 = resolve(&files, &forward);
        let r2 = resolve(&files, &reversed);
        assert_eq!(r1.edges, r2.edges);
    }

    #[test]
    fn normalize_path_collapses_dots() {
        assert_eq!(normalize_path("a/b/../c"), "a/c");
        assert_eq!(normalize_path("./a/./b"), "a/b");
        assert_eq!(normalize_path("a/../../b"), "b");
    }
}
