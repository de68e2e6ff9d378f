//! Java analysis and resolution over the fixture tree.

mod common;

use common::*;

use codetree_core::config::{Confidence, ReferenceKind, SymbolKind};
use pretty_assertions::assert_eq;

#[test]
fn package_declaration_names_the_module() {
    let artifact = run_fixture("java_app");
    let app = file_entry(&artifact, "com/example/App.java");
    assert_eq!(app.symbols.qualified_name, "com.example");
    let class = child(&app.symbols, "App");
    assert_eq!(class.kind, SymbolKind::Class);
    assert_eq!(class.qualified_name, "com.example.App");
}

#[test]
fn methods_nest_under_types() {
    let artifact = run_fixture("java_app");
    let helper = file_entry(&artifact, "com/example/util/Helper.java");
    let class = child(&helper.symbols, "Helper");
    let method = child(class, "assist");
    assert_eq!(method.kind, SymbolKind::Method);
    assert_eq!(method.qualified_name, "com.example.util.Helper.assist");
}

#[test]
fn qualified_import_resolves_exactly() {
    let artifact = run_fixture("java_app");
    assert!(artifact.dependencies.iter().any(|e| {
        e.from == "com/example/App.java"
            && e.to == "com/example/util/Helper.java"
            && e.kind == ReferenceKind::Import
            && e.confidence == Confidence::Exact
    }));
}

#[test]
fn extends_clause_links_by_basename() {
    let artifact = run_fixture("java_app");
    assert!(artifact.dependencies.iter().any(|e| {
        e.from == "com/example/App.java"
            && e.to == "com/example/Base.java"
            && e.kind == ReferenceKind::Extends
            && e.confidence == Confidence::Heuristic
    }));
}

#[test]
fn no_parse_diagnostics_from_heuristic_scan() {
    let artifact = run_fixture("java_app");
    assert!(artifact
        .files
        .iter()
        .all(|f| f.parse_diagnostic.is_none()));
}
