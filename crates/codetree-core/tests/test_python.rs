//! Python analysis over the fixture package.

mod common;

use common::*;

use codetree_core::config::SymbolKind;
use pretty_assertions::assert_eq;

#[test]
fn module_roots_carry_docstrings() {
    let artifact = run_fixture("python_pkg");
    let a = file_entry(&artifact, "pkg/a.py");
    assert_eq!(a.symbols.kind, SymbolKind::Module);
    assert_eq!(a.symbols.qualified_name, "pkg.a");
    assert_eq!(a.symbols.doc.as_deref(), Some("Module a."));
}

#[test]
fn class_method_nesting_mirrors_source() {
    let artifact = run_fixture("python_pkg");
    let b = file_entry(&artifact, "pkg/b.py");

    let class = child(&b.symbols, "Helper");
    assert_eq!(class.kind, SymbolKind::Class);
    assert_eq!(class.qualified_name, "pkg.b.Helper");
    assert_eq!(class.doc.as_deref(), Some("Helper class."));

    let method = child(class, "assist");
    assert_eq!(method.kind, SymbolKind::Method);
    assert_eq!(method.qualified_name, "pkg.b.Helper.assist");
    assert_eq!(method.doc.as_deref(), Some("Provide assistance."));
}

#[test]
fn top_level_function_under_module() {
    let artifact = run_fixture("python_pkg");
    let main = file_entry(&artifact, "main.py");
    let func = child(&main.symbols, "main");
    assert_eq!(func.kind, SymbolKind::Function);
    assert_eq!(func.doc.as_deref(), Some("Launch."));
}

#[test]
fn package_init_collapses_to_package_name() {
    let artifact = run_fixture("python_pkg");
    let init = file_entry(&artifact, "pkg/__init__.py");
    assert_eq!(init.symbols.qualified_name, "pkg");
    assert_eq!(init.symbols.doc.as_deref(), Some("Package marker."));
}

#[test]
fn line_ranges_cover_definitions() {
    let artifact = run_fixture("python_pkg");
    let a = file_entry(&artifact, "pkg/a.py");
    let class = child(&a.symbols, "App");
    assert!(class.line_start >= 6);
    assert!(class.line_end > class.line_start);
    let method = child(class, "run");
    assert!(method.line_start > class.line_start);
    assert!(method.line_end <= class.line_end);
}

#[test]
fn unlinked_base_class_counts_as_external() {
    // App extends Helper, but `Helper` names a class, not a file; the
    // extends reference stays out of the graph and is counted.
    let artifact = run_fixture("python_pkg");
    let a = file_entry(&artifact, "pkg/a.py");
    assert_eq!(a.dependency_diagnostics.external_count, 1);
}
