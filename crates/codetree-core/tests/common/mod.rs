//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};

use codetree_core::artifact::{Artifact, FileEntry};
use codetree_core::config::{AnalysisConfig, Symbol};
use codetree_core::pipeline::build_code_tree;

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

/// Run the full pipeline on a fixture directory.
pub fn run_fixture(fixture_name: &str) -> Artifact {
    let config = AnalysisConfig {
        target_root: fixture_path(fixture_name).to_string_lossy().to_string(),
        ..Default::default()
    };
    build_code_tree(&config, None).expect("pipeline should not abort on fixture")
}

/// Look up a file entry by path.
pub fn file_entry<'a>(artifact: &'a Artifact, path: &str) -> &'a FileEntry {
    artifact
        .files
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("no file entry for {path}"))
}

/// Find a direct child of a symbol by name.
pub fn child<'a>(symbol: &'a Symbol, name: &str) -> &'a Symbol {
    symbol
        .children
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no child named {name} under {}", symbol.qualified_name))
}
