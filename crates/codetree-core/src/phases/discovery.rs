//! Stage 1: walk the target root and build the ordered file inventory.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::{AnalysisConfig, SourceFile};
use crate::error::DiscoveryError;
use crate::languages::AnalyzerRegistry;

/// Directory names never descended into.
const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
    "dist",
    "build",
    "target",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    ".eggs",
];

/// The discovered inventory plus non-fatal per-entry notes.
pub struct Discovery {
    pub files: Vec<SourceFile>,
    pub warnings: Vec<String>,
}

/// Walk the tree and return a deterministic, lexicographically ordered
/// inventory. Only an unusable root is fatal; everything else is a
/// recorded skip.
pub fn discover_files(config: &AnalysisConfig) -> Result<Discovery, DiscoveryError> {
    let root = Path::new(&config.target_root);
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotADirectory(root.to_path_buf()));
    }
    if let Err(e) = std::fs::read_dir(root) {
        return Err(DiscoveryError::RootUnreadable {
            path: root.to_path_buf(),
            source: e,
        });
    }

    let registry = AnalyzerRegistry::new();
    let include: HashSet<String> = match &config.include_extensions {
        Some(exts) => exts.iter().map(|e| e.to_lowercase()).collect(),
        None => registry.extensions().iter().map(|e| e.to_string()).collect(),
    };

    let ignore_globs: Vec<glob::Pattern> = config
        .ignore_patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pat) => Some(pat),
            Err(e) => {
                warn!("ignoring malformed glob pattern {p:?}: {e}");
                None
            }
        })
        .collect();

    let mut files = Vec::new();
    let mut warnings = Vec::new();

    // follow_links(true) lets walkdir track resolved ancestors, so a
    // symlink cycle surfaces as a per-entry error instead of looping.
    let walker = WalkDir::new(root).follow_links(true).into_iter();
    for entry in walker.filter_entry(|e| {
        if e.depth() == 0 {
            return true;
        }
        let name = e.file_name().to_string_lossy();
        if DEFAULT_EXCLUDES.iter().any(|p| name == *p) {
            return false;
        }
        // Hidden directories are skipped, except the root itself.
        if e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.') {
            return false;
        }
        if !ignore_globs.is_empty() {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap_or(e.path())
                .to_string_lossy()
                .replace('\\', "/");
            if ignore_globs
                .iter()
                .any(|p| p.matches(&name) || p.matches(&rel))
            {
                return false;
            }
        }
        true
    }) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warnings.push(format!("skipped entry: {e}"));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let rel_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        let ext = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !include.contains(&ext) {
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                warnings.push(format!("skipped {rel_path}: {e}"));
                continue;
            }
        };
        if size > config.max_file_size {
            debug!("skipping {rel_path}: {size} bytes over limit");
            continue;
        }

        files.push(SourceFile {
            path: rel_path,
            language: registry.language_for_extension(&ext),
            size,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    debug!("discovered {} files under {}", files.len(), root.display());

    Ok(Discovery { files, warnings })
}
