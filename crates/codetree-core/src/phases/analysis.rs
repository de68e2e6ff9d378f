//! Stage 2: per-file symbol and reference extraction.
//!
//! Files are independent units of work: each one maps to a `FileAnalysis`
//! slot aligned with the inventory index, so the parallel phase shares no
//! mutable state and the result order never depends on scheduling.

use std::path::Path;

use log::debug;
use rayon::prelude::*;

use crate::config::{AnalysisConfig, SourceFile};
use crate::languages::{extension_of, AnalyzerRegistry, FileAnalysis};

/// Analyze every inventory file. The returned vector is index-aligned
/// with `files`; a file that cannot be read or parsed carries a
/// diagnostic instead of aborting the run.
pub fn run_analysis(config: &AnalysisConfig, files: &[SourceFile]) -> Vec<FileAnalysis> {
    let registry = AnalyzerRegistry::new();
    let root = Path::new(&config.target_root);

    let analyses: Vec<FileAnalysis> = files
        .par_iter()
        .map(|file| analyze_one(&registry, root, file))
        .collect();

    debug!(
        "analyzed {} files, {} with diagnostics",
        analyses.len(),
        analyses.iter().filter(|a| a.diagnostic.is_some()).count()
    );
    analyses
}

fn analyze_one(registry: &AnalyzerRegistry, root: &Path, file: &SourceFile) -> FileAnalysis {
    let ext = extension_of(&file.path);
    let analyzer = match registry.get_by_extension(&ext) {
        Some(a) => a,
        None => {
            return FileAnalysis::degraded(
                &file.path,
                format!("no analyzer registered for .{ext}"),
            )
        }
    };

    let abs = root.join(&file.path);
    let source = match std::fs::read(&abs) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            return FileAnalysis::degraded(&file.path, format!("failed to read: {e}"));
        }
    };

    analyzer.analyze(&source, &file.path)
}
