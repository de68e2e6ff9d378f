//! Artifact structures and assembly, matching the external JSON schema.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, DependencyEdge, Language, SourceFile, Symbol};
use crate::languages::FileAnalysis;
use crate::phases::resolution::Resolution;

/// Schema version stamped into every artifact.
pub const SCHEMA_VERSION: &str = "1.0";

/// Counters for references that produced no edge, per file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDiagnostics {
    pub unresolved_count: usize,
    pub external_count: usize,
}

/// One inventory file with its symbol tree and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub path: String,
    pub language: Language,
    pub size: u64,
    /// The module-rooted symbol tree.
    pub symbols: Symbol,
    pub dependency_diagnostics: DependencyDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_diagnostic: Option<String>,
}

/// The complete, versioned analysis artifact. Built once per run; a new
/// run fully replaces any previous artifact at the output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub schema_version: String,
    pub repo_root: String,
    /// Files in discovery order (lexicographic by path).
    pub files: Vec<FileEntry>,
    /// Edges sorted by `(from, to, kind)`.
    pub dependencies: Vec<DependencyEdge>,
    /// Run-level warnings (skipped entries and the like).
    #[serde(default)]
    pub diagnostics: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub stats: BTreeMap<String, serde_json::Value>,
}

/// Merge per-file analyses and the resolved graph into the final artifact.
pub fn build_artifact(
    config: &AnalysisConfig,
    files: Vec<SourceFile>,
    analyses: Vec<FileAnalysis>,
    resolution: Resolution,
    warnings: Vec<String>,
    timings: &BTreeMap<String, f64>,
) -> Artifact {
    let mut entries = Vec::with_capacity(files.len());
    let mut symbol_count = 0usize;
    let mut language_counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for (file, analysis) in files.into_iter().zip(analyses) {
        symbol_count += analysis.symbols.count();
        *language_counts.entry(file.language.as_str()).or_insert(0) += 1;
        let diagnostics = resolution
            .counts
            .get(&file.path)
            .map(|c| DependencyDiagnostics {
                unresolved_count: c.unresolved,
                external_count: c.external,
            })
            .unwrap_or_default();
        entries.push(FileEntry {
            path: file.path,
            language: file.language,
            size: file.size,
            symbols: analysis.symbols,
            dependency_diagnostics: diagnostics,
            parse_diagnostic: analysis.diagnostic,
        });
    }

    let mut metadata = BTreeMap::new();
    metadata.insert(
        "generatedAt".to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339()),
    );
    metadata.insert(
        "toolVersion".to_string(),
        serde_json::Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    metadata.insert(
        "phaseTimings".to_string(),
        serde_json::to_value(timings).unwrap_or_default(),
    );

    let mut stats = BTreeMap::new();
    stats.insert("files".to_string(), serde_json::json!(entries.len()));
    stats.insert("symbols".to_string(), serde_json::json!(symbol_count));
    stats.insert(
        "dependencyEdges".to_string(),
        serde_json::json!(resolution.edges.len()),
    );
    stats.insert(
        "languages".to_string(),
        serde_json::to_value(&language_counts).unwrap_or_default(),
    );

    Artifact {
        schema_version: SCHEMA_VERSION.to_string(),
        repo_root: config.target_root.clone(),
        files: entries,
        dependencies: resolution.edges,
        diagnostics: warnings,
        metadata,
        stats,
    }
}

/// Write the artifact as pretty-printed JSON, creating parent directories.
pub fn write_artifact(artifact: &Artifact, output_path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(output_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(artifact).map_err(std::io::Error::other)?;
    std::fs::write(output_path, json)
}
