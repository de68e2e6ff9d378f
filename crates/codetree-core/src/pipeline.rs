//! Statically ordered pipeline with timing.
//!
//! Four stages, fixed order: discovery → analysis → resolution → assembly.
//! Analysis fans out per file; resolution waits for the full batch.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::artifact::{build_artifact, Artifact};
use crate::config::{AnalysisConfig, RawReference};
use crate::error::DiscoveryError;
use crate::phases;

/// Phase labels for progress reporting.
const PHASE_LABELS: &[(&str, &str)] = &[
    ("discovery", "Scanning file tree"),
    ("analysis", "Extracting symbols"),
    ("resolution", "Resolving dependencies"),
    ("assembly", "Assembling artifact"),
];

/// Progress callback type: (phase_name, label).
pub type ProgressCallback = Box<dyn FnMut(&str, &str)>;

fn report(progress: &mut Option<ProgressCallback>, name: &str) {
    if let Some(cb) = progress {
        let label = PHASE_LABELS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, l)| *l)
            .unwrap_or(name);
        cb(name, label);
    }
}

/// Run the full pipeline over the configured target root.
///
/// Only a missing or unreadable root aborts; every other condition
/// degrades to a diagnostic inside the returned artifact.
pub fn build_code_tree(
    config: &AnalysisConfig,
    mut progress: Option<ProgressCallback>,
) -> Result<Artifact, DiscoveryError> {
    let mut timings: BTreeMap<String, f64> = BTreeMap::new();

    report(&mut progress, "discovery");
    let start = Instant::now();
    let discovery = phases::discovery::discover_files(config)?;
    timings.insert("discovery".to_string(), start.elapsed().as_secs_f64());

    report(&mut progress, "analysis");
    let start = Instant::now();
    let analyses = phases::analysis::run_analysis(config, &discovery.files);
    timings.insert("analysis".to_string(), start.elapsed().as_secs_f64());

    // Barrier: every file's references must be in hand before resolving,
    // since any file may be a target for any other.
    report(&mut progress, "resolution");
    let start = Instant::now();
    let references: Vec<RawReference> = analyses
        .iter()
        .flat_map(|a| a.references.iter().cloned())
        .collect();
    let resolution = phases::resolution::resolve(&discovery.files, &references);
    timings.insert("resolution".to_string(), start.elapsed().as_secs_f64());

    report(&mut progress, "assembly");
    let start = Instant::now();
    let artifact = build_artifact(
        config,
        discovery.files,
        analyses,
        resolution,
        discovery.warnings,
        &timings,
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_aborts_without_artifact() {
        let config = AnalysisConfig {
            target_root: "/definitely/not/here".to_string(),
            ..Default::default()
        };
        assert!(build_code_tree(&config, None).is_err());
    }

    #[test]
    fn progress_reports_all_phases_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        let config = AnalysisConfig {
            target_root: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };

        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressCallback = Box::new(move |name, _label| {
            sink.borrow_mut().push(name.to_string());
        });

        build_code_tree(&config, Some(progress)).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec!["discovery", "analysis", "resolution", "assembly"]
        );
    }
}
