//! Codetree CLI — produce a code tree artifact for a source repository.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use codetree_core::artifact::write_artifact;
use codetree_core::config::AnalysisConfig;
use codetree_core::pipeline;

#[derive(Parser)]
#[command(
    name = "codetree",
    about = "Codetree - Map a repository's files, symbols and dependencies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source tree and produce a code tree artifact
    Analyze {
        /// Path to the repository or source tree
        path: PathBuf,

        /// Output JSON file path
        #[arg(short, long)]
        output: Option<String>,

        /// Comma-separated extensions to include (default: all supported)
        #[arg(long)]
        include_ext: Option<String>,

        /// Additional glob patterns to exclude
        #[arg(long)]
        exclude: Vec<String>,

        /// Skip files larger than this many bytes
        #[arg(long, default_value = "1000000")]
        max_file_size: u64,

        /// Show per-phase timing breakdown
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long)]
        quiet: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            output,
            include_ext,
            exclude,
            max_file_size,
            verbose,
            quiet,
        } => {
            let repo_path = path.canonicalize().unwrap_or(path);
            let repo_name = repo_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "repo".to_string());

            let output_path = output.unwrap_or_else(|| format!("{repo_name}.codetree.json"));

            let include_extensions = include_ext.map(|l| {
                l.split(',')
                    .map(|s| s.trim().trim_start_matches('.').to_string())
                    .collect::<Vec<_>>()
            });

            let config = AnalysisConfig {
                target_root: repo_path.to_string_lossy().to_string(),
                include_extensions,
                ignore_patterns: exclude,
                max_file_size,
            };

            if quiet {
                run_quiet(&config, &output_path);
            } else {
                run_with_progress(&config, &output_path, verbose);
            }
        }
    }
}

fn run_quiet(config: &AnalysisConfig, output_path: &str) {
    match pipeline::build_code_tree(config, None) {
        Ok(artifact) => {
            if let Err(e) = write_artifact(&artifact, output_path) {
                eprintln!("Error writing output: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Analysis failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run_with_progress(config: &AnalysisConfig, output_path: &str, verbose: bool) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message("Initialising...");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    let progress: pipeline::ProgressCallback = {
        let pb = pb.clone();
        Box::new(move |_name, label| {
            pb.set_message(label.to_string());
        })
    };

    let start = Instant::now();
    let artifact = match pipeline::build_code_tree(config, Some(progress)) {
        Ok(a) => a,
        Err(e) => {
            pb.finish_and_clear();
            eprintln!("Analysis failed: {e}");
            std::process::exit(1);
        }
    };
    pb.finish_and_clear();

    println!(
        "\n{}  Codetree: {}",
        style("✓").green().bold(),
        style(
            std::path::Path::new(&config.target_root)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        )
        .bold()
    );
    println!(
        "  {:<14} {}",
        "Files:",
        artifact.stats.get("files").unwrap_or(&serde_json::json!(0))
    );
    println!(
        "  {:<14} {}",
        "Symbols:",
        artifact
            .stats
            .get("symbols")
            .unwrap_or(&serde_json::json!(0))
    );
    println!(
        "  {:<14} {}",
        "Dependencies:",
        artifact
            .stats
            .get("dependencyEdges")
            .unwrap_or(&serde_json::json!(0))
    );

    let duration = start.elapsed();
    println!(
        "  {:<14} {:.1}ms",
        "Duration:",
        duration.as_secs_f64() * 1000.0
    );

    if verbose {
        if let Some(serde_json::Value::Object(timings)) = artifact.metadata.get("phaseTimings") {
            println!("\n  Phase Timings:");
            for (phase, secs) in timings {
                if let Some(val) = secs.as_f64() {
                    println!("    {:<14} {:.1}ms", phase, val * 1000.0);
                }
            }
        }
    }

    if !artifact.diagnostics.is_empty() {
        println!(
            "\n  {} {} entries could not be fully processed:",
            style("!").yellow().bold(),
            artifact.diagnostics.len()
        );
        for note in &artifact.diagnostics {
            println!("   - {note}");
        }
    }

    if let Err(e) = write_artifact(&artifact, output_path) {
        eprintln!("Error writing output: {e}");
        std::process::exit(1);
    }

    println!(
        "\n  {} {}",
        style("Output written to:").green(),
        output_path
    );
}
