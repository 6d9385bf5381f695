//! Clima Precompute
//!
//! Offline batch job: reads monthly dimension scores, computes the combined
//! statistics of every dimension pair and writes them as one JSON document
//! the dashboard serves instead of recomputing on the fly.
//!
//! Commands:
//! - compute: build the document from a scatter-data file
//! - verify: re-check every record of an existing document

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clima_stats::{EngineConfig, StatisticsEngine};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod document;

use document::{build_document, verify_document, PrecomputedDocument, ScatterData};

#[derive(Parser)]
#[command(name = "clima-precompute")]
#[command(about = "Precompute pairwise correlation and regression statistics", version)]
struct Cli {
    /// Engine configuration (JSON); defaults apply when absent
    #[arg(long, global = true, env = "CLIMA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute statistics for every dimension pair
    Compute {
        /// Scatter data: {"months": [...], "dimension_scores": [...]}
        input: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Dimension to rank engagement drivers against
        #[arg(short, long)]
        target: Option<String>,
        /// Points per prediction band (overrides the config file)
        #[arg(long)]
        grid_size: Option<usize>,
    },
    /// Check every record of a precomputed document
    Verify {
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the document
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compute { input, output, target, grid_size } => {
            let mut config = config;
            if let Some(grid_size) = grid_size {
                config.band_grid_size = grid_size;
            }
            run_compute(&input, output.as_deref(), target.as_deref(), config)
        }
        Commands::Verify { document } => run_verify(&document),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded engine config");
    Ok(config)
}

fn run_compute(
    input: &Path,
    output: Option<&Path>,
    target: Option<&str>,
    config: EngineConfig,
) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading input {}", input.display()))?;
    let data: ScatterData = serde_json::from_str(&text)
        .with_context(|| format!("parsing input {}", input.display()))?;

    let engine = StatisticsEngine::new(config);
    let document = build_document(&data, &engine, target, chrono::Utc::now())?;

    let json = serde_json::to_string_pretty(&document).context("serializing document")?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), pairs = document.pairs.len(), "document written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn run_verify(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading document {}", path.display()))?;
    let document: PrecomputedDocument = serde_json::from_str(&text)
        .with_context(|| format!("parsing document {}", path.display()))?;

    let problems = verify_document(&document);
    for problem in &problems {
        tracing::error!(
            dim1 = %problem.dim1,
            dim2 = %problem.dim2,
            code = problem.error.code(),
            "{}",
            problem.error
        );
    }
    if !problems.is_empty() {
        bail!("{} of {} records failed verification", problems.len(), document.pairs.len());
    }

    tracing::info!(pairs = document.pairs.len(), generated_at = %document.generated_at, "document verified");
    Ok(())
}
