//! Flowbench batch converter.
//!
//! Discovers `House_*.csv` consumption files in a directory and writes one
//! `<base>_mission.json` testbed mission file beside each source.
//!
//! # Usage
//!
//! ```bash
//! flowbench data/houses
//! flowbench data/houses --config bench.toml
//! RUST_LOG=debug flowbench data/houses
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use flowbench::config::BenchConfig;
use flowbench::pipeline;

#[derive(Parser, Debug)]
#[command(name = "flowbench")]
#[command(about = "Convert house water-consumption series into flow-testbed missions")]
#[command(version)]
struct CliArgs {
    /// Directory containing House_*.csv consumption files.
    dir: PathBuf,

    /// Path to a TOML config overriding sampling interval and testbed limits.
    #[arg(long, env = "FLOWBENCH_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => BenchConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BenchConfig::load().context("loading config")?,
    };

    let results = pipeline::process_directory(&args.dir, &config)
        .with_context(|| format!("processing {}", args.dir.display()))?;

    if results.is_empty() {
        info!(dir = %args.dir.display(), "no House_*.csv files found");
        return Ok(());
    }

    let mut failed = 0usize;
    let mut missions_total = 0usize;
    for (path, result) in &results {
        match result {
            Ok(report) => missions_total += report.missions_written,
            Err(e) => {
                failed += 1;
                error!(file = %path.display(), error = %e, "house file failed");
            }
        }
    }

    info!(
        files = results.len(),
        failed,
        missions = missions_total,
        "batch conversion finished"
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {} house files failed", results.len());
    }
    Ok(())
}
