//! Per-file pipeline and batch driver.
//!
//! For each house file: load the series, extract events per fixture, convert
//! volumes to flow rates, filter by peak, compress onto the playback window,
//! assemble missions, re-order by original occurrence row, write JSON.
//! Files are independent, so the batch driver fans out across them with
//! rayon; no coordination is needed between files.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::assembler::assemble_mission;
use crate::config::BenchConfig;
use crate::extraction::extract_events;
use crate::filter::{FilterSummary, PeakFlowFilter};
use crate::scaler::scale_trajectory;
use crate::series::{HouseSeries, SeriesError};
use crate::types::testbed_limits::SECS_PER_MINUTE;
use crate::types::{Fixture, FlowControlMission, MissionError};
use crate::writer::{mission_output_path, write_missions, WriterError};

/// Source file naming convention used for batch discovery.
const HOUSE_FILE_PREFIX: &str = "House_";
const HOUSE_FILE_EXTENSION: &str = ".csv";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("{fixture} event at rows {start}..{end}: {source}")]
    Assembly {
        fixture: &'static str,
        start: usize,
        end: usize,
        #[source]
        source: MissionError,
    },

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error("failed to scan directory {path}: {source}")]
    Discovery {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What one successfully processed file produced.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub missions_written: usize,
    pub filter: FilterSummary,
    pub unterminated_runs: usize,
}

/// Process one house file end to end. On success the mission file exists
/// beside the source; on any error nothing has been written.
pub fn process_file(path: &Path, config: &BenchConfig) -> Result<FileReport, PipelineError> {
    let series = HouseSeries::load(path)?;
    let missions = build_missions(&series, config)?;

    let output = mission_output_path(path);
    write_missions(&output, &missions.collection)?;

    let report = FileReport {
        source: path.to_path_buf(),
        output,
        rows: series.len(),
        missions_written: missions.collection.len(),
        filter: missions.filter,
        unterminated_runs: missions.unterminated_runs,
    };

    info!(
        source = %report.source.display(),
        output = %report.output.display(),
        rows = report.rows,
        missions = report.missions_written,
        rejected_low = report.filter.below_floor,
        rejected_high = report.filter.above_ceiling,
        unterminated = report.unterminated_runs,
        "house file converted"
    );

    Ok(report)
}

/// The assembled, ordered mission collection plus filtering counters.
struct BuiltMissions {
    collection: Vec<FlowControlMission>,
    filter: FilterSummary,
    unterminated_runs: usize,
}

/// Pure core of the per-file pipeline: series in, ordered missions out.
fn build_missions(
    series: &HouseSeries,
    config: &BenchConfig,
) -> Result<BuiltMissions, PipelineError> {
    let interval = config.sampling.interval_secs;
    // l per sample row -> l per minute.
    let rate_factor = SECS_PER_MINUTE / interval;
    let filter = PeakFlowFilter::new(&config.testbed);

    let mut indexed: Vec<(usize, FlowControlMission)> = Vec::new();
    let mut summary = FilterSummary::default();
    let mut unterminated_runs = 0;

    for fixture in Fixture::ALL {
        let flows = series.flows(fixture);
        let extraction = extract_events(flows);
        unterminated_runs += extraction.unterminated_runs;

        for span in extraction.spans {
            let rates_lpm: Vec<f64> = flows[span.start..span.end]
                .iter()
                .map(|volume| volume * rate_factor)
                .collect();

            match filter.check(&rates_lpm) {
                Ok(()) => {
                    let scaled = scale_trajectory(&rates_lpm, interval);
                    let start_time = series.start_time(span.start);
                    if start_time.is_none() {
                        warn!(
                            fixture = fixture.tag(),
                            row = span.start,
                            ts = series.timestamp(span.start).unwrap_or(""),
                            "unparseable event start timestamp, omitting from mission"
                        );
                    }

                    let mission = assemble_mission(fixture, scaled, start_time).map_err(
                        |source| PipelineError::Assembly {
                            fixture: fixture.tag(),
                            start: span.start,
                            end: span.end,
                            source,
                        },
                    )?;

                    summary.accepted += 1;
                    indexed.push((span.start, mission));
                }
                Err(reason) => summary.record_rejection(reason),
            }
        }
    }

    // Chronological order of the underlying events across all fixtures, not
    // fixture enumeration order. Stable sort keeps valve order for ties.
    indexed.sort_by_key(|(start, _)| *start);
    let collection = indexed.into_iter().map(|(_, mission)| mission).collect();

    Ok(BuiltMissions {
        collection,
        filter: summary,
        unterminated_runs,
    })
}

// ============================================================================
// Batch driver
// ============================================================================

/// Find all `House_*.csv` files directly inside `dir`, sorted by name.
pub fn discover_house_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PipelineError::Discovery {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::Discovery {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(HOUSE_FILE_PREFIX) && name.ends_with(HOUSE_FILE_EXTENSION) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Process every discovered house file independently, in parallel.
///
/// One file's failure never blocks the others; each result is returned with
/// its source path so the caller can report failures separately.
pub fn process_directory(
    dir: &Path,
    config: &BenchConfig,
) -> Result<Vec<(PathBuf, Result<FileReport, PipelineError>)>, PipelineError> {
    let files = discover_house_files(dir)?;
    info!(dir = %dir.display(), files = files.len(), "discovered house files");

    let results = files
        .into_par_iter()
        .map(|path| {
            let result = process_file(&path, config);
            (path, result)
        })
        .collect();

    Ok(results)
}
