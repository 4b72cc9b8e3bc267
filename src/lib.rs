//! Flowbench: water-consumption events to flow-testbed missions.
//!
//! Converts per-house consumption time series (fixed-interval samples per
//! fixture) into discrete missions: time-scaled flow-rate trajectories a
//! physical flow-control testbed can play back.
//!
//! ## Pipeline
//!
//! - **Series adapter**: loads one house CSV (`TS` + one column per fixture)
//! - **Extraction**: finds contiguous positive-flow runs per fixture
//! - **Filter**: drops events whose peak flow the testbed cannot reproduce
//! - **Scaler**: compresses long events onto the 60 s playback window
//! - **Assembler**: packages each event into a validated mission
//! - **Writer**: serializes the ordered collection to `<base>_mission.json`

pub mod assembler;
pub mod config;
pub mod extraction;
pub mod filter;
pub mod pipeline;
pub mod scaler;
pub mod series;
pub mod types;
pub mod writer;

// Re-export the mission model
pub use types::{Fixture, FlowControlMission, MissionError, MissionViolation, TrajectoryPoint};

// Re-export configuration
pub use config::{BenchConfig, ConfigError};

// Re-export the per-file and batch entry points
pub use pipeline::{discover_house_files, process_directory, process_file, FileReport, PipelineError};
