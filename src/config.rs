//! Bench configuration.
//!
//! Sampling and testbed limits loaded from TOML, replacing hardcoded
//! thresholds with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `FLOWBENCH_CONFIG` environment variable (path to TOML file)
//! 2. `flowbench.toml` in the current working directory
//! 3. Built-in defaults (matching the reference dataset and rig)
//!
//! The playback window and scaling divisor are deliberate policy constants
//! (`types::testbed_limits`), not configuration.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::types::testbed_limits;

/// Built-in defaults, matching the reference dataset and rig limits.
pub mod defaults {
    /// Sampling interval of the reference dataset (seconds).
    pub const SAMPLE_INTERVAL_SECS: f64 = 10.0;
}

/// Configuration errors are fatal at startup; there is no sensible fallback
/// once the operator has pointed at an explicit file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sampling parameters of the input series.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Fixed spacing between consecutive rows, seconds.
    pub interval_secs: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::SAMPLE_INTERVAL_SECS,
        }
    }
}

/// Plausible peak-flow range the testbed can reproduce.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TestbedConfig {
    /// Events peaking below this are treated as noise, l/min.
    pub min_peak_flow_lpm: f64,
    /// Events peaking above this exceed the rig's deliverable flow, l/min.
    pub max_peak_flow_lpm: f64,
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            min_peak_flow_lpm: testbed_limits::MIN_PEAK_FLOW_LPM,
            max_peak_flow_lpm: testbed_limits::MAX_PEAK_FLOW_LPM,
        }
    }
}

/// Top-level bench configuration, passed by reference into the pipeline.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub sampling: SamplingConfig,
    pub testbed: TestbedConfig,
}

impl BenchConfig {
    /// Load configuration using the documented resolution order. Falls back
    /// to defaults when no file is present; a file that exists but fails to
    /// read or parse is an error, not a silent fallback.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("FLOWBENCH_CONFIG") {
            tracing::info!(path = %path, "loading config from FLOWBENCH_CONFIG");
            return Self::from_file(Path::new(&path));
        }

        let local = Path::new("flowbench.toml");
        if local.exists() {
            tracing::info!(path = %local.display(), "loading config from working directory");
            return Self::from_file(local);
        }

        tracing::debug!("no config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load and validate a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sampling.interval_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sampling.interval_secs must be positive, got {}",
                self.sampling.interval_secs
            )));
        }
        if self.testbed.min_peak_flow_lpm < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "testbed.min_peak_flow_lpm must be non-negative, got {}",
                self.testbed.min_peak_flow_lpm
            )));
        }
        if self.testbed.max_peak_flow_lpm < self.testbed.min_peak_flow_lpm {
            return Err(ConfigError::Invalid(format!(
                "testbed.max_peak_flow_lpm ({}) is below min_peak_flow_lpm ({})",
                self.testbed.max_peak_flow_lpm, self.testbed.min_peak_flow_lpm
            )));
        }
        Ok(())
    }
}
