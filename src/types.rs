//! Core mission types shared across the pipeline.
//!
//! The central type is [`FlowControlMission`], the persisted unit of output.
//! Missions are only built through the validating constructor
//! [`FlowControlMission::new`], which reports every violation category it
//! finds rather than stopping at the first.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Testbed playback and plausibility limits.
pub mod testbed_limits {
    /// Lowest peak flow treated as a real event, l/min. Anything quieter is
    /// sensor noise, not consumption.
    pub const MIN_PEAK_FLOW_LPM: f64 = 0.1;
    /// Highest flow the testbed rig can deliver, l/min.
    pub const MAX_PEAK_FLOW_LPM: f64 = 20.0;
    /// Playback window every mission must fit inside, seconds.
    pub const PLAYBACK_WINDOW_SECS: f64 = 60.0;
    /// Divisor used when computing the duration scaling factor. Sits just
    /// above the playback window so an event of exactly 60 s (or an exact
    /// multiple) still lands strictly below it after compression.
    pub const SCALING_DIVISOR_SECS: f64 = 60.1;
    /// Seconds per minute, for volume-per-sample -> volume-per-minute
    /// conversion.
    pub const SECS_PER_MINUTE: f64 = 60.0;
}

// ============================================================================
// Fixtures
// ============================================================================

/// A water-consuming end use tracked as its own column in the house series.
///
/// The declaration order is load-bearing: a fixture's valve address on the
/// testbed is its position in this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fixture {
    Toilet,
    Faucet,
    ClothesWasher,
    Dishwasher,
    Shower,
    Bathtub,
}

impl Fixture {
    /// All fixtures, in valve-id order.
    pub const ALL: [Self; 6] = [
        Self::Toilet,
        Self::Faucet,
        Self::ClothesWasher,
        Self::Dishwasher,
        Self::Shower,
        Self::Bathtub,
    ];

    /// Integer valve address on the testbed.
    pub const fn valve_id(self) -> i32 {
        self as i32
    }

    /// Column header / traceability tag for this fixture.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Toilet => "Toilet",
            Self::Faucet => "Faucet",
            Self::ClothesWasher => "ClothesWasher",
            Self::Dishwasher => "Dishwasher",
            Self::Shower => "Shower",
            Self::Bathtub => "Bathtub",
        }
    }
}

// ============================================================================
// Trajectory
// ============================================================================

/// One control point of a flow trajectory: ramp/hold flow to `flow_rate`
/// (l/min) by elapsed time `time` (seconds since mission start).
///
/// Serializes as a positional 2-element array `[time, flow_rate]`, which is
/// what the testbed's mission reader expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct TrajectoryPoint {
    pub time: f64,
    pub flow_rate: f64,
}

impl From<(f64, f64)> for TrajectoryPoint {
    fn from((time, flow_rate): (f64, f64)) -> Self {
        Self { time, flow_rate }
    }
}

impl From<TrajectoryPoint> for (f64, f64) {
    fn from(point: TrajectoryPoint) -> Self {
        (point.time, point.flow_rate)
    }
}

// ============================================================================
// Missions
// ============================================================================

/// A single violation category found while validating a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionViolation {
    /// The flow trajectory has no points.
    EmptyTrajectory,
    /// A trajectory point carries a negative time (first offending index).
    NegativeTime { index: usize },
    /// A trajectory point carries a negative flow rate (first offending index).
    NegativeFlowRate { index: usize },
    /// Trajectory times are not strictly ascending (index of the offending
    /// point; equal consecutive times count as a violation).
    NonAscendingTime { index: usize },
    /// Valve id below the reserved `-1` sentinel.
    ValveIdOutOfRange { valve_id: i32 },
    /// Duration scaling factor of zero (must be >= 1 when present).
    ZeroScalingFactor,
}

impl std::fmt::Display for MissionViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTrajectory => write!(f, "flow trajectory must not be empty"),
            Self::NegativeTime { index } => {
                write!(f, "negative time at trajectory point {index}")
            }
            Self::NegativeFlowRate { index } => {
                write!(f, "negative flow rate at trajectory point {index}")
            }
            Self::NonAscendingTime { index } => write!(
                f,
                "trajectory times must be strictly ascending (violated at point {index})"
            ),
            Self::ValveIdOutOfRange { valve_id } => {
                write!(f, "valve id {valve_id} is below the reserved -1 sentinel")
            }
            Self::ZeroScalingFactor => {
                write!(f, "duration scaling factor must be at least 1")
            }
        }
    }
}

/// Error type for mission construction.
///
/// Carries the full set of violation categories found, so a caller (or test)
/// can assert on each independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionError {
    violations: Vec<MissionViolation>,
}

impl MissionError {
    /// All violations found during validation, in field order.
    pub fn violations(&self) -> &[MissionViolation] {
        &self.violations
    }

    /// Whether a given violation category was recorded.
    pub fn has(&self, violation: MissionViolation) -> bool {
        self.violations.contains(&violation)
    }
}

impl std::fmt::Display for MissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mission validation failed: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MissionError {}

/// A flow control mission: one valve, one time-scaled flow trajectory,
/// plus traceability details about the originating consumption event.
///
/// Field order matches the mission file layout consumed by the testbed.
/// Optional fields serialize as explicit `null` when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowControlMission {
    /// Valve address to steer; `-1` is a reserved/unused sentinel.
    pub valve_id: i32,
    /// Non-empty trajectory, strictly ascending in time.
    pub flow_trajectory: Vec<TrajectoryPoint>,
    /// Originating fixture, for traceability.
    pub actual_end_use: Option<Fixture>,
    /// How much the real-world duration was compressed (1 = unscaled).
    pub duration_scaling_factor: Option<u32>,
    /// Wall-clock time of day the real event began.
    pub actual_start_time: Option<NaiveTime>,
}

impl FlowControlMission {
    /// Validating constructor. Returns the mission only if every invariant
    /// holds; otherwise returns the complete set of violations.
    pub fn new(
        valve_id: i32,
        flow_trajectory: Vec<TrajectoryPoint>,
        actual_end_use: Option<Fixture>,
        duration_scaling_factor: Option<u32>,
        actual_start_time: Option<NaiveTime>,
    ) -> Result<Self, MissionError> {
        let mission = Self {
            valve_id,
            flow_trajectory,
            actual_end_use,
            duration_scaling_factor,
            actual_start_time,
        };
        mission.validate()?;
        Ok(mission)
    }

    /// Check every mission invariant, collecting all violated categories.
    pub fn validate(&self) -> Result<(), MissionError> {
        let mut violations = Vec::new();

        if self.valve_id < -1 {
            violations.push(MissionViolation::ValveIdOutOfRange {
                valve_id: self.valve_id,
            });
        }

        if self.duration_scaling_factor == Some(0) {
            violations.push(MissionViolation::ZeroScalingFactor);
        }

        if self.flow_trajectory.is_empty() {
            violations.push(MissionViolation::EmptyTrajectory);
        } else {
            if let Some(index) = self.flow_trajectory.iter().position(|p| p.time < 0.0) {
                violations.push(MissionViolation::NegativeTime { index });
            }
            if let Some(index) = self.flow_trajectory.iter().position(|p| p.flow_rate < 0.0) {
                violations.push(MissionViolation::NegativeFlowRate { index });
            }
            if let Some(index) = self
                .flow_trajectory
                .windows(2)
                .position(|pair| pair[1].time <= pair[0].time)
            {
                violations.push(MissionViolation::NonAscendingTime { index: index + 1 });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(MissionError { violations })
        }
    }
}
