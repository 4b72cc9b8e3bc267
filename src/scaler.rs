//! Trajectory time compression.
//!
//! Long consumption events are compressed onto the testbed's bounded playback
//! window by shrinking the time axis with an integer scaling factor. Sample
//! count and flow-rate shape are never altered, only the spacing of points.

use crate::types::testbed_limits::SCALING_DIVISOR_SECS;
use crate::types::TrajectoryPoint;

/// A time-compressed trajectory plus the factor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledTrajectory {
    pub points: Vec<TrajectoryPoint>,
    pub factor: u32,
}

/// Integer compression factor for an event of `sample_count` samples at
/// `interval_secs` spacing.
///
/// `floor(real_duration / 60.1) + 1`. The divisor is kept at 60.1 rather than
/// 60.0 to avoid an off-by-one at exact multiples: a real duration of exactly
/// 60 s (or 120 s, 180 s, ...) compresses onto the window boundary instead of
/// being split one factor higher.
pub fn scaling_factor(sample_count: usize, interval_secs: f64) -> u32 {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let factor = (sample_count as f64 * interval_secs / SCALING_DIVISOR_SECS) as u32 + 1;
    factor
}

/// Compress an event's flow rates (l/min) into a playback trajectory.
///
/// Point `i` (0-based) lands at `(i + 1) * interval / factor` with the
/// sample's flow rate unchanged. Point count always equals the input sample
/// count.
pub fn scale_trajectory(rates_lpm: &[f64], interval_secs: f64) -> ScaledTrajectory {
    let factor = scaling_factor(rates_lpm.len(), interval_secs);
    let step = interval_secs / f64::from(factor);

    #[allow(clippy::cast_precision_loss)]
    let points = rates_lpm
        .iter()
        .enumerate()
        .map(|(i, &flow_rate)| TrajectoryPoint {
            time: (i + 1) as f64 * step,
            flow_rate,
        })
        .collect();

    ScaledTrajectory { points, factor }
}
