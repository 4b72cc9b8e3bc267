//! Mission assembly.
//!
//! Packages a filtered, time-scaled event into a validated
//! [`FlowControlMission`]. Inputs are pre-filtered, so validation failure
//! here means a defect upstream in extraction or scaling; it propagates as a
//! hard error instead of being dropped like a filtering rejection.

use chrono::NaiveTime;

use crate::scaler::ScaledTrajectory;
use crate::types::{Fixture, FlowControlMission, MissionError};

/// Build the mission record for one accepted event.
pub fn assemble_mission(
    fixture: Fixture,
    scaled: ScaledTrajectory,
    start_time: Option<NaiveTime>,
) -> Result<FlowControlMission, MissionError> {
    FlowControlMission::new(
        fixture.valve_id(),
        scaled.points,
        Some(fixture),
        Some(scaled.factor),
        start_time,
    )
}
