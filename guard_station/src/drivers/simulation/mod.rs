//! Simulation driver module.
//!
//! Scripted range and vision adapters for development and testing without
//! a sensor or camera attached.

mod range;
mod scenario;
mod vision;

pub use range::SimulatedRange;
pub use scenario::{FootReading, Scenario, Segment};
pub use vision::SimulatedVision;

use crate::clock::MonotonicClock;
use guard_common::config::ConfigError;
use std::path::Path;
use std::sync::Arc;

/// Load `path` and build both adapters on the shared `clock`.
pub fn from_scenario_file(
    path: &Path,
    clock: MonotonicClock,
) -> Result<(SimulatedRange, SimulatedVision), ConfigError> {
    let scenario = Arc::new(Scenario::load_validated(path)?);
    tracing::info!(
        path = %path.display(),
        segments = scenario.segments.len(),
        duration_s = scenario.duration_s(),
        "scenario loaded"
    );
    Ok((
        SimulatedRange::new(Arc::clone(&scenario), clock),
        SimulatedVision::new(scenario, clock),
    ))
}
