//! Simulated vision pipeline.

use super::scenario::Scenario;
use crate::clock::MonotonicClock;
use guard_common::sensor::VisionAdapter;
use guard_common::types::VisionSample;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

/// Vision adapter playing back a [`Scenario`] at its frame rate.
#[derive(Debug)]
pub struct SimulatedVision {
    scenario: Arc<Scenario>,
    clock: MonotonicClock,
    rng: StdRng,
    period: Duration,
}

impl SimulatedVision {
    /// Create an adapter sharing `clock` with the sampling loop.
    pub fn new(scenario: Arc<Scenario>, clock: MonotonicClock) -> Self {
        let period = Duration::from_secs_f64(1.0 / scenario.vision_rate_hz);
        // distinct stream from the range adapter
        let rng = StdRng::seed_from_u64(scenario.seed ^ 0x5eed_0f_f00d);
        Self {
            scenario,
            clock,
            rng,
            period,
        }
    }
}

impl VisionAdapter for SimulatedVision {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn read(&mut self) -> Option<VisionSample> {
        std::thread::sleep(self.period);
        let t = self.clock.now_s();
        let foot = self.scenario.vision_at(t, &mut self.rng)?;
        Some(VisionSample {
            foot_x: foot.foot_x,
            foot_y: foot.foot_y,
            pose: foot.pose,
            gesture: foot.gesture,
            timestamp_s: t,
        })
    }
}
