//! Simulated range sensor.

use super::scenario::Scenario;
use crate::clock::MonotonicClock;
use guard_common::sensor::{AdapterError, AdapterStatus, RangeAdapter};
use guard_common::types::RangeSample;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

/// Range adapter playing back a [`Scenario`] in real time.
///
/// `read()` paces itself to the scenario's range rate. Dropout segments
/// report `Disconnected`; the end of the scenario reports `Stopped`.
#[derive(Debug)]
pub struct SimulatedRange {
    scenario: Arc<Scenario>,
    clock: MonotonicClock,
    rng: StdRng,
    period: Duration,
    status: AdapterStatus,
    max_range_m: f64,
}

impl SimulatedRange {
    /// Maximum distance reported by the simulated device [m].
    pub const MAX_RANGE_M: f64 = 12.0;

    /// Create an adapter sharing `clock` with the sampling loop.
    pub fn new(scenario: Arc<Scenario>, clock: MonotonicClock) -> Self {
        let period = Duration::from_secs_f64(1.0 / scenario.range_rate_hz);
        let rng = StdRng::seed_from_u64(scenario.seed);
        Self {
            scenario,
            clock,
            rng,
            period,
            status: AdapterStatus::Initializing,
            max_range_m: Self::MAX_RANGE_M,
        }
    }
}

impl RangeAdapter for SimulatedRange {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn read(&mut self) -> Option<RangeSample> {
        if self.status == AdapterStatus::Stopped {
            return None;
        }
        std::thread::sleep(self.period);

        let t = self.clock.now_s();
        if t >= self.scenario.duration_s() {
            self.status = AdapterStatus::Stopped;
            return None;
        }
        match self.scenario.range_at(t, &mut self.rng) {
            Some((d, confidence)) => {
                self.status = AdapterStatus::Ready;
                Some(RangeSample::new(d.min(self.max_range_m), confidence, t))
            }
            None => {
                if self.scenario.range_dropout_at(t) {
                    self.status = AdapterStatus::Disconnected;
                }
                None
            }
        }
    }

    fn status(&self) -> AdapterStatus {
        self.status
    }

    fn max_range_m(&self) -> f64 {
        self.max_range_m
    }

    fn close(&mut self) -> Result<(), AdapterError> {
        self.status = AdapterStatus::Stopped;
        Ok(())
    }
}
