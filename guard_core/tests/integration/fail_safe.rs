//! Integration test: fail-safe behaviour under missing and malformed input.
//!
//! Properties checked over arbitrary sample streams:
//! - a tick with a missing or rejected sample never enables the output
//! - a foot inside the danger band always yields DANGER_STABLE, output off
//! - the output is never enabled away from an authorized, stable cabinet

use guard_common::types::{
    Gesture, LineZone, Pose, RangeSample, SafetyState, VisionSample, ZoneStatus,
};
use guard_core::error::SampleError;
use guard_core::fusion::{FusionEngine, InputFault};
use proptest::prelude::*;

use super::site_config;

#[derive(Debug, Clone)]
struct Step {
    distance_m: Option<f64>,
    foot_x: Option<f64>,
}

fn step() -> impl Strategy<Value = Step> {
    (
        prop::option::weighted(0.8, -1.0f64..6.0),
        prop::option::weighted(0.8, 0.0f64..1280.0),
    )
        .prop_map(|(distance_m, foot_x)| Step { distance_m, foot_x })
}

fn vision(x: f64, t: f64) -> VisionSample {
    VisionSample {
        foot_x: x,
        foot_y: 500.0,
        pose: Pose::FacingCabinet,
        gesture: Gesture::Authorized,
        timestamp_s: t,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn faulted_ticks_never_enable_output(steps in prop::collection::vec(step(), 1..200)) {
        let mut engine = FusionEngine::new(&site_config()).unwrap();
        for (i, s) in steps.iter().enumerate() {
            let t = i as f64 * 0.1;
            let state = engine.tick(
                s.distance_m.map(|d| RangeSample::new(d, 1.0, t)),
                s.foot_x.map(|x| vision(x, t)),
            );

            if state.fault.is_some() {
                prop_assert!(!state.output_enabled);
            }
            if state.line_zone == LineZone::InsideDanger {
                prop_assert_eq!(state.safety_state, SafetyState::DangerStable);
                prop_assert!(!state.output_enabled);
            }
            if state.output_enabled {
                prop_assert_eq!(state.zone_decision.status, ZoneStatus::StableAuth);
                prop_assert!(state.fault.is_none());
            }
        }
    }
}

#[test]
fn silence_after_good_data_disables_output() {
    let mut engine = FusionEngine::new(&site_config()).unwrap();
    for i in 0..30 {
        let t = f64::from(i) * 0.1;
        engine.tick(Some(RangeSample::new(3.5, 1.0, t)), Some(vision(700.0, t)));
    }

    let state = engine.tick(None, None);
    assert!(!state.output_enabled);
    assert_eq!(state.reason, "stale input");
    // last known values are still reported
    assert_eq!(state.zone_decision.status, ZoneStatus::StableAuth);
    assert_eq!(state.line_zone, LineZone::OutsideSafe);
    assert_eq!(
        state.fault,
        Some(InputFault::Stale {
            range: true,
            vision: true
        })
    );

    // recovers on the next complete tick
    let state = engine.tick(Some(RangeSample::new(3.5, 1.0, 3.0)), Some(vision(700.0, 3.0)));
    assert!(state.output_enabled);
}

#[test]
fn low_confidence_outside_unit_range_is_rejected() {
    let mut engine = FusionEngine::new(&site_config()).unwrap();
    let state = engine.tick(
        Some(RangeSample::new(3.5, 1.2, 0.0)),
        Some(vision(700.0, 0.0)),
    );
    assert_eq!(
        state.fault,
        Some(InputFault::Rejected(SampleError::ConfidenceOutOfRange(1.2)))
    );
    assert!(!state.output_enabled);
    assert_eq!(state.zone_decision.status, ZoneStatus::Idle);
}

#[test]
fn strict_policy_disables_output_on_line() {
    let mut config = site_config();
    config.policy.on_line_policy = guard_common::types::OnLinePolicy::Strict;
    let mut engine = FusionEngine::new(&config).unwrap();
    let mut last = None;
    for i in 0..30 {
        let t = f64::from(i) * 0.1;
        last = Some(engine.tick(Some(RangeSample::new(3.5, 1.0, t)), Some(vision(505.0, t))));
    }
    let state = last.unwrap();
    assert_eq!(state.line_zone, LineZone::OnLine);
    assert_eq!(state.safety_state, SafetyState::Transition);
    assert!(!state.output_enabled);
}
