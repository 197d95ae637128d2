//! Integration test: operator at an authorized cabinet steps over the line.
//!
//! 1. Stand still at cabinet 2 (3.5 m) with the foot well outside (x = 700)
//! 2. Verdict settles at SAFE_STABLE with the output enabled
//! 3. Foot moves to x = 480 → DANGER_STABLE and output off on that same tick

use guard_common::types::{
    Gesture, LineZone, Pose, RangeSample, SafetyState, VisionSample, ZoneStatus,
};
use guard_core::fusion::{FusionEngine, FusionState};

use super::site_config;

// ── Helpers ─────────────────────────────────────────────────────────

fn foot(x: f64, t: f64) -> VisionSample {
    VisionSample {
        foot_x: x,
        foot_y: 620.0,
        pose: Pose::FacingCabinet,
        gesture: Gesture::None,
        timestamp_s: t,
    }
}

fn run(engine: &mut FusionEngine, ticks: std::ops::Range<u32>, d: f64, x: f64) -> Vec<FusionState> {
    ticks
        .map(|i| {
            let t = f64::from(i) * 0.1;
            engine.tick(Some(RangeSample::new(d, 0.95, t)), Some(foot(x, t)))
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn crossing_line_at_authorized_cabinet_cuts_output_same_tick() {
    let mut engine = FusionEngine::new(&site_config()).unwrap();

    let outside = run(&mut engine, 0..30, 3.5, 700.0);
    let settled = outside.last().unwrap();
    assert_eq!(settled.zone_decision.status, ZoneStatus::StableAuth);
    assert_eq!(settled.line_zone, LineZone::OutsideSafe);
    assert_eq!(settled.safety_state, SafetyState::SafeStable);
    assert!(settled.output_enabled);

    let crossed = run(&mut engine, 30..31, 3.5, 480.0).remove(0);
    assert_eq!(crossed.line_zone, LineZone::InsideDanger);
    assert_eq!(crossed.previous_state, SafetyState::SafeStable);
    assert_eq!(crossed.safety_state, SafetyState::DangerStable);
    assert!(!crossed.output_enabled);
    assert!(crossed.reason.contains("zone=INSIDE_DANGER"));
}

#[test]
fn output_only_once_stable_and_outside() {
    let mut engine = FusionEngine::new(&site_config()).unwrap();
    let states = run(&mut engine, 0..30, 3.5, 700.0);

    // first tick: a single sample cannot be stable
    assert_eq!(states[0].zone_decision.status, ZoneStatus::Idle);
    assert!(!states[0].output_enabled);

    let first_enabled = states.iter().position(|s| s.output_enabled).unwrap();
    assert!(states[first_enabled..].iter().all(|s| s.output_enabled));
    assert!(
        states[first_enabled..]
            .iter()
            .all(|s| s.zone_decision.status == ZoneStatus::StableAuth)
    );
}

#[test]
fn stepping_back_out_restores_output() {
    let mut engine = FusionEngine::new(&site_config()).unwrap();
    run(&mut engine, 0..30, 3.5, 700.0);
    run(&mut engine, 30..35, 3.5, 480.0);

    let on_line = run(&mut engine, 35..36, 3.5, 505.0).remove(0);
    assert_eq!(on_line.line_zone, LineZone::OnLine);
    assert_eq!(on_line.safety_state, SafetyState::Transition);
    // permissive default: on the line is still safe
    assert!(on_line.output_enabled);

    let out = run(&mut engine, 36..37, 3.5, 700.0).remove(0);
    assert_eq!(out.safety_state, SafetyState::SafeStable);
    assert!(out.output_enabled);
}

#[test]
fn walking_to_unauthorized_cabinet_never_enables_output() {
    let mut engine = FusionEngine::new(&site_config()).unwrap();
    let walk: Vec<_> = (0..20)
        .map(|i| {
            let t = f64::from(i) * 0.1;
            let d = 3.5 - f64::from(i) * 0.08;
            engine.tick(Some(RangeSample::new(d, 0.9, t)), Some(foot(700.0, t)))
        })
        .collect();
    assert!(walk.iter().any(|s| s.has_motion));

    let parked = run(&mut engine, 20..60, 2.0, 700.0);
    let last = parked.last().unwrap();
    assert_eq!(last.zone_decision.status, ZoneStatus::StableUnauth);
    assert!(
        walk.iter()
            .chain(parked.iter())
            .filter(|s| s.zone_decision.status != ZoneStatus::StableAuth)
            .all(|s| !s.output_enabled)
    );
}

#[test]
fn records_follow_header_layout() {
    let mut engine = FusionEngine::new(&site_config()).unwrap();
    let state = run(&mut engine, 0..30, 3.5, 700.0).pop().unwrap();
    let row = state.record().to_string();
    let fields: Vec<_> = row.split(',').collect();
    assert_eq!(fields.len(), 11);
    assert_eq!(fields[1], "SAFE_STABLE");
    assert_eq!(fields[2], "OUTSIDE_SAFE");
    assert_eq!(fields[3], "STABLE_AUTH");
    assert_eq!(fields[4], "2");
    assert_eq!(fields[5], "true");
    assert_eq!(fields[10], "false");
}
