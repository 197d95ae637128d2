//! Per-tick fusion of range and vision into one output decision.
//!
//! Order within a tick: zone tracker → line zone → gesture → safety machine
//! → fail-safe overrides. A missing or rejected sample never enables the
//! output; the last known zone decision and line zone are reported instead,
//! with `IDLE` / `ON_LINE` placeholders before anything was observed.

use crate::error::SampleError;
use crate::gesture::GestureTracker;
use crate::line::{LineReading, LineZoneClassifier};
use crate::record::LogRecord;
use crate::safety::{SafetyInput, SafetyStateMachine};
use crate::tracker::{ZoneDecision, ZoneTracker};
use guard_common::config::{ConfigError, GuardConfig};
use guard_common::sensor::{RangeAdapter, VisionAdapter};
use guard_common::types::{
    ActionStatus, Lamp, LineZone, RangeSample, SafetyState, VisionSample, ZoneStatus,
};
use serde::Serialize;

/// Why a tick could not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum InputFault {
    /// One or both inputs delivered nothing this tick.
    Stale { range: bool, vision: bool },
    /// A sample failed validation and was discarded.
    Rejected(#[serde(serialize_with = "serialize_display")] SampleError),
}

fn serialize_display<S: serde::Serializer>(e: &SampleError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(e)
}

/// Everything decided in one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionState {
    pub zone_decision: ZoneDecision,
    pub line_zone: LineZone,
    /// Signed distance of the last accepted foot position [px].
    pub signed_distance_px: Option<f64>,
    /// Last accepted foot position [px].
    pub foot: Option<(f64, f64)>,
    pub has_motion: bool,
    pub safety_state: SafetyState,
    pub previous_state: SafetyState,
    pub output_enabled: bool,
    pub reason: String,
    pub timestamp_s: f64,
    pub action: ActionStatus,
    pub fault: Option<InputFault>,
}

impl FusionState {
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.fault.is_some()
    }

    #[inline]
    pub fn state_changed(&self) -> bool {
        self.safety_state != self.previous_state
    }

    /// Signal lamp for this tick.
    pub fn lamp(&self) -> Lamp {
        if self.output_enabled {
            Lamp::Green
        } else if self.safety_state == SafetyState::DangerStable
            || self.zone_decision.status == ZoneStatus::StableUnauth
            || self.fault.is_some()
        {
            Lamp::Red
        } else {
            Lamp::Yellow
        }
    }

    pub fn record(&self) -> LogRecord {
        LogRecord::from(self)
    }
}

/// Owns every stateful component and runs them once per tick.
#[derive(Debug)]
pub struct FusionEngine {
    tracker: ZoneTracker,
    line: LineZoneClassifier,
    safety: SafetyStateMachine,
    gesture: GestureTracker,
    require_gesture: bool,
    last_zone: ZoneDecision,
    last_line: Option<LineReading>,
    last_foot: Option<(f64, f64)>,
    last_timestamp_s: f64,
    faulted: bool,
    ticks: u64,
}

impl FusionEngine {
    pub fn new(config: &GuardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            tracker: ZoneTracker::from_config(config)?,
            line: LineZoneClassifier::new(&config.line)?,
            safety: SafetyStateMachine::new(config.policy.on_line_policy),
            gesture: GestureTracker::new(config.policy.gesture_max_wait_ticks),
            require_gesture: config.policy.require_gesture,
            last_zone: ZoneDecision::no_data(),
            last_line: None,
            last_foot: None,
            last_timestamp_s: 0.0,
            faulted: false,
            ticks: 0,
        })
    }

    /// Run one tick. `None` means the input delivered nothing in time.
    pub fn tick(
        &mut self,
        range: Option<RangeSample>,
        vision: Option<VisionSample>,
    ) -> FusionState {
        self.ticks += 1;
        let mut rejected: Option<SampleError> = None;

        let timestamp_s = [range.map(|r| r.timestamp_s), vision.map(|v| v.timestamp_s)]
            .into_iter()
            .flatten()
            .filter(|t| t.is_finite())
            .fold(self.last_timestamp_s, f64::max);
        self.last_timestamp_s = timestamp_s;

        if let Some(sample) = range {
            match self.tracker.update(&sample) {
                Ok(decision) => self.last_zone = decision,
                Err(e) => rejected = Some(e),
            }
        }

        let mut accepted_vision = None;
        if let Some(sample) = vision {
            match self.line.validate(&sample) {
                Ok(()) => {
                    self.last_line = Some(self.line.classify(sample.foot_x, sample.foot_y));
                    self.last_foot = Some((sample.foot_x, sample.foot_y));
                    accepted_vision = Some(sample);
                }
                Err(e) => rejected = rejected.or(Some(e)),
            }
        }

        let fault = match rejected {
            Some(e) => Some(InputFault::Rejected(e)),
            None if range.is_none() || vision.is_none() => Some(InputFault::Stale {
                range: range.is_none(),
                vision: vision.is_none(),
            }),
            None => None,
        };

        let zone = self.last_zone.clone();
        let at_authorized = zone.status == ZoneStatus::StableAuth;
        let has_motion = zone.status == ZoneStatus::Walking;
        let line_zone = self.last_line.map_or(LineZone::OnLine, |r| r.zone);
        let action = self.gesture.update(accepted_vision.as_ref(), at_authorized);

        let verdict = self.safety.evaluate(SafetyInput {
            line_zone,
            is_authorized_cabinet: at_authorized,
            has_motion,
        });

        let (output_enabled, reason) = match fault {
            Some(InputFault::Rejected(e)) => (false, format!("rejected input: {e}")),
            Some(InputFault::Stale { .. }) => (false, "stale input".to_string()),
            None if verdict.output_enabled
                && self.require_gesture
                && action != ActionStatus::Ready =>
            {
                (false, "authorization gesture missing".to_string())
            }
            None => (verdict.output_enabled, verdict.reason),
        };

        self.log_fault_edge(fault);

        let state = FusionState {
            zone_decision: zone,
            line_zone,
            signed_distance_px: self.last_line.map(|r| r.signed_distance_px),
            foot: self.last_foot,
            has_motion,
            safety_state: verdict.state,
            previous_state: verdict.previous,
            output_enabled,
            reason,
            timestamp_s,
            action,
            fault,
        };

        tracing::debug!(
            t = state.timestamp_s,
            state = %state.safety_state,
            line = %state.line_zone,
            zone = %state.zone_decision.status,
            output = state.output_enabled,
            reason = %state.reason,
            "tick"
        );
        state
    }

    /// Read each adapter once and tick.
    ///
    /// The range adapter is read on every call; its sample is dropped unless
    /// `status()` reports `READY` after the read.
    pub fn poll(
        &mut self,
        range: &mut dyn RangeAdapter,
        vision: &mut dyn VisionAdapter,
    ) -> FusionState {
        let r = range.read().filter(|_| range.status().is_ready());
        let v = vision.read();
        self.tick(r, v)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn safety_state(&self) -> SafetyState {
        self.safety.state()
    }

    fn log_fault_edge(&mut self, fault: Option<InputFault>) {
        match (self.faulted, fault) {
            (false, Some(InputFault::Stale { range, vision })) => {
                tracing::warn!(range, vision, "input stale, output disabled");
            }
            (false, Some(InputFault::Rejected(e))) => {
                tracing::warn!(error = %e, "input rejected, output disabled");
            }
            (true, None) => tracing::info!("inputs recovered"),
            _ => {}
        }
        self.faulted = fault.is_some();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guard_common::sensor::{AdapterError, AdapterStatus};
    use guard_common::types::{Gesture, Pose};

    const CONFIG: &str = r#"
[shared]
service_name = "fusion-test"

[line]
a = 1.0
b = 0.0
c = -500.0
outer_safe_px = 20.0
inner_danger_px = -10.0
frame_width_px = 1280.0
frame_height_px = 720.0

[site]
authorized_cabinets = [2]

[[cabinets]]
cabinet_id = 1
d_min_m = 1.8
d_max_m = 2.2

[[cabinets]]
cabinet_id = 2
d_min_m = 3.3
d_max_m = 3.7
"#;

    fn engine(extra: &str) -> FusionEngine {
        let config = GuardConfig::from_toml_str(&format!("{CONFIG}{extra}")).unwrap();
        FusionEngine::new(&config).unwrap()
    }

    fn vision(x: f64, t: f64, pose: Pose, gesture: Gesture) -> VisionSample {
        VisionSample {
            foot_x: x,
            foot_y: 600.0,
            pose,
            gesture,
            timestamp_s: t,
        }
    }

    fn settle(e: &mut FusionEngine, d: f64, x: f64) -> FusionState {
        let mut last = None;
        for i in 0..30 {
            let t = i as f64 * 0.1;
            last = Some(e.tick(
                Some(RangeSample::new(d, 1.0, t)),
                Some(vision(x, t, Pose::FacingCabinet, Gesture::None)),
            ));
        }
        last.unwrap()
    }

    #[test]
    fn placeholders_before_any_data() {
        let mut e = engine("");
        let s = e.tick(None, None);
        assert_eq!(s.zone_decision.status, ZoneStatus::Idle);
        assert_eq!(s.line_zone, LineZone::OnLine);
        assert_eq!(s.safety_state, SafetyState::Transition);
        assert!(!s.output_enabled);
        assert_eq!(s.reason, "stale input");
        assert_eq!(
            s.fault,
            Some(InputFault::Stale {
                range: true,
                vision: true
            })
        );
        assert_eq!(s.lamp(), Lamp::Red);
    }

    #[test]
    fn authorized_and_outside_enables_output() {
        let mut e = engine("");
        let s = settle(&mut e, 3.5, 700.0);
        assert_eq!(s.zone_decision.status, ZoneStatus::StableAuth);
        assert_eq!(s.safety_state, SafetyState::SafeStable);
        assert!(s.output_enabled);
        assert_eq!(s.lamp(), Lamp::Green);
        assert!(s.fault.is_none());
        assert_eq!(s.record().cabinet, Some(2));
    }

    #[test]
    fn unauthorized_cabinet_is_red() {
        let mut e = engine("");
        let s = settle(&mut e, 2.0, 700.0);
        assert_eq!(s.zone_decision.status, ZoneStatus::StableUnauth);
        assert!(!s.output_enabled);
        assert_eq!(s.lamp(), Lamp::Red);
    }

    #[test]
    fn missing_vision_reuses_last_line_zone() {
        let mut e = engine("");
        settle(&mut e, 3.5, 700.0);
        let s = e.tick(Some(RangeSample::new(3.5, 1.0, 3.0)), None);
        assert_eq!(s.line_zone, LineZone::OutsideSafe);
        assert_eq!(s.foot, Some((700.0, 600.0)));
        assert!(!s.output_enabled);
        assert!(s.is_stale());
        assert_eq!(s.reason, "stale input");
    }

    #[test]
    fn rejected_sample_fails_safe_and_names_reason() {
        let mut e = engine("");
        settle(&mut e, 3.5, 700.0);
        let s = e.tick(
            Some(RangeSample::new(-2.0, 1.0, 3.0)),
            Some(vision(700.0, 3.0, Pose::FacingCabinet, Gesture::None)),
        );
        assert!(!s.output_enabled);
        assert!(matches!(
            s.fault,
            Some(InputFault::Rejected(SampleError::NegativeDistance(_)))
        ));
        assert!(s.reason.starts_with("rejected input: invalid sample"));
        // the rejected distance never reached the tracker
        assert_eq!(s.zone_decision.status, ZoneStatus::StableAuth);
    }

    #[test]
    fn foot_outside_frame_is_rejected() {
        let mut e = engine("");
        settle(&mut e, 3.5, 700.0);
        let s = e.tick(
            Some(RangeSample::new(3.5, 1.0, 3.0)),
            Some(vision(5000.0, 3.0, Pose::FacingCabinet, Gesture::None)),
        );
        assert!(matches!(
            s.fault,
            Some(InputFault::Rejected(SampleError::FootOutOfFrame { .. }))
        ));
        assert_eq!(s.foot, Some((700.0, 600.0)));
    }

    #[test]
    fn walking_reports_motion() {
        let mut e = engine("");
        let mut s = None;
        for i in 0..10 {
            let t = i as f64 * 0.2;
            let d = if i % 2 == 0 { 1.0 } else { 3.0 };
            s = Some(e.tick(
                Some(RangeSample::new(d, 1.0, t)),
                Some(vision(700.0, t, Pose::Sideways, Gesture::None)),
            ));
        }
        let s = s.unwrap();
        assert!(s.has_motion);
        assert!(!s.output_enabled);
        assert!(s.reason.contains("motion"));
    }

    #[test]
    fn gesture_gate_holds_output_until_ready() {
        let mut e = engine("\n[policy]\nrequire_gesture = true\n");
        let s = settle(&mut e, 3.5, 700.0);
        assert!(!s.output_enabled);
        assert_eq!(s.reason, "authorization gesture missing");

        let s = e.tick(
            Some(RangeSample::new(3.5, 1.0, 3.0)),
            Some(vision(700.0, 3.0, Pose::FacingCabinet, Gesture::Authorized)),
        );
        assert_eq!(s.action, ActionStatus::Ready);
        assert!(s.output_enabled);
    }

    struct FixedRange {
        status: AdapterStatus,
        t: f64,
    }

    impl RangeAdapter for FixedRange {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn read(&mut self) -> Option<RangeSample> {
            self.t += 0.1;
            Some(RangeSample::new(3.5, 1.0, self.t))
        }
        fn status(&self) -> AdapterStatus {
            self.status
        }
        fn max_range_m(&self) -> f64 {
            10.0
        }
        fn close(&mut self) -> Result<(), AdapterError> {
            self.status = AdapterStatus::Stopped;
            Ok(())
        }
    }

    struct FixedVision {
        t: f64,
    }

    impl VisionAdapter for FixedVision {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn read(&mut self) -> Option<VisionSample> {
            self.t += 0.1;
            Some(vision(700.0, self.t, Pose::FacingCabinet, Gesture::None))
        }
    }

    #[test]
    fn poll_skips_range_adapter_that_is_not_ready() {
        let mut e = engine("");
        let mut range = FixedRange {
            status: AdapterStatus::Ready,
            t: 0.0,
        };
        let mut cam = FixedVision { t: 0.0 };
        let mut s = e.poll(&mut range, &mut cam);
        for _ in 0..30 {
            s = e.poll(&mut range, &mut cam);
        }
        assert!(s.output_enabled);
        assert_eq!(e.ticks(), 31);

        range.status = AdapterStatus::Disconnected;
        let s = e.poll(&mut range, &mut cam);
        assert!(!s.output_enabled);
        assert_eq!(
            s.fault,
            Some(InputFault::Stale {
                range: true,
                vision: false
            })
        );
    }

    #[test]
    fn state_change_flag_follows_safety_machine() {
        let mut e = engine("");
        let s = settle(&mut e, 3.5, 700.0);
        assert!(!s.state_changed());
        let s = e.tick(
            Some(RangeSample::new(3.5, 1.0, 3.0)),
            Some(vision(480.0, 3.0, Pose::FacingCabinet, Gesture::None)),
        );
        assert!(s.state_changed());
        assert_eq!(s.previous_state, SafetyState::SafeStable);
        assert_eq!(s.safety_state, SafetyState::DangerStable);
        assert_eq!(s.lamp(), Lamp::Red);
        assert!(s.lamp().buzzer_on());
    }
}
