//! Sample, zone and state types shared by the decision core and the station.
//!
//! Every status, zone and state is a closed enum so the transition tables in
//! `guard_core` are checked exhaustively. The `as_str()` names are the stable
//! spellings used in log records and reasons.

use serde::{Deserialize, Serialize};

// ─── Cabinets ───────────────────────────────────────────────────────

/// Cabinet identifier, as printed on the site plan.
pub type CabinetId = u32;

/// Distance interval in front of a single cabinet.
///
/// Both ends are inclusive. Intervals within one configuration never touch
/// or overlap (checked by `config::validate_cabinet_zones`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CabinetZone {
    /// Cabinet identifier.
    pub cabinet_id: CabinetId,
    /// Lower bound [m].
    pub d_min_m: f64,
    /// Upper bound [m].
    pub d_max_m: f64,
    /// Optional human-readable label.
    #[serde(default)]
    pub name: Option<String>,
}

impl CabinetZone {
    pub fn new(cabinet_id: CabinetId, d_min_m: f64, d_max_m: f64) -> Self {
        Self {
            cabinet_id,
            d_min_m,
            d_max_m,
            name: None,
        }
    }

    #[inline]
    pub fn contains(&self, distance_m: f64) -> bool {
        self.d_min_m <= distance_m && distance_m <= self.d_max_m
    }
}

// ─── Samples ────────────────────────────────────────────────────────

/// One reading from the range sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSample {
    /// Measured distance [m].
    pub distance_m: f64,
    /// Sensor confidence in `[0, 1]`.
    pub confidence: f64,
    /// Acquisition time [s], monotonic clock.
    pub timestamp_s: f64,
}

impl RangeSample {
    pub const fn new(distance_m: f64, confidence: f64, timestamp_s: f64) -> Self {
        Self {
            distance_m,
            confidence,
            timestamp_s,
        }
    }
}

/// Body orientation reported by the vision model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    #[default]
    Unknown,
    FacingCabinet,
    FacingCamera,
    TurnedAway,
    Sideways,
}

/// Gesture code reported by the vision model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    #[default]
    None,
    /// The operator showed the authorization gesture.
    Authorized,
    Other,
}

/// One reading from the vision pipeline: the closest foot keypoint plus pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionSample {
    /// Foot position, image x [px].
    pub foot_x: f64,
    /// Foot position, image y [px].
    pub foot_y: f64,
    pub pose: Pose,
    pub gesture: Gesture,
    /// Frame time [s], same clock as the range sensor.
    pub timestamp_s: f64,
}

// ─── Zone tracker status ────────────────────────────────────────────

/// Combined motion/cabinet status derived from the distance history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneStatus {
    /// Not enough evidence yet (startup, settling).
    #[default]
    Idle,
    /// Distance varies more than the movement threshold.
    Walking,
    /// Standing still at an authorized cabinet.
    StableAuth,
    /// Standing still at a cabinet outside the allow-list.
    StableUnauth,
    /// Distance outside every configured cabinet interval.
    OutOfRange,
}

impl ZoneStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Walking => "WALKING",
            Self::StableAuth => "STABLE_AUTH",
            Self::StableUnauth => "STABLE_UNAUTH",
            Self::OutOfRange => "OUT_OF_RANGE",
        }
    }
}

impl std::fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Line geometry ──────────────────────────────────────────────────

/// Position of the foot relative to the painted safety line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineZone {
    OutsideSafe,
    OnLine,
    InsideDanger,
}

impl LineZone {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutsideSafe => "OUTSIDE_SAFE",
            Self::OnLine => "ON_LINE",
            Self::InsideDanger => "INSIDE_DANGER",
        }
    }
}

impl std::fmt::Display for LineZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calibrated safety line `a·x + b·y + c = 0` in image coordinates.
///
/// `a² + b² > 0` is required. Points with a positive signed distance lie on
/// the safe side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineModel {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LineModel {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Length of the normal vector `(a, b)`.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.a.hypot(self.b)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.norm() > 0.0) || !self.c.is_finite()
    }
}

/// Band limits along the line normal [px]; `outer_safe_px > inner_danger_px`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineZoneThresholds {
    pub outer_safe_px: f64,
    pub inner_danger_px: f64,
}

// ─── Safety verdict ─────────────────────────────────────────────────

/// Debounced safety verdict reported every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyState {
    SafeStable,
    /// Unknown or crossing; the initial state.
    #[default]
    Transition,
    DangerStable,
}

impl SafetyState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SafeStable => "SAFE_STABLE",
            Self::Transition => "TRANSITION",
            Self::DangerStable => "DANGER_STABLE",
        }
    }
}

impl std::fmt::Display for SafetyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a foot standing on the line band is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnLinePolicy {
    /// Stepping on the line is still safe.
    #[default]
    Permissive,
    /// Stepping on the line disables the output.
    Strict,
}

/// Progress of the authorization gesture at the current cabinet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    #[default]
    Idle,
    WaitGesture,
    Ready,
    ViolationNoGesture,
}

impl ActionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::WaitGesture => "WAIT_GESTURE",
            Self::Ready => "READY",
            Self::ViolationNoGesture => "VIOLATION_NO_GESTURE",
        }
    }
}

/// Signal lamp colour shown next to the cabinet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lamp {
    Green,
    Yellow,
    Red,
}

impl Lamp {
    /// The buzzer sounds only together with the red lamp.
    #[inline]
    pub const fn buzzer_on(&self) -> bool {
        matches!(self, Self::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cabinet_zone_bounds_are_inclusive() {
        let zone = CabinetZone::new(1, 1.8, 2.2);
        assert!(zone.contains(1.8));
        assert!(zone.contains(2.2));
        assert!(!zone.contains(2.2000001));
        assert!(!zone.contains(f64::NAN));
    }

    #[test]
    fn degenerate_line_detected() {
        assert!(LineModel::new(0.0, 0.0, 10.0).is_degenerate());
        assert!(LineModel::new(f64::NAN, 1.0, 0.0).is_degenerate());
        assert!(!LineModel::new(1.0, 0.0, -500.0).is_degenerate());
    }

    #[test]
    fn initial_safety_state_is_transition() {
        assert_eq!(SafetyState::default(), SafetyState::Transition);
    }

    #[test]
    fn stable_names() {
        assert_eq!(ZoneStatus::StableUnauth.as_str(), "STABLE_UNAUTH");
        assert_eq!(LineZone::InsideDanger.to_string(), "INSIDE_DANGER");
        assert_eq!(SafetyState::DangerStable.to_string(), "DANGER_STABLE");
    }

    #[test]
    fn pose_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            pose: Pose,
            gesture: Gesture,
        }
        let w: Wrapper =
            toml::from_str("pose = \"facing_cabinet\"\ngesture = \"authorized\"").unwrap();
        assert_eq!(w.pose, Pose::FacingCabinet);
        assert_eq!(w.gesture, Gesture::Authorized);
    }

    #[test]
    fn only_red_lamp_sounds_buzzer() {
        assert!(Lamp::Red.buzzer_on());
        assert!(!Lamp::Yellow.buzzer_on());
        assert!(!Lamp::Green.buzzer_on());
    }
}
