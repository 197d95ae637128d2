//! One log record per tick.
//!
//! Field order matches [`RECORD_HEADER`]. `Display` renders the
//! comma-delimited row; absent values are empty fields. The same struct
//! serializes to a JSON object for line-delimited output.

use crate::fusion::FusionState;
use guard_common::consts::RECORD_HEADER;
use guard_common::types::{CabinetId, LineZone, SafetyState, ZoneStatus};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp_s: f64,
    pub safety_state: SafetyState,
    pub line_zone: LineZone,
    pub zone_status: ZoneStatus,
    pub cabinet: Option<CabinetId>,
    pub output_enabled: bool,
    pub has_motion: bool,
    pub distance_m: Option<f64>,
    pub foot_x: Option<f64>,
    pub foot_y: Option<f64>,
    pub stale: bool,
}

impl LogRecord {
    pub const HEADER: &'static str = RECORD_HEADER;
}

impl From<&FusionState> for LogRecord {
    fn from(s: &FusionState) -> Self {
        Self {
            timestamp_s: s.timestamp_s,
            safety_state: s.safety_state,
            line_zone: s.line_zone,
            zone_status: s.zone_decision.status,
            cabinet: s.zone_decision.cabinet_index,
            output_enabled: s.output_enabled,
            has_motion: s.has_motion,
            distance_m: s.zone_decision.distance_m,
            foot_x: s.foot.map(|f| f.0),
            foot_y: s.foot.map(|f| f.1),
            stale: s.is_stale(),
        }
    }
}

struct Opt<T>(Option<T>, usize);

impl fmt::Display for Opt<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.prec$}", prec = self.1),
            None => Ok(()),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cabinet = self.cabinet.map(|c| c.to_string()).unwrap_or_default();
        write!(
            f,
            "{:.3},{},{},{},{},{},{},{},{},{},{}",
            self.timestamp_s,
            self.safety_state,
            self.line_zone,
            self.zone_status,
            cabinet,
            self.output_enabled,
            self.has_motion,
            Opt(self.distance_m, 3),
            Opt(self.foot_x, 1),
            Opt(self.foot_y, 1),
            self.stale,
        )
    }
}
