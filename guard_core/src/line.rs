//! Foot position → line zone.
//!
//! The signed distance to `a·x + b·y + c = 0` is positive on the safe side.
//! `≥ outer_safe_px` is OUTSIDE_SAFE, `≤ inner_danger_px` is INSIDE_DANGER,
//! anything strictly between is ON_LINE.

use crate::error::SampleError;
use guard_common::config::{ConfigError, LineConfig};
use guard_common::types::{LineModel, LineZone, LineZoneThresholds, VisionSample};
use serde::Serialize;

/// Signed perpendicular distance [px] from `(x, y)` to the line.
#[inline]
pub fn signed_distance(x: f64, y: f64, line: &LineModel) -> f64 {
    (line.a * x + line.b * y + line.c) / line.norm()
}

/// Classify a foot position. Pure; `line` must not be degenerate.
pub fn classify(
    x: f64,
    y: f64,
    line: &LineModel,
    thresholds: &LineZoneThresholds,
) -> (f64, LineZone) {
    let d = signed_distance(x, y, line);
    let zone = if d >= thresholds.outer_safe_px {
        LineZone::OutsideSafe
    } else if d <= thresholds.inner_danger_px {
        LineZone::InsideDanger
    } else {
        LineZone::OnLine
    };
    (d, zone)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineReading {
    pub signed_distance_px: f64,
    pub zone: LineZone,
}

/// Holds the calibrated line, its band and the frame bounds.
#[derive(Debug, Clone)]
pub struct LineZoneClassifier {
    line: LineModel,
    thresholds: LineZoneThresholds,
    frame_width_px: f64,
    frame_height_px: f64,
}

impl LineZoneClassifier {
    pub fn new(config: &LineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            line: config.model(),
            thresholds: config.thresholds(),
            frame_width_px: config.frame_width_px,
            frame_height_px: config.frame_height_px,
        })
    }

    #[inline]
    pub fn classify(&self, x: f64, y: f64) -> LineReading {
        let (signed_distance_px, zone) = classify(x, y, &self.line, &self.thresholds);
        LineReading {
            signed_distance_px,
            zone,
        }
    }

    /// Reject frames whose foot lies outside the camera image.
    pub fn validate(&self, sample: &VisionSample) -> Result<(), SampleError> {
        SampleError::check_vision(sample, self.frame_width_px, self.frame_height_px)
    }
}
