//! Sample validation errors.
//!
//! A rejected sample never reaches tracker history; the fusion engine
//! reports it through `FusionState::fault` and fails safe for that tick.

use guard_common::types::{RangeSample, VisionSample};
use thiserror::Error;

/// Malformed sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleError {
    #[error("invalid sample: negative distance {0} m")]
    NegativeDistance(f64),

    #[error("invalid sample: non-finite distance")]
    NonFiniteDistance,

    #[error("invalid sample: confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("invalid sample: non-finite timestamp")]
    NonFiniteTimestamp,

    #[error("invalid sample: non-finite foot position")]
    NonFiniteFoot,

    #[error("invalid sample: foot ({x}, {y}) outside {width}x{height} frame")]
    FootOutOfFrame {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl SampleError {
    /// Check a range reading for physically meaningless values.
    pub fn check_range(sample: &RangeSample) -> Result<(), Self> {
        if !sample.timestamp_s.is_finite() {
            return Err(Self::NonFiniteTimestamp);
        }
        if !sample.distance_m.is_finite() {
            return Err(Self::NonFiniteDistance);
        }
        if sample.distance_m < 0.0 {
            return Err(Self::NegativeDistance(sample.distance_m));
        }
        // NaN fails the range check too
        if !(0.0..=1.0).contains(&sample.confidence) {
            return Err(Self::ConfidenceOutOfRange(sample.confidence));
        }
        Ok(())
    }

    /// Check a vision reading against the camera frame `[0, width] x [0, height]`.
    pub fn check_vision(sample: &VisionSample, width: f64, height: f64) -> Result<(), Self> {
        if !sample.timestamp_s.is_finite() {
            return Err(Self::NonFiniteTimestamp);
        }
        let (x, y) = (sample.foot_x, sample.foot_y);
        if !x.is_finite() || !y.is_finite() {
            return Err(Self::NonFiniteFoot);
        }
        if !(0.0..=width).contains(&x) || !(0.0..=height).contains(&y) {
            return Err(Self::FootOutOfFrame {
                x,
                y,
                width,
                height,
            });
        }
        Ok(())
    }
}
