//! Scripted scenario for the simulation adapters.
//!
//! A scenario is a list of segments played back to back. Within a segment
//! the distance and foot x move linearly from their start value to the
//! optional `*_to` value; uniform noise is added on top.
//!
//! # TOML Example
//!
//! ```toml
//! seed = 7
//!
//! [[segments]]
//! duration_s = 3.0
//! distance_m = 3.5
//! foot_x = 700.0
//! foot_y = 600.0
//! pose = "facing_cabinet"
//! ```

use guard_common::config::{ConfigError, ConfigLoader};
use guard_common::types::{Gesture, Pose};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One stretch of scripted behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Segment {
    /// Length of the segment [s].
    pub duration_s: f64,
    /// Distance at the start of the segment [m].
    pub distance_m: f64,
    /// Distance at the end of the segment [m]; constant when absent.
    #[serde(default)]
    pub distance_to_m: Option<f64>,
    /// Half-width of the uniform distance noise [m].
    #[serde(default)]
    pub distance_noise_m: f64,
    /// Confidence reported with every range sample.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Foot x at the start of the segment [px].
    pub foot_x: f64,
    /// Foot x at the end of the segment [px]; constant when absent.
    #[serde(default)]
    pub foot_x_to: Option<f64>,
    /// Foot y [px].
    pub foot_y: f64,
    /// Half-width of the uniform foot noise [px].
    #[serde(default)]
    pub foot_noise_px: f64,
    /// Reported pose.
    #[serde(default)]
    pub pose: Pose,
    /// Reported gesture.
    #[serde(default)]
    pub gesture: Gesture,
    /// Range sensor disconnected for the whole segment.
    #[serde(default)]
    pub range_dropout: bool,
    /// No person detected for the whole segment.
    #[serde(default)]
    pub vision_dropout: bool,
}

fn default_confidence() -> f64 {
    1.0
}

fn default_range_rate() -> f64 {
    20.0
}

fn default_vision_rate() -> f64 {
    10.0
}

/// Vision output at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootReading {
    /// Foot x [px].
    pub foot_x: f64,
    /// Foot y [px].
    pub foot_y: f64,
    /// Reported pose.
    pub pose: Pose,
    /// Reported gesture.
    pub gesture: Gesture,
}

/// Playback script shared by the simulated range and vision adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Noise generator seed; identical seeds replay identically.
    #[serde(default)]
    pub seed: u64,
    /// Range sample rate [Hz].
    #[serde(default = "default_range_rate")]
    pub range_rate_hz: f64,
    /// Vision frame rate [Hz].
    #[serde(default = "default_vision_rate")]
    pub vision_rate_hz: f64,
    /// Segments in playback order.
    pub segments: Vec<Segment>,
}

impl Scenario {
    /// Load and validate a scenario file.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let scenario = Self::load(path)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse and validate a scenario document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let scenario: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check rates, durations and noise amplitudes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));
        if self.segments.is_empty() {
            return invalid("scenario has no segments".to_string());
        }
        for (name, rate) in [
            ("range_rate_hz", self.range_rate_hz),
            ("vision_rate_hz", self.vision_rate_hz),
        ] {
            if !(rate.is_finite() && rate > 0.0) {
                return invalid(format!("{name} must be positive, got {rate}"));
            }
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if !(seg.duration_s.is_finite() && seg.duration_s > 0.0) {
                return invalid(format!("segment {i}: duration_s must be positive"));
            }
            if !(seg.distance_noise_m >= 0.0 && seg.foot_noise_px >= 0.0) {
                return invalid(format!("segment {i}: noise must be non-negative"));
            }
        }
        Ok(())
    }

    /// Total playback length [s].
    pub fn duration_s(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_s).sum()
    }

    /// Segment active at `t` and the fraction of it already elapsed.
    pub fn segment_at(&self, t: f64) -> Option<(&Segment, f64)> {
        if !(t >= 0.0) {
            return None;
        }
        let mut start = 0.0;
        for seg in &self.segments {
            if t < start + seg.duration_s {
                return Some((seg, (t - start) / seg.duration_s));
            }
            start += seg.duration_s;
        }
        None
    }

    /// Simulated distance and confidence at `t`; `None` past the end or
    /// during a range dropout.
    pub fn range_at<R: Rng>(&self, t: f64, rng: &mut R) -> Option<(f64, f64)> {
        let (seg, frac) = self.segment_at(t)?;
        if seg.range_dropout {
            return None;
        }
        let base = lerp(seg.distance_m, seg.distance_to_m, frac);
        let noise = rng.gen_range(-seg.distance_noise_m..=seg.distance_noise_m);
        Some(((base + noise).max(0.0), seg.confidence))
    }

    /// Simulated foot reading at `t`; `None` past the end or during a
    /// vision dropout.
    pub fn vision_at<R: Rng>(&self, t: f64, rng: &mut R) -> Option<FootReading> {
        let (seg, frac) = self.segment_at(t)?;
        if seg.vision_dropout {
            return None;
        }
        let n = seg.foot_noise_px;
        Some(FootReading {
            foot_x: lerp(seg.foot_x, seg.foot_x_to, frac) + rng.gen_range(-n..=n),
            foot_y: seg.foot_y + rng.gen_range(-n..=n),
            pose: seg.pose,
            gesture: seg.gesture,
        })
    }

    /// True while `t` falls in a segment with the range sensor unplugged.
    pub fn range_dropout_at(&self, t: f64) -> bool {
        self.segment_at(t).is_some_and(|(seg, _)| seg.range_dropout)
    }
}

#[inline]
fn lerp(from: f64, to: Option<f64>, frac: f64) -> f64 {
    to.map_or(from, |to| from + (to - from) * frac)
}
