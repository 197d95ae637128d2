//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across the cabinet guard crates, plus the validated [`GuardConfig`] bundle
//! consumed by the decision core.
//!
//! # Usage
//!
//! ```rust,no_run
//! use guard_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct MyAppConfig {
//!     shared: SharedConfig,
//!     port: u16,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = MyAppConfig::load(Path::new("config.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::*;
use crate::types::{CabinetId, CabinetZone, LineModel, LineZoneThresholds, OnLinePolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading operations.
///
/// This enum represents all possible errors that can occur when loading
/// configuration files.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string accepted by `tracing_subscriber::EnvFilter`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across the guard binaries.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "guard-bay-03"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// A default implementation works with any type implementing
/// `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation: any serde-deserializable struct can be loaded.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Section types ──────────────────────────────────────────────────

/// Sliding-window parameters of the zone tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Spread above which the person counts as walking [m].
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold_m: f64,
    /// Spread at or below which the person counts as standing still [m].
    #[serde(default = "default_static_threshold")]
    pub static_threshold_m: f64,
    /// Window used for the standing-still check [s].
    #[serde(default = "default_static_window")]
    pub static_window_s: f64,
    /// Window used for the walking check [s].
    #[serde(default = "default_walk_window")]
    pub walk_window_s: f64,
}

fn default_movement_threshold() -> f64 {
    MOVEMENT_THRESHOLD_M_DEFAULT
}
fn default_static_threshold() -> f64 {
    STATIC_THRESHOLD_M_DEFAULT
}
fn default_static_window() -> f64 {
    STATIC_WINDOW_S_DEFAULT
}
fn default_walk_window() -> f64 {
    WALK_WINDOW_S_DEFAULT
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            movement_threshold_m: MOVEMENT_THRESHOLD_M_DEFAULT,
            static_threshold_m: STATIC_THRESHOLD_M_DEFAULT,
            static_window_s: STATIC_WINDOW_S_DEFAULT,
            walk_window_s: WALK_WINDOW_S_DEFAULT,
        }
    }
}

impl TrackerConfig {
    /// Longest of the two windows; the history horizon.
    #[inline]
    pub fn max_window_s(&self) -> f64 {
        self.static_window_s.max(self.walk_window_s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tracker.movement_threshold_m", self.movement_threshold_m)?;
        positive("tracker.static_threshold_m", self.static_threshold_m)?;
        for (name, window) in [
            ("tracker.static_window_s", self.static_window_s),
            ("tracker.walk_window_s", self.walk_window_s),
        ] {
            positive(name, window)?;
            if window > WINDOW_S_MAX {
                return Err(ConfigError::ValidationError(format!(
                    "{name} {window} exceeds maximum {WINDOW_S_MAX}"
                )));
            }
        }
        Ok(())
    }
}

/// Calibrated safety line and its band, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Signed distance at or above which the foot is safely outside [px].
    pub outer_safe_px: f64,
    /// Signed distance at or below which the foot is inside the danger area [px].
    pub inner_danger_px: f64,
    /// Camera frame width; foot coordinates must lie in `[0, width]`.
    pub frame_width_px: f64,
    /// Camera frame height; foot coordinates must lie in `[0, height]`.
    pub frame_height_px: f64,
}

impl LineConfig {
    #[inline]
    pub fn model(&self) -> LineModel {
        LineModel::new(self.a, self.b, self.c)
    }

    #[inline]
    pub fn thresholds(&self) -> LineZoneThresholds {
        LineZoneThresholds {
            outer_safe_px: self.outer_safe_px,
            inner_danger_px: self.inner_danger_px,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model().is_degenerate() {
            return Err(ConfigError::ValidationError(format!(
                "degenerate line a={} b={} c={}",
                self.a, self.b, self.c
            )));
        }
        if !self.outer_safe_px.is_finite() || !self.inner_danger_px.is_finite() {
            return Err(ConfigError::ValidationError(
                "line thresholds must be finite".to_string(),
            ));
        }
        if self.outer_safe_px <= self.inner_danger_px {
            return Err(ConfigError::ValidationError(format!(
                "outer_safe_px {} must be greater than inner_danger_px {}",
                self.outer_safe_px, self.inner_danger_px
            )));
        }
        positive("line.frame_width_px", self.frame_width_px)?;
        positive("line.frame_height_px", self.frame_height_px)?;
        Ok(())
    }
}

/// Output policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default)]
    pub on_line_policy: OnLinePolicy,
    /// Gate the output on the authorization gesture.
    #[serde(default)]
    pub require_gesture: bool,
    /// Ticks facing the cabinet without the gesture before it is a violation.
    #[serde(default = "default_gesture_wait")]
    pub gesture_max_wait_ticks: u32,
}

fn default_gesture_wait() -> u32 {
    GESTURE_MAX_WAIT_TICKS_DEFAULT
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            on_line_policy: OnLinePolicy::default(),
            require_gesture: false,
            gesture_max_wait_ticks: GESTURE_MAX_WAIT_TICKS_DEFAULT,
        }
    }
}

/// Format of the per-tick record file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    /// Comma-delimited with a fixed header line.
    #[default]
    Csv,
    /// One JSON object per line.
    JsonLines,
}

/// Sampling loop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Age after which the last handed-off sample counts as missing [s].
    #[serde(default = "default_stale_timeout")]
    pub stale_timeout_s: f64,
    /// Per-tick record file; none when absent.
    #[serde(default)]
    pub record_path: Option<PathBuf>,
    #[serde(default)]
    pub record_format: RecordFormat,
}

fn default_tick_interval() -> u64 {
    TICK_INTERVAL_MS_DEFAULT
}
fn default_stale_timeout() -> f64 {
    STALE_TIMEOUT_S_DEFAULT
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS_DEFAULT,
            stale_timeout_s: STALE_TIMEOUT_S_DEFAULT,
            record_path: None,
            record_format: RecordFormat::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms < TICK_INTERVAL_MS_MIN
            || self.tick_interval_ms > TICK_INTERVAL_MS_MAX
        {
            return Err(ConfigError::ValidationError(format!(
                "tick_interval_ms {} out of range [{}, {}]",
                self.tick_interval_ms, TICK_INTERVAL_MS_MIN, TICK_INTERVAL_MS_MAX
            )));
        }
        positive("runtime.stale_timeout_s", self.stale_timeout_s)
    }
}

/// Site-specific allow-list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default)]
    pub authorized_cabinets: BTreeSet<CabinetId>,
}

// ─── GuardConfig ────────────────────────────────────────────────────

/// Complete, validated configuration of one guard station.
///
/// Loaded once at startup and passed by reference into every constructor.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "guard-bay-03"
///
/// [line]
/// a = 1.0
/// b = 0.0
/// c = -500.0
/// outer_safe_px = 50.0
/// inner_danger_px = -50.0
/// frame_width_px = 1280.0
/// frame_height_px = 720.0
///
/// [site]
/// authorized_cabinets = [2]
///
/// [[cabinets]]
/// cabinet_id = 1
/// d_min_m = 1.8
/// d_max_m = 2.2
///
/// [[cabinets]]
/// cabinet_id = 2
/// d_min_m = 3.3
/// d_max_m = 3.7
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    pub line: LineConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub cabinets: Vec<CabinetZone>,
}

impl GuardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` and validate.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            service = %config.shared.service_name,
            cabinets = config.cabinets.len(),
            authorized = config.site.authorized_cabinets.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.tracker.validate()?;
        self.line.validate()?;
        self.runtime.validate()?;
        validate_cabinet_zones(&self.cabinets)?;
        validate_authorized_set(&self.site.authorized_cabinets, &self.cabinets)?;
        Ok(())
    }
}

// ─── Validation helpers ─────────────────────────────────────────────

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

/// Check a cabinet interval table.
///
/// Bounds must be finite with `0 <= d_min_m < d_max_m`, ids unique, and no
/// two closed intervals may share a point.
pub fn validate_cabinet_zones(zones: &[CabinetZone]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for zone in zones {
        if !zone.d_min_m.is_finite() || !zone.d_max_m.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "cabinet {} has non-finite bounds",
                zone.cabinet_id
            )));
        }
        if zone.d_min_m < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "cabinet {} d_min_m {} is negative",
                zone.cabinet_id, zone.d_min_m
            )));
        }
        if zone.d_min_m >= zone.d_max_m {
            return Err(ConfigError::ValidationError(format!(
                "cabinet {} d_min_m {} must be less than d_max_m {}",
                zone.cabinet_id, zone.d_min_m, zone.d_max_m
            )));
        }
        if !seen.insert(zone.cabinet_id) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate cabinet_id {}",
                zone.cabinet_id
            )));
        }
    }

    let mut sorted: Vec<&CabinetZone> = zones.iter().collect();
    sorted.sort_by(|a, b| a.d_min_m.total_cmp(&b.d_min_m));
    for pair in sorted.windows(2) {
        if pair[1].d_min_m <= pair[0].d_max_m {
            return Err(ConfigError::ValidationError(format!(
                "cabinet {} [{}, {}] overlaps cabinet {} [{}, {}]",
                pair[0].cabinet_id,
                pair[0].d_min_m,
                pair[0].d_max_m,
                pair[1].cabinet_id,
                pair[1].d_min_m,
                pair[1].d_max_m
            )));
        }
    }
    Ok(())
}

fn validate_authorized_set(
    authorized: &BTreeSet<CabinetId>,
    zones: &[CabinetZone],
) -> Result<(), ConfigError> {
    for id in authorized {
        if !zones.iter().any(|z| z.cabinet_id == *id) {
            return Err(ConfigError::ValidationError(format!(
                "authorized cabinet {id} is not configured"
            )));
        }
    }
    Ok(())
}
