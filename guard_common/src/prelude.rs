//! Prelude module for common re-exports.
//!
//! Consumers can do `use guard_common::prelude::*;` and get the most
//! important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use guard_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, GuardConfig, LineConfig, LogLevel, PolicyConfig, RecordFormat,
    RuntimeConfig, SharedConfig, SiteConfig, TrackerConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CONFIG_PATH, HISTORY_CAPACITY, RECORD_HEADER};

// ─── Types ──────────────────────────────────────────────────────────
pub use crate::types::{
    ActionStatus, CabinetId, CabinetZone, Gesture, Lamp, LineModel, LineZone,
    LineZoneThresholds, OnLinePolicy, Pose, RangeSample, SafetyState, VisionSample, ZoneStatus,
};

// ─── Adapters ───────────────────────────────────────────────────────
pub use crate::sensor::{ActuationSink, AdapterError, AdapterStatus, RangeAdapter, VisionAdapter};
