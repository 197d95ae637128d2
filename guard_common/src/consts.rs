//! Workspace-wide constants for the cabinet guard.
//!
//! Single source of truth for limits and configuration defaults.
//! Imported by all crates; no duplication permitted.

use static_assertions::const_assert;

/// Capacity of the zone tracker ring buffer [samples].
///
/// At 50 Hz with the longest supported window (10 s) the buffer is never
/// the limiting factor; the oldest sample is overwritten when it is full.
pub const HISTORY_CAPACITY: usize = 512;

/// Longest sliding window accepted by the configuration [s].
pub const WINDOW_S_MAX: f64 = 10.0;

/// Default movement threshold for WALKING detection [m].
pub const MOVEMENT_THRESHOLD_M_DEFAULT: f64 = 0.25;

/// Default spread allowed while standing still [m].
pub const STATIC_THRESHOLD_M_DEFAULT: f64 = 0.20;

/// Default stability window [s].
pub const STATIC_WINDOW_S_DEFAULT: f64 = 2.5;

/// Default walking detection window [s].
pub const WALK_WINDOW_S_DEFAULT: f64 = 2.0;

/// Default sampling loop period [ms].
pub const TICK_INTERVAL_MS_DEFAULT: u64 = 100;
/// Minimum sampling loop period [ms].
pub const TICK_INTERVAL_MS_MIN: u64 = 5;
/// Maximum sampling loop period [ms].
pub const TICK_INTERVAL_MS_MAX: u64 = 5000;

/// Default age after which a handed-off sample counts as missing [s].
pub const STALE_TIMEOUT_S_DEFAULT: f64 = 0.5;

/// Default number of ticks to wait for the authorization gesture.
pub const GESTURE_MAX_WAIT_TICKS_DEFAULT: u32 = 15;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cabinet-guard/guard.toml";

/// Header line of the per-tick log record (comma-delimited).
pub const RECORD_HEADER: &str = "timestamp_s,safety_state,line_zone,zone_status,cabinet,output_enabled,has_motion,distance_m,foot_x,foot_y,stale";

const_assert!(HISTORY_CAPACITY >= 2);
const_assert!(TICK_INTERVAL_MS_MIN <= TICK_INTERVAL_MS_DEFAULT);
const_assert!(TICK_INTERVAL_MS_DEFAULT <= TICK_INTERVAL_MS_MAX);
