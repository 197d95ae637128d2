//! # Cabinet Guard Decision Core
//!
//! Turns a noisy, intermittently sampled distance stream and a foot position
//! from vision into a debounced safety verdict and an `output_enabled` flag.
//!
//! ## Pipeline (one tick)
//!
//! 1. **RangeClassifier**: distance → cabinet id
//! 2. **ZoneTracker**: sliding history → `IDLE` / `WALKING` / `STABLE_*` / `OUT_OF_RANGE`
//! 3. **LineZoneClassifier**: foot position → `OUTSIDE_SAFE` / `ON_LINE` / `INSIDE_DANGER`
//! 4. **SafetyStateMachine**: line zone + cabinet + motion → `SAFE_STABLE` / `TRANSITION` / `DANGER_STABLE`
//! 5. **FusionEngine**: runs the above and applies the stale-input fail-safe
//!
//! ## Allocation
//!
//! The tracker history is a fixed-capacity `heapless::Deque`; nothing in the
//! per-sample path grows without bound. Only the reason strings allocate.

pub mod error;
pub mod fusion;
pub mod gesture;
pub mod line;
pub mod range;
pub mod record;
pub mod safety;
pub mod tracker;
