//! Adapter implementations.
//!
//! - [`simulation`] - Scenario playback for development and testing
//!
//! # Adding New Adapters
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `RangeAdapter` and/or `VisionAdapter` from `guard_common::sensor`
//! 3. Construct it in the station binary

pub mod simulation;
