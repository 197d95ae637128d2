//! # Cabinet Guard Station
//!
//! Runs the decision core against live adapters at a fixed tick rate.
//!
//! # Module Structure
//!
//! - [`runtime`] - `GuardRuntime`, acquisition threads and the sampling loop
//! - [`handoff`] - Single-slot, last-sample-wins handoff between threads
//! - [`clock`] - Shared monotonic clock for sample timestamps
//! - [`stats`] - O(1) tick timing statistics
//! - [`sinks`] - Actuation sink and per-tick record writer
//! - [`drivers`] - Adapter implementations (simulation)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  publish   ┌────────────┐
//! │ range thread │──────────► │ SampleSlot │──┐
//! └──────────────┘            └────────────┘  │  latest()   ┌──────────────┐   ┌────────────────┐
//! ┌──────────────┐  publish   ┌────────────┐  ├───────────► │ FusionEngine │──►│ sink + record  │
//! │ vision thread│──────────► │ SampleSlot │──┘  (per tick) └──────────────┘   └────────────────┘
//! └──────────────┘            └────────────┘
//! ```

#![warn(missing_docs)]

pub mod clock;
pub mod drivers;
pub mod handoff;
pub mod runtime;
pub mod sinks;
pub mod stats;

pub use crate::runtime::{GuardRuntime, RunSummary, RuntimeError};
