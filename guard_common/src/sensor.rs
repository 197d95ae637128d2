//! Sensor adapter traits and error types.
//!
//! This module defines:
//! - `RangeAdapter` trait - Interface for distance sensor backends
//! - `VisionAdapter` trait - Interface for foot/pose estimators
//! - `ActuationSink` trait - Receiver of the per-tick output decision
//! - `AdapterError` enum - Error types for adapter operations
//! - `AdapterStatus` enum - Connection state reported by range adapters

use crate::types::{RangeSample, VisionSample};
use thiserror::Error;

/// Error types for adapter operations.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// Link to the device dropped
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// Sink rejected or failed to apply the output
    #[error("Actuation failed: {0}")]
    ActuationFailed(String),
}

/// Connection state of a range adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterStatus {
    Ready,
    Initializing,
    Disconnected,
    Error,
    Stopped,
}

impl AdapterStatus {
    #[inline]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Initializing => "INITIALIZING",
            Self::Disconnected => "DISCONNECTED",
            Self::Error => "ERROR",
            Self::Stopped => "STOPPED",
        }
    }
}

impl std::fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait defining the interface for distance sensor backends.
///
/// The station polls `read()` from a dedicated acquisition thread, so the
/// adapter owns its own read timeout.
///
/// # Lifecycle
///
/// 1. constructed by the backend (serial port, simulation, ...)
/// 2. `read()` - polled until `status()` reports `Stopped`
/// 3. `close()` - called once when the station shuts down
pub trait RangeAdapter: Send {
    /// Returns the adapter's identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Next sample, or `None` when nothing new arrived before the timeout.
    fn read(&mut self) -> Option<RangeSample>;

    fn status(&self) -> AdapterStatus;

    /// Maximum distance the device can report [m].
    fn max_range_m(&self) -> f64;

    /// Release the device.
    fn close(&mut self) -> Result<(), AdapterError>;
}

/// Trait defining the interface for vision backends.
pub trait VisionAdapter: Send {
    fn name(&self) -> &'static str;

    /// Latest foot/pose estimate, or `None` when no person is detected.
    fn read(&mut self) -> Option<VisionSample>;
}

/// Receives the output decision once per tick.
///
/// Implementations drive a relay, PLC coil or alarm. They must treat
/// `output_enabled == false` as the safe state.
pub trait ActuationSink {
    fn apply(&mut self, output_enabled: bool, reason: &str) -> Result<(), AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRange {
        closed: bool,
    }

    impl RangeAdapter for FixedRange {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn read(&mut self) -> Option<RangeSample> {
            (!self.closed).then_some(RangeSample::new(2.0, 1.0, 0.0))
        }

        fn status(&self) -> AdapterStatus {
            if self.closed {
                AdapterStatus::Stopped
            } else {
                AdapterStatus::Ready
            }
        }

        fn max_range_m(&self) -> f64 {
            8.0
        }

        fn close(&mut self) -> Result<(), AdapterError> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn test_adapter_error_display() {
        let err = AdapterError::Disconnected("ttyUSB0".to_string());
        assert_eq!(err.to_string(), "Device disconnected: ttyUSB0");
        let err = AdapterError::ActuationFailed("relay K3".to_string());
        assert_eq!(err.to_string(), "Actuation failed: relay K3");
    }

    #[test]
    fn closed_adapter_stops_reading() {
        let mut adapter: Box<dyn RangeAdapter> = Box::new(FixedRange { closed: false });
        assert!(adapter.status().is_ready());
        assert!(adapter.read().is_some());
        adapter.close().unwrap();
        assert_eq!(adapter.status(), AdapterStatus::Stopped);
        assert!(adapter.read().is_none());
    }
}
