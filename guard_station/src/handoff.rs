//! Single-slot sample handoff.
//!
//! An acquisition thread publishes into the slot; the sampling loop peeks
//! the latest value. Writes overwrite, there is no queue, and the loop never
//! waits on a producer for longer than a copy.

use guard_common::types::{RangeSample, VisionSample};
use parking_lot::Mutex;
use std::sync::Arc;

/// Anything carrying an acquisition timestamp on the shared clock.
pub trait Timestamped {
    /// Acquisition time [s].
    fn timestamp_s(&self) -> f64;

    /// True when the sample is at most `max_age_s` old at `now_s`.
    #[inline]
    fn is_fresh(&self, now_s: f64, max_age_s: f64) -> bool {
        now_s - self.timestamp_s() <= max_age_s
    }
}

impl Timestamped for RangeSample {
    fn timestamp_s(&self) -> f64 {
        self.timestamp_s
    }
}

impl Timestamped for VisionSample {
    fn timestamp_s(&self) -> f64 {
        self.timestamp_s
    }
}

/// Last-sample-wins slot shared between one producer and one consumer.
#[derive(Debug)]
pub struct SampleSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for SampleSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SampleSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T: Copy> SampleSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with `sample`.
    #[inline]
    pub fn publish(&self, sample: T) {
        *self.inner.lock() = Some(sample);
    }

    /// Copy of the most recent sample, if any.
    #[inline]
    pub fn latest(&self) -> Option<T> {
        *self.inner.lock()
    }

    /// Empty the slot.
    pub fn clear(&self) {
        *self.inner.lock() = None;
    }
}

impl<T: Copy + Timestamped> SampleSlot<T> {
    /// Latest sample if it is not older than `max_age_s`.
    pub fn fresh(&self, now_s: f64, max_age_s: f64) -> Option<T> {
        self.latest().filter(|s| s.is_fresh(now_s, max_age_s))
    }
}
