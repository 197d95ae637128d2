//! Shared monotonic clock.
//!
//! Every adapter and the sampling loop stamp time from one `MonotonicClock`
//! so range and vision timestamps are directly comparable.

use std::time::Instant;

/// Seconds since a common start instant.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Start a new clock at zero.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time [s].
    #[inline]
    pub fn now_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clock_is_monotonic_and_shared_by_copies() {
        let clock = MonotonicClock::new();
        let copy = clock;
        let a = clock.now_s();
        std::thread::sleep(Duration::from_millis(2));
        let b = copy.now_s();
        assert!(a >= 0.0);
        assert!(b > a);
    }
}
