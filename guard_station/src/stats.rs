//! Tick timing statistics.

use std::time::Duration;

/// O(1) per-tick timing statistics.
///
/// Updated every tick with no allocation. Provides min/max/avg for tick
/// latency monitoring and overrun detection.
#[derive(Debug, Clone, PartialEq)]
pub struct TickStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last tick duration [ns].
    pub last_tick_ns: u64,
    /// Minimum tick duration [ns].
    pub min_tick_ns: u64,
    /// Maximum tick duration [ns].
    pub max_tick_ns: u64,
    /// Running sum for average computation.
    pub sum_tick_ns: u128,
    /// Ticks whose work exceeded the tick interval.
    pub overruns: u64,
}

impl TickStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_ns: 0,
            min_tick_ns: u64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
        }
    }

    /// Record a tick duration against its budget. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration: Duration, budget: Duration) {
        let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.tick_count += 1;
        self.last_tick_ns = ns;
        self.min_tick_ns = self.min_tick_ns.min(ns);
        self.max_tick_ns = self.max_tick_ns.max(ns);
        self.sum_tick_ns += u128::from(ns);
        if duration > budget {
            self.overruns += 1;
        }
    }

    /// Average tick time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_tick_ns(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            u64::try_from(self.sum_tick_ns / u128::from(self.tick_count)).unwrap_or(u64::MAX)
        }
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_min_max_avg_and_overruns() {
        let mut s = TickStats::new();
        assert_eq!(s.avg_tick_ns(), 0);
        let budget = Duration::from_micros(100);
        s.record(Duration::from_micros(50), budget);
        s.record(Duration::from_micros(150), budget);
        assert_eq!(s.tick_count, 2);
        assert_eq!(s.min_tick_ns, 50_000);
        assert_eq!(s.max_tick_ns, 150_000);
        assert_eq!(s.avg_tick_ns(), 100_000);
        assert_eq!(s.overruns, 1);
    }
}
