//! Sliding-window zone tracker.
//!
//! Keeps the recent `(timestamp, distance, cabinet)` history in a
//! fixed-capacity ring buffer and derives one [`ZoneStatus`] per sample:
//!
//! | Check (first match wins)                                   | Status          |
//! |------------------------------------------------------------|-----------------|
//! | spread within `walk_window_s` > `movement_threshold_m`     | `WALKING`       |
//! | spread within `static_window_s` ≤ `static_threshold_m`, every sample at the latest cabinet | `STABLE_AUTH` / `STABLE_UNAUTH` |
//! | latest distance outside every cabinet                      | `OUT_OF_RANGE`  |
//! | otherwise                                                  | `IDLE`          |
//!
//! A window holding fewer than two samples has no spread and never yields
//! `WALKING` or `STABLE_*`. When the ring buffer overflowed inside a window
//! (sample rate × window above [`HISTORY_CAPACITY`]) that window is not
//! covered: it can still prove walking, but never stability.

use crate::error::SampleError;
use crate::range::RangeClassifier;
use guard_common::config::{ConfigError, GuardConfig, TrackerConfig};
use guard_common::consts::HISTORY_CAPACITY;
use guard_common::types::{CabinetId, RangeSample, ZoneStatus};
use heapless::Deque;
use serde::Serialize;

/// One stored sample.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HistoryEntry {
    timestamp_s: f64,
    distance_m: f64,
    cabinet: Option<CabinetId>,
}

/// Tracker verdict for the newest sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDecision {
    /// Latest accepted distance; `None` before the first sample.
    pub distance_m: Option<f64>,
    /// Cabinet of the latest distance (informational while walking).
    pub cabinet_index: Option<CabinetId>,
    pub status: ZoneStatus,
    pub is_safe: bool,
    pub reason: String,
}

impl ZoneDecision {
    /// Placeholder used before any sample was accepted.
    pub fn no_data() -> Self {
        Self {
            distance_m: None,
            cabinet_index: None,
            status: ZoneStatus::Idle,
            is_safe: true,
            reason: "no data".to_string(),
        }
    }
}

/// Distance history and motion/cabinet status derivation.
#[derive(Debug)]
pub struct ZoneTracker {
    classifier: RangeClassifier,
    config: TrackerConfig,
    history: Deque<HistoryEntry, HISTORY_CAPACITY>,
    /// Timestamp of the newest sample lost to a full buffer.
    overwritten_s: Option<f64>,
}

impl ZoneTracker {
    pub fn new(config: TrackerConfig, classifier: RangeClassifier) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier,
            config,
            history: Deque::new(),
            overwritten_s: None,
        })
    }

    /// Build the classifier and tracker from a validated bundle.
    pub fn from_config(config: &GuardConfig) -> Result<Self, ConfigError> {
        let classifier = RangeClassifier::new(
            config.cabinets.clone(),
            config.site.authorized_cabinets.clone(),
        )?;
        Self::new(config.tracker, classifier)
    }

    /// Ingest one sample and return the status it leads to.
    ///
    /// Invalid samples are rejected with history untouched. A sample older
    /// than the newest stored one is dropped and the decision re-derived from
    /// the unchanged history; equal timestamps are accepted.
    pub fn update(&mut self, sample: &RangeSample) -> Result<ZoneDecision, SampleError> {
        SampleError::check_range(sample)?;

        if let Some(newest) = self.history.back() {
            if sample.timestamp_s < newest.timestamp_s {
                tracing::debug!(
                    t = sample.timestamp_s,
                    newest = newest.timestamp_s,
                    "out-of-order range sample dropped"
                );
                return Ok(self.evaluate());
            }
        }

        let entry = HistoryEntry {
            timestamp_s: sample.timestamp_s,
            distance_m: sample.distance_m,
            cabinet: self.classifier.classify(sample.distance_m),
        };
        if self.history.is_full() {
            if let Some(lost) = self.history.pop_front() {
                if self.overwritten_s.is_none() {
                    tracing::warn!(
                        capacity = HISTORY_CAPACITY,
                        window_s = self.config.max_window_s(),
                        "range history full, windows truncated until the rate drops"
                    );
                }
                self.overwritten_s = Some(lost.timestamp_s);
            }
        }
        // Cannot fail: a slot was freed above.
        let _ = self.history.push_back(entry);
        self.evict(sample.timestamp_s);

        Ok(self.evaluate())
    }

    /// Decision derived from the current history without modifying it.
    pub fn evaluate(&self) -> ZoneDecision {
        let Some(latest) = self.history.back().copied() else {
            return ZoneDecision::no_data();
        };
        let decision = |status: ZoneStatus, is_safe: bool, reason: String| ZoneDecision {
            distance_m: Some(latest.distance_m),
            cabinet_index: latest.cabinet,
            status,
            is_safe,
            reason,
        };

        // a truncated window still proves motion; it cannot prove stillness
        if let Some(spread) = self.spread(self.config.walk_window_s) {
            if spread > self.config.movement_threshold_m {
                return decision(
                    ZoneStatus::Walking,
                    true,
                    format!("walking (spread {spread:.2} m)"),
                );
            }
        }

        let covered = self.covers(self.config.walk_window_s, latest.timestamp_s)
            && self.covers(self.config.static_window_s, latest.timestamp_s);

        if let Some(cabinet) = latest.cabinet {
            if !covered {
                return decision(
                    ZoneStatus::Idle,
                    true,
                    "history shorter than window".to_string(),
                );
            }
            let still = self
                .spread(self.config.static_window_s)
                .is_some_and(|s| s <= self.config.static_threshold_m);
            if still && self.consensus(self.config.static_window_s, cabinet) {
                return if self.classifier.is_authorized(Some(cabinet)) {
                    decision(
                        ZoneStatus::StableAuth,
                        true,
                        format!("stable at authorized cabinet {cabinet}"),
                    )
                } else {
                    decision(
                        ZoneStatus::StableUnauth,
                        false,
                        format!("stable at unauthorized cabinet {cabinet}"),
                    )
                };
            }
            return decision(
                ZoneStatus::Idle,
                true,
                "awaiting stable reading".to_string(),
            );
        }

        decision(
            ZoneStatus::OutOfRange,
            true,
            "outside configured cabinet zones".to_string(),
        )
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn classifier(&self) -> &RangeClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ─── Window helpers ─────────────────────────────────────────────

    fn evict(&mut self, newest_s: f64) {
        let horizon = self.config.max_window_s();
        while let Some(front) = self.history.front() {
            if newest_s - front.timestamp_s > horizon {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// False while a sample inside the window was lost to a full buffer.
    fn covers(&self, window_s: f64, latest_s: f64) -> bool {
        self.overwritten_s.is_none_or(|lost| latest_s - lost > window_s)
    }

    fn recent(&self, window_s: f64) -> impl Iterator<Item = &HistoryEntry> + '_ {
        let cutoff = self
            .history
            .back()
            .map_or(f64::INFINITY, |e| e.timestamp_s - window_s);
        self.history.iter().filter(move |e| e.timestamp_s >= cutoff)
    }

    /// `max - min` of the distances in the window; `None` below two samples.
    fn spread(&self, window_s: f64) -> Option<f64> {
        let (count, lo, hi) = self.recent(window_s).fold(
            (0usize, f64::INFINITY, f64::NEG_INFINITY),
            |(n, lo, hi), e| (n + 1, lo.min(e.distance_m), hi.max(e.distance_m)),
        );
        (count >= 2).then_some(hi - lo)
    }

    fn consensus(&self, window_s: f64, cabinet: CabinetId) -> bool {
        self.recent(window_s).all(|e| e.cabinet == Some(cabinet))
    }
}
