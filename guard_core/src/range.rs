//! Distance → cabinet classification.
//!
//! Zones are kept sorted by `d_min_m`; lookup is a binary search over the
//! lower bounds followed by a containment check on the single candidate.

use guard_common::config::{ConfigError, validate_cabinet_zones};
use guard_common::types::{CabinetId, CabinetZone};
use std::collections::BTreeSet;

/// Cabinet whose closed interval contains `distance_m`.
///
/// `zones` must be sorted by `d_min_m` and non-overlapping. Non-finite or
/// negative distances and an empty table yield `None`.
pub fn classify(distance_m: f64, zones: &[CabinetZone]) -> Option<CabinetId> {
    if !distance_m.is_finite() || distance_m < 0.0 {
        return None;
    }
    let idx = zones.partition_point(|z| z.d_min_m <= distance_m);
    let candidate = zones.get(idx.checked_sub(1)?)?;
    candidate
        .contains(distance_m)
        .then_some(candidate.cabinet_id)
}

/// Allow-list membership. No cabinet is never authorized.
#[inline]
pub fn is_authorized(cabinet: Option<CabinetId>, authorized: &BTreeSet<CabinetId>) -> bool {
    cabinet.is_some_and(|id| authorized.contains(&id))
}

/// Owns the validated cabinet table and allow-list.
#[derive(Debug, Clone)]
pub struct RangeClassifier {
    zones: Vec<CabinetZone>,
    authorized: BTreeSet<CabinetId>,
}

impl RangeClassifier {
    /// Sort and validate `zones`.
    pub fn new(
        mut zones: Vec<CabinetZone>,
        authorized: BTreeSet<CabinetId>,
    ) -> Result<Self, ConfigError> {
        validate_cabinet_zones(&zones)?;
        zones.sort_by(|a, b| a.d_min_m.total_cmp(&b.d_min_m));
        Ok(Self { zones, authorized })
    }

    #[inline]
    pub fn classify(&self, distance_m: f64) -> Option<CabinetId> {
        classify(distance_m, &self.zones)
    }

    #[inline]
    pub fn is_authorized(&self, cabinet: Option<CabinetId>) -> bool {
        is_authorized(cabinet, &self.authorized)
    }

    /// Zones in ascending distance order.
    pub fn zones(&self) -> &[CabinetZone] {
        &self.zones
    }
}
