//! Efficiency hours seam.
//!
//! Efficiency hours played (EHP) and bossed (EHB) come from rate tables that
//! live outside this crate. The validator only needs the two totals per
//! snapshot; the formatter accepts a per-metric breakdown as an
//! [`EfficiencyMap`].

use std::collections::BTreeMap;

use crate::metrics::{ComputedMetric, Metric};
use crate::snapshot::Snapshot;

/// Per-metric efficiency contribution (EHP for skills, EHB for bosses).
pub type EfficiencyMap = BTreeMap<Metric, f64>;

/// Source of efficiency totals for a snapshot.
///
/// Implementations must be pure: the same snapshot always yields the same
/// hours.
pub trait EfficiencyProvider {
    /// Efficiency hours played.
    fn hours_played(&self, snapshot: &Snapshot) -> f64;

    /// Efficiency hours bossed.
    fn hours_bossed(&self, snapshot: &Snapshot) -> f64;

    /// Combined EHP + EHB.
    fn total_hours(&self, snapshot: &Snapshot) -> f64 {
        self.hours_played(snapshot) + self.hours_bossed(snapshot)
    }
}

impl<E: EfficiencyProvider + ?Sized> EfficiencyProvider for &E {
    fn hours_played(&self, snapshot: &Snapshot) -> f64 {
        (**self).hours_played(snapshot)
    }

    fn hours_bossed(&self, snapshot: &Snapshot) -> f64 {
        (**self).hours_bossed(snapshot)
    }
}

/// Reads the `ehp` / `ehb` values already stored on the snapshot.
///
/// Unranked values count as zero hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredEfficiency;

impl EfficiencyProvider for StoredEfficiency {
    fn hours_played(&self, snapshot: &Snapshot) -> f64 {
        snapshot.computed_value(ComputedMetric::Ehp).unwrap_or(0.0)
    }

    fn hours_bossed(&self, snapshot: &Snapshot) -> f64 {
        snapshot.computed_value(ComputedMetric::Ehb).unwrap_or(0.0)
    }
}
