//! Reduce a group of snapshots to one synthetic "average" snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::constants::{SYNTHETIC_ID, UNRANKED_SENTINEL};
use crate::error::SnapshotError;
use crate::metrics::{Activity, Boss, ComputedMetric, Metric, Skill};
use crate::numbers::{i64_to_f64, round_half_up_to_i64, usize_to_f64};
use crate::snapshot::{Ranked, Snapshot};

/// How unranked entries take part in a mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelPolicy {
    /// Unranked entries count as `-1`, exactly like the persisted records.
    /// Groups where few members are ranked get pulled towards zero.
    #[default]
    Include,
    /// Only ranked entries are averaged; a metric nobody is ranked in stays
    /// unranked.
    Exclude,
}

/// Average with [`SentinelPolicy::Include`] stamped with the current time.
///
/// # Errors
///
/// Returns [`SnapshotError::EmptySnapshots`] if `snapshots` is empty.
pub fn average(snapshots: &[Snapshot]) -> Result<Snapshot, SnapshotError> {
    average_with(snapshots, SentinelPolicy::default(), Utc::now())
}

/// Per-metric mean of values and ranks.
///
/// Values and ranks are each rounded half up, computed metrics included.
/// Negative means come out unranked. The result has
/// id and player id `-1` and is stamped with `now`.
///
/// # Errors
///
/// Returns [`SnapshotError::EmptySnapshots`] if `snapshots` is empty.
pub fn average_with(
    snapshots: &[Snapshot],
    policy: SentinelPolicy,
    now: DateTime<Utc>,
) -> Result<Snapshot, SnapshotError> {
    if snapshots.is_empty() {
        return Err(SnapshotError::EmptySnapshots {
            operation: "average",
        });
    }

    let mut result = Snapshot::new(SYNTHETIC_ID, SYNTHETIC_ID, Some(now));

    for skill in Skill::iter() {
        result.set_skill(skill, integer_mean(snapshots, Metric::Skill(skill), policy));
    }
    for activity in Activity::iter() {
        let entry = integer_mean(snapshots, Metric::Activity(activity), policy);
        result.set_activity(activity, entry);
    }
    for boss in Boss::iter() {
        result.set_boss(boss, integer_mean(snapshots, Metric::Boss(boss), policy));
    }
    for computed in ComputedMetric::iter() {
        let metric = Metric::Computed(computed);
        let value = mean(snapshots.iter().map(|s| s.value(metric)), policy)
            .and_then(non_negative)
            .map(i64_to_f64);
        let rank = rounded_rank(snapshots, metric, policy);
        result.set_computed(computed, Ranked::new(value, rank));
    }

    Ok(result)
}

fn integer_mean(snapshots: &[Snapshot], metric: Metric, policy: SentinelPolicy) -> Ranked<i64> {
    let value = mean(snapshots.iter().map(|s| s.value(metric)), policy).and_then(non_negative);
    Ranked::new(value, rounded_rank(snapshots, metric, policy))
}

fn rounded_rank(snapshots: &[Snapshot], metric: Metric, policy: SentinelPolicy) -> Option<i64> {
    let ranks = snapshots.iter().map(|s| s.rank(metric).map(i64_to_f64));
    mean(ranks, policy).and_then(non_negative)
}

fn non_negative(mean: f64) -> Option<i64> {
    let rounded = round_half_up_to_i64(mean);
    (rounded >= 0).then_some(rounded)
}

fn mean(values: impl Iterator<Item = Option<f64>>, policy: SentinelPolicy) -> Option<f64> {
    let sentinel = i64_to_f64(UNRANKED_SENTINEL);
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), value| {
        match (value, policy) {
            (Some(value), _) => (sum + value, count + 1),
            (None, SentinelPolicy::Include) => (sum + sentinel, count + 1),
            (None, SentinelPolicy::Exclude) => (sum, count),
        }
    });

    (count > 0).then(|| sum / usize_to_f64(count))
}
