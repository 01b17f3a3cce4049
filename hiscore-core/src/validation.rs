//! Gain validation between consecutive snapshots of one player.
//!
//! A transition is accepted when no tracked metric went down (outside the
//! fluctuating ones) and the efficiency gained fits in the elapsed time.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{CHANGE_IGNORED, MIN_ELAPSED_HOURS, NEGATIVE_GAINS_IGNORED};
use crate::efficiency::{EfficiencyProvider, StoredEfficiency};
use crate::error::SnapshotError;
use crate::metrics::Metric;
use crate::numbers::i64_to_f64;
use crate::snapshot::Snapshot;

const DEFAULT_GAIN_RULES: &str = include_str!("../data/gain_rules.json");

/// Tunable thresholds and ignore-sets for gain validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainRules {
    /// Floor applied to the elapsed time before comparing efficiency gains.
    pub min_elapsed_hours: f64,
    /// Metrics allowed to decrease.
    pub negative_gains_ignored: Vec<Metric>,
    /// Metrics whose growth is not a meaningful change.
    pub change_ignored: Vec<Metric>,
}

impl Default for GainRules {
    fn default() -> Self {
        Self {
            min_elapsed_hours: MIN_ELAPSED_HOURS,
            negative_gains_ignored: NEGATIVE_GAINS_IGNORED.to_vec(),
            change_ignored: CHANGE_IGNORED.to_vec(),
        }
    }
}

impl GainRules {
    /// Rules from the embedded `gain_rules.json`, falling back to the
    /// built-in constants if the file cannot be parsed.
    #[must_use]
    pub fn load_from_static() -> Self {
        match Self::from_json(DEFAULT_GAIN_RULES) {
            Ok(rules) => rules,
            Err(err) => {
                warn!("embedded gain rules are invalid, using built-in defaults: {err}");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn default_rules() -> &'static Self {
        static RULES: OnceLock<GainRules> = OnceLock::new();
        RULES.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into gain rules.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidRule`] when `min_elapsed_hours` is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.min_elapsed_hours.is_finite() && self.min_elapsed_hours >= 0.0 {
            Ok(())
        } else {
            Err(SnapshotError::InvalidRule {
                field: "min_elapsed_hours",
                value: self.min_elapsed_hours,
            })
        }
    }

    /// Whether any non-ignored metric dropped from a ranked value to a lower
    /// ranked value.
    #[must_use]
    pub fn has_negative_gains(&self, before: &Snapshot, after: &Snapshot) -> bool {
        Metric::all()
            .filter(|metric| !self.negative_gains_ignored.contains(metric))
            .any(|metric| match (before.value(metric), after.value(metric)) {
                (Some(previous), Some(current)) => current < previous,
                _ => false,
            })
    }

    /// Whether `after` carries any new progress worth storing.
    ///
    /// A missing `before` always counts as changed and a missing `after`
    /// never does. An unranked `before` value is lower than any ranked one.
    #[must_use]
    pub fn has_changed(&self, before: Option<&Snapshot>, after: Option<&Snapshot>) -> bool {
        let Some(before) = before else {
            return true;
        };
        let Some(after) = after else {
            return false;
        };

        Metric::all()
            .filter(|metric| !self.change_ignored.contains(metric))
            .any(|metric| match (before.value(metric), after.value(metric)) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(previous), Some(current)) => current > previous,
            })
    }
}

/// Which rules a transition tripped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainAssessment {
    pub negative_gains: bool,
    pub excessive_gains: bool,
}

impl GainAssessment {
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        !self.negative_gains && !self.excessive_gains
    }
}

/// Checks snapshot transitions against [`GainRules`] using an efficiency
/// source for the excessive-gains rule.
#[derive(Debug, Clone)]
pub struct SnapshotValidator<E = StoredEfficiency> {
    rules: GainRules,
    efficiency: E,
}

impl Default for SnapshotValidator<StoredEfficiency> {
    fn default() -> Self {
        Self::new(StoredEfficiency)
    }
}

impl<E: EfficiencyProvider> SnapshotValidator<E> {
    /// Validator with the default rules.
    #[must_use]
    pub fn new(efficiency: E) -> Self {
        Self::with_rules(GainRules::default_rules().clone(), efficiency)
    }

    #[must_use]
    pub const fn with_rules(rules: GainRules, efficiency: E) -> Self {
        Self { rules, efficiency }
    }

    #[must_use]
    pub const fn rules(&self) -> &GainRules {
        &self.rules
    }

    /// Like [`Self::within_range_at`] with the current time.
    #[must_use]
    pub fn within_range(&self, before: Option<&Snapshot>, after: Option<&Snapshot>) -> bool {
        self.within_range_at(before, after, Utc::now())
    }

    /// Whether `after` is a plausible successor of `before`.
    ///
    /// There is nothing to compare a first snapshot against, so a missing
    /// `before` is accepted. A missing `after` is rejected.
    #[must_use]
    pub fn within_range_at(
        &self,
        before: Option<&Snapshot>,
        after: Option<&Snapshot>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(before) = before else {
            return true;
        };
        let Some(after) = after else {
            return false;
        };

        let assessment = self.assess_at(before, after, now);
        if !assessment.is_accepted() {
            debug!(
                "rejected snapshot for player {}: negative_gains={} excessive_gains={}",
                after.player_id, assessment.negative_gains, assessment.excessive_gains
            );
        }
        assessment.is_accepted()
    }

    /// Evaluate both rejection rules.
    #[must_use]
    pub fn assess_at(
        &self,
        before: &Snapshot,
        after: &Snapshot,
        now: DateTime<Utc>,
    ) -> GainAssessment {
        GainAssessment {
            negative_gains: self.has_negative_gains(before, after),
            excessive_gains: self.has_excessive_gains_at(before, after, now),
        }
    }

    #[must_use]
    pub fn has_negative_gains(&self, before: &Snapshot, after: &Snapshot) -> bool {
        self.rules.has_negative_gains(before, after)
    }

    #[must_use]
    pub fn has_excessive_gains(&self, before: &Snapshot, after: &Snapshot) -> bool {
        self.has_excessive_gains_at(before, after, Utc::now())
    }

    /// Whether the EHP + EHB gained exceeds the elapsed hours.
    ///
    /// Elapsed time is floored at `min_elapsed_hours` so snapshots taken
    /// close together are not flagged for ordinary play. A missing timestamp
    /// on either side is read as `now`.
    #[must_use]
    pub fn has_excessive_gains_at(
        &self,
        before: &Snapshot,
        after: &Snapshot,
        now: DateTime<Utc>,
    ) -> bool {
        let after_date = after.created_at.unwrap_or(now);
        let before_date = before.created_at.unwrap_or(now);
        let elapsed_hours = elapsed_hours(before_date, after_date);

        let ehp_diff =
            self.efficiency.hours_played(after) - self.efficiency.hours_played(before);
        let ehb_diff =
            self.efficiency.hours_bossed(after) - self.efficiency.hours_bossed(before);

        ehp_diff + ehb_diff > elapsed_hours.max(self.rules.min_elapsed_hours)
    }

    #[must_use]
    pub fn has_changed(&self, before: Option<&Snapshot>, after: Option<&Snapshot>) -> bool {
        self.rules.has_changed(before, after)
    }
}

fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    i64_to_f64((to - from).num_milliseconds()) / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Activity, Boss, ComputedMetric, Skill};
    use chrono::{Duration, TimeZone};

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn snapshot(created_at: DateTime<Utc>, overall: i64, ehp: f64) -> Snapshot {
        Snapshot::new(1, 42, Some(created_at))
            .with_skill(Skill::Overall, overall, 100)
            .with_computed(ComputedMetric::Ehp, ehp, 100)
    }

    #[test]
    fn embedded_rules_match_constants() {
        let rules = GainRules::load_from_static();
        assert_eq!(rules, GainRules::default());
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let rules = GainRules::from_json(r#"{ "min_elapsed_hours": 24 }"#).unwrap();
        assert!((rules.min_elapsed_hours - 24.0).abs() < f64::EPSILON);
        assert_eq!(rules.change_ignored, CHANGE_IGNORED.to_vec());
    }

    #[test]
    fn negative_floor_is_rejected() {
        let rules = GainRules {
            min_elapsed_hours: -1.0,
            ..GainRules::default()
        };
        assert!(matches!(
            rules.validate(),
            Err(SnapshotError::InvalidRule { field: "min_elapsed_hours", .. })
        ));
    }

    #[test]
    fn missing_snapshots_follow_absence_rules() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let s = snapshot(at(0), 100, 1.0);
        assert!(validator.within_range_at(None, Some(&s), at(1)));
        assert!(!validator.within_range_at(Some(&s), None, at(1)));
        assert!(validator.has_changed(None, Some(&s)));
        assert!(!validator.has_changed(Some(&s), None));
    }

    #[test]
    fn steady_progress_is_accepted() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let before = snapshot(at(0), 1_000, 10.0);
        let after = snapshot(at(200), 5_000, 60.0);
        assert!(validator.within_range_at(Some(&before), Some(&after), at(300)));
        assert!(validator.has_changed(Some(&before), Some(&after)));
    }

    #[test]
    fn decreasing_experience_is_a_negative_gain() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let before = snapshot(at(0), 1_000, 10.0);
        let after = snapshot(at(1), 999, 10.0);
        let assessment = validator.assess_at(&before, &after, at(2));
        assert!(assessment.negative_gains);
        assert!(!assessment.excessive_gains);
        assert!(!validator.within_range_at(Some(&before), Some(&after), at(2)));
    }

    #[test]
    fn ignored_and_unranked_metrics_may_drop() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let before = snapshot(at(0), 1_000, 10.0)
            .with_activity(Activity::LastManStanding, 2_000, 5)
            .with_activity(Activity::PvpArena, 3_000, 5)
            .with_boss(Boss::Zulrah, 50, 5);
        let after = snapshot(at(1), 1_000, 5.0)
            .with_activity(Activity::LastManStanding, 1_500, 9)
            .with_activity(Activity::PvpArena, 2_500, 9)
            .with_boss(Boss::Zulrah, -1, -1);
        assert!(!validator.has_negative_gains(&before, &after));
    }

    #[test]
    fn efficiency_spike_within_the_floor_is_flagged() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let created = at(0);
        let before = snapshot(created, 1_000, 0.0);
        let after = snapshot(created + Duration::seconds(1), 1_000, 200.0);
        assert!(validator.has_excessive_gains_at(&before, &after, at(1)));

        let modest = snapshot(created + Duration::seconds(1), 1_000, 119.0);
        assert!(!validator.has_excessive_gains_at(&before, &modest, at(1)));
    }

    #[test]
    fn long_gaps_allow_larger_gains() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let before = snapshot(at(0), 1_000, 0.0);
        let after = snapshot(at(500), 1_000, 450.0);
        assert!(!validator.has_excessive_gains_at(&before, &after, at(500)));
    }

    #[test]
    fn missing_after_timestamp_uses_injected_clock() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let before = snapshot(at(0), 1_000, 0.0);
        let after = Snapshot::new(2, 42, None).with_computed(ComputedMetric::Ehp, 300.0, 1);
        assert!(validator.has_excessive_gains_at(&before, &after, at(200)));
        assert!(!validator.has_excessive_gains_at(&before, &after, at(400)));
    }

    #[test]
    fn efficiency_only_growth_is_not_a_change() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let before = snapshot(at(0), 1_000, 10.0);
        let after = snapshot(at(5), 1_000, 12.0);
        assert!(!validator.has_changed(Some(&before), Some(&after)));

        let newly_ranked = after.with_boss(Boss::Obor, 1, 10_000);
        assert!(validator.has_changed(Some(&before), Some(&newly_ranked)));
    }

    #[test]
    fn custom_rules_change_the_floor() {
        let rules = GainRules {
            min_elapsed_hours: 1.0,
            ..GainRules::default()
        };
        let validator = SnapshotValidator::with_rules(rules, StoredEfficiency);
        let before = snapshot(at(0), 1_000, 0.0);
        let after = snapshot(at(2), 1_000, 3.0);
        assert!(validator.has_excessive_gains_at(&before, &after, at(2)));
    }
}
