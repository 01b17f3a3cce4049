//! Point-in-time measurement of one player's metrics.
//!
//! A [`Snapshot`] holds a value and a rank for every metric in the catalog.
//! Unranked data is `None`; the `-1` sentinel only exists in the flat JSON
//! records handled by [`RawSnapshot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum::{EnumCount, IntoEnumIterator};

use crate::constants::UNRANKED_SENTINEL;
use crate::error::SnapshotError;
use crate::metrics::{Activity, Boss, ComputedMetric, Metric, Skill};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};

/// A metric value paired with its hiscore rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    pub value: Option<T>,
    pub rank: Option<i64>,
}

impl<T> Ranked<T> {
    pub const UNRANKED: Self = Self {
        value: None,
        rank: None,
    };

    #[must_use]
    pub const fn new(value: Option<T>, rank: Option<i64>) -> Self {
        Self { value, rank }
    }
}

impl<T> Default for Ranked<T> {
    fn default() -> Self {
        Self::UNRANKED
    }
}

impl Ranked<i64> {
    /// Build from sentinel-encoded numbers: negatives become unranked.
    #[must_use]
    pub fn from_raw(value: i64, rank: i64) -> Self {
        Self::new(ranked_i64(value), ranked_i64(rank))
    }
}

impl Ranked<f64> {
    /// Build from sentinel-encoded numbers: negatives become unranked.
    #[must_use]
    pub fn from_raw(value: f64, rank: i64) -> Self {
        let value = (value.is_finite() && value >= 0.0).then_some(value);
        Self::new(value, ranked_i64(rank))
    }
}

fn ranked_i64(value: i64) -> Option<i64> {
    (value >= 0).then_some(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot", into = "RawSnapshot")]
pub struct Snapshot {
    pub id: i64,
    pub player_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub imported_at: Option<DateTime<Utc>>,
    skills: [Ranked<i64>; Skill::COUNT],
    activities: [Ranked<i64>; Activity::COUNT],
    bosses: [Ranked<i64>; Boss::COUNT],
    computed: [Ranked<f64>; ComputedMetric::COUNT],
}

impl Snapshot {
    /// A snapshot with every metric unranked.
    #[must_use]
    pub fn new(id: i64, player_id: i64, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            player_id,
            created_at,
            imported_at: None,
            skills: [Ranked::<i64>::UNRANKED; Skill::COUNT],
            activities: [Ranked::<i64>::UNRANKED; Activity::COUNT],
            bosses: [Ranked::<i64>::UNRANKED; Boss::COUNT],
            computed: [Ranked::<f64>::UNRANKED; ComputedMetric::COUNT],
        }
    }

    #[must_use]
    pub const fn skill(&self, skill: Skill) -> Ranked<i64> {
        self.skills[skill as usize]
    }

    #[must_use]
    pub const fn activity(&self, activity: Activity) -> Ranked<i64> {
        self.activities[activity as usize]
    }

    #[must_use]
    pub const fn boss(&self, boss: Boss) -> Ranked<i64> {
        self.bosses[boss as usize]
    }

    #[must_use]
    pub const fn computed(&self, metric: ComputedMetric) -> Ranked<f64> {
        self.computed[metric as usize]
    }

    #[must_use]
    pub const fn experience(&self, skill: Skill) -> Option<i64> {
        self.skills[skill as usize].value
    }

    #[must_use]
    pub const fn kills(&self, boss: Boss) -> Option<i64> {
        self.bosses[boss as usize].value
    }

    #[must_use]
    pub const fn score(&self, activity: Activity) -> Option<i64> {
        self.activities[activity as usize].value
    }

    #[must_use]
    pub const fn computed_value(&self, metric: ComputedMetric) -> Option<f64> {
        self.computed[metric as usize].value
    }

    /// The metric's value widened to f64, for comparisons across families.
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Skill(s) => self.experience(s).map(i64_to_f64),
            Metric::Activity(a) => self.score(a).map(i64_to_f64),
            Metric::Boss(b) => self.kills(b).map(i64_to_f64),
            Metric::Computed(c) => self.computed_value(c),
        }
    }

    #[must_use]
    pub const fn rank(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Skill(s) => self.skills[s as usize].rank,
            Metric::Activity(a) => self.activities[a as usize].rank,
            Metric::Boss(b) => self.bosses[b as usize].rank,
            Metric::Computed(c) => self.computed[c as usize].rank,
        }
    }

    pub(crate) fn set_skill(&mut self, skill: Skill, entry: Ranked<i64>) {
        self.skills[skill as usize] = entry;
    }

    pub(crate) fn set_activity(&mut self, activity: Activity, entry: Ranked<i64>) {
        self.activities[activity as usize] = entry;
    }

    pub(crate) fn set_boss(&mut self, boss: Boss, entry: Ranked<i64>) {
        self.bosses[boss as usize] = entry;
    }

    pub(crate) fn set_computed(&mut self, metric: ComputedMetric, entry: Ranked<f64>) {
        self.computed[metric as usize] = entry;
    }

    /// Copy of this snapshot with a skill's experience and rank replaced.
    /// Negative numbers are read as unranked.
    #[must_use]
    pub fn with_skill(mut self, skill: Skill, experience: i64, rank: i64) -> Self {
        self.set_skill(skill, Ranked::<i64>::from_raw(experience, rank));
        self
    }

    #[must_use]
    pub fn with_activity(mut self, activity: Activity, score: i64, rank: i64) -> Self {
        self.set_activity(activity, Ranked::<i64>::from_raw(score, rank));
        self
    }

    #[must_use]
    pub fn with_boss(mut self, boss: Boss, kills: i64, rank: i64) -> Self {
        self.set_boss(boss, Ranked::<i64>::from_raw(kills, rank));
        self
    }

    #[must_use]
    pub fn with_computed(mut self, metric: ComputedMetric, value: f64, rank: i64) -> Self {
        self.set_computed(metric, Ranked::<f64>::from_raw(value, rank));
        self
    }

    #[must_use]
    pub fn with_imported_at(mut self, imported_at: Option<DateTime<Utc>>) -> Self {
        self.imported_at = imported_at;
        self
    }

    /// Flat, sentinel-encoded form used at the JSON boundary.
    #[must_use]
    pub fn to_raw(&self) -> RawSnapshot {
        RawSnapshot::from(self)
    }
}

/// Flat snapshot record as persisted: one `<metric><Measure>` and one
/// `<metric>Rank` field per metric, with `-1` for unranked entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub id: i64,
    pub player_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub imported_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = SnapshotError;

    /// Missing, `null` or negative numbers decode as unranked.
    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let mut snapshot = Self::new(raw.id, raw.player_id, raw.created_at);
        snapshot.imported_at = raw.imported_at;

        for skill in Skill::iter() {
            let entry = read_integer_entry(&raw.fields, Metric::Skill(skill))?;
            snapshot.set_skill(skill, entry);
        }
        for activity in Activity::iter() {
            let entry = read_integer_entry(&raw.fields, Metric::Activity(activity))?;
            snapshot.set_activity(activity, entry);
        }
        for boss in Boss::iter() {
            let entry = read_integer_entry(&raw.fields, Metric::Boss(boss))?;
            snapshot.set_boss(boss, entry);
        }
        for metric in ComputedMetric::iter() {
            let key = Metric::Computed(metric).value_key();
            let value = read_float(&raw.fields, &key)?;
            let rank = read_integer(&raw.fields, &Metric::Computed(metric).rank_key())?;
            snapshot.set_computed(metric, Ranked::new(value, rank));
        }

        Ok(snapshot)
    }
}

fn read_integer_entry(
    fields: &BTreeMap<String, Value>,
    metric: Metric,
) -> Result<Ranked<i64>, SnapshotError> {
    Ok(Ranked::new(
        read_integer(fields, &metric.value_key())?,
        read_integer(fields, &metric.rank_key())?,
    ))
}

fn read_integer(
    fields: &BTreeMap<String, Value>,
    key: &str,
) -> Result<Option<i64>, SnapshotError> {
    let Some(number) = read_number(fields, key)? else {
        return Ok(None);
    };
    if let Some(value) = number.as_i64() {
        return Ok(ranked_i64(value));
    }
    match number.as_f64() {
        Some(value) if value.is_finite() && value.fract() == 0.0 => {
            Ok(ranked_i64(floor_f64_to_i64(value)))
        }
        _ => Err(SnapshotError::InvalidField {
            key: key.to_string(),
            reason: "expected an integer",
        }),
    }
}

fn read_float(
    fields: &BTreeMap<String, Value>,
    key: &str,
) -> Result<Option<f64>, SnapshotError> {
    Ok(read_number(fields, key)?
        .and_then(serde_json::Number::as_f64)
        .filter(|value| value.is_finite() && *value >= 0.0))
}

fn read_number<'a>(
    fields: &'a BTreeMap<String, Value>,
    key: &str,
) -> Result<Option<&'a serde_json::Number>, SnapshotError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(Some(number)),
        Some(_) => Err(SnapshotError::InvalidField {
            key: key.to_string(),
            reason: "expected a number",
        }),
    }
}

impl From<&Snapshot> for RawSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        let mut fields = BTreeMap::new();
        for metric in Metric::all() {
            let value = match metric {
                Metric::Computed(c) => snapshot
                    .computed_value(c)
                    .map_or(Value::from(UNRANKED_SENTINEL), Value::from),
                Metric::Skill(s) => encode_i64(snapshot.experience(s)),
                Metric::Activity(a) => encode_i64(snapshot.score(a)),
                Metric::Boss(b) => encode_i64(snapshot.kills(b)),
            };
            fields.insert(metric.value_key(), value);
            fields.insert(metric.rank_key(), encode_i64(snapshot.rank(metric)));
        }

        Self {
            id: snapshot.id,
            player_id: snapshot.player_id,
            created_at: snapshot.created_at,
            imported_at: snapshot.imported_at,
            fields,
        }
    }
}

impl From<Snapshot> for RawSnapshot {
    fn from(snapshot: Snapshot) -> Self {
        Self::from(&snapshot)
    }
}

fn encode_i64(value: Option<i64>) -> Value {
    Value::from(value.unwrap_or(UNRANKED_SENTINEL))
}
