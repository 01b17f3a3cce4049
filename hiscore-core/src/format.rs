//! Nested, per-family view of a snapshot for presentation layers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::efficiency::EfficiencyMap;
use crate::levels::level_from_experience;
use crate::metrics::{Activity, Boss, ComputedMetric, Metric, Skill};
use crate::snapshot::Snapshot;
use crate::stats::total_level;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillValue {
    pub metric: Skill,
    pub experience: Option<i64>,
    pub rank: Option<i64>,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ehp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossValue {
    pub metric: Boss,
    pub kills: Option<i64>,
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ehb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityValue {
    pub metric: Activity,
    pub score: Option<i64>,
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedValue {
    pub metric: ComputedMetric,
    pub value: Option<f64>,
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub skills: BTreeMap<Skill, SkillValue>,
    pub bosses: BTreeMap<Boss, BossValue>,
    pub activities: BTreeMap<Activity, ActivityValue>,
    pub computed: BTreeMap<ComputedMetric, ComputedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSnapshot {
    pub id: i64,
    pub player_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub imported_at: Option<DateTime<Utc>>,
    pub data: SnapshotData,
}

/// Skill level as displayed: total level for overall, regular level
/// otherwise.
pub(crate) fn display_level(snapshot: &Snapshot, skill: Skill) -> u32 {
    if skill == Skill::Overall {
        total_level(snapshot)
    } else {
        level_from_experience(snapshot.experience(skill))
    }
}

fn efficiency_for(efficiency: Option<&EfficiencyMap>, metric: Metric) -> Option<f64> {
    efficiency?
        .get(&metric)
        .copied()
        .filter(|hours| hours.is_finite())
}

/// Group a snapshot's values by metric family.
///
/// Skills gain a level and bosses their share of the supplied efficiency
/// map; activities and computed metrics are copied as-is. Returns `None`
/// when there is no snapshot.
#[must_use]
pub fn format(
    snapshot: Option<&Snapshot>,
    efficiency: Option<&EfficiencyMap>,
) -> Option<FormattedSnapshot> {
    let snapshot = snapshot?;
    let mut data = SnapshotData::default();

    for skill in Skill::iter() {
        let entry = snapshot.skill(skill);
        data.skills.insert(
            skill,
            SkillValue {
                metric: skill,
                experience: entry.value,
                rank: entry.rank,
                level: display_level(snapshot, skill),
                ehp: efficiency_for(efficiency, Metric::Skill(skill)),
            },
        );
    }

    for boss in Boss::iter() {
        let entry = snapshot.boss(boss);
        data.bosses.insert(
            boss,
            BossValue {
                metric: boss,
                kills: entry.value,
                rank: entry.rank,
                ehb: efficiency_for(efficiency, Metric::Boss(boss)),
            },
        );
    }

    for activity in Activity::iter() {
        let entry = snapshot.activity(activity);
        data.activities.insert(
            activity,
            ActivityValue {
                metric: activity,
                score: entry.value,
                rank: entry.rank,
            },
        );
    }

    for metric in ComputedMetric::iter() {
        let entry = snapshot.computed(metric);
        data.computed.insert(
            metric,
            ComputedValue {
                metric,
                value: entry.value,
                rank: entry.rank,
            },
        );
    }

    Some(FormattedSnapshot {
        id: snapshot.id,
        player_id: snapshot.player_id,
        created_at: snapshot.created_at,
        imported_at: snapshot.imported_at,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strum::EnumCount;

    fn sample() -> Snapshot {
        let created = Utc.with_ymd_and_hms(2023, 3, 14, 9, 0, 0).unwrap();
        Snapshot::new(10, 20, Some(created))
            .with_skill(Skill::Overall, 30_000_000, 12_345)
            .with_skill(Skill::Attack, 13_034_431, 1_000)
            .with_boss(Boss::Vorkath, 800, 2_000)
            .with_activity(Activity::ClueScrollsAll, 150, 9_000)
            .with_computed(ComputedMetric::Ehp, 512.75, 300)
    }

    #[test]
    fn absent_snapshot_formats_to_none() {
        assert!(format(None, None).is_none());
    }

    #[test]
    fn every_field_is_copied_into_its_family() {
        let snapshot = sample();
        let formatted = format(Some(&snapshot), None).unwrap();

        assert_eq!(formatted.id, 10);
        assert_eq!(formatted.player_id, 20);
        assert_eq!(formatted.created_at, snapshot.created_at);
        assert_eq!(formatted.data.skills.len(), Skill::COUNT);
        assert_eq!(formatted.data.bosses.len(), Boss::COUNT);
        assert_eq!(formatted.data.activities.len(), Activity::COUNT);
        assert_eq!(formatted.data.computed.len(), ComputedMetric::COUNT);

        for skill in Skill::iter() {
            let value = &formatted.data.skills[&skill];
            assert_eq!(value.experience, snapshot.experience(skill));
            assert_eq!(value.rank, snapshot.rank(Metric::Skill(skill)));
        }
        for boss in Boss::iter() {
            let value = &formatted.data.bosses[&boss];
            assert_eq!(value.kills, snapshot.kills(boss));
            assert_eq!(value.rank, snapshot.rank(Metric::Boss(boss)));
        }
        for activity in Activity::iter() {
            let value = &formatted.data.activities[&activity];
            assert_eq!(value.score, snapshot.score(activity));
            assert_eq!(value.rank, snapshot.rank(Metric::Activity(activity)));
        }
        assert_eq!(
            formatted.data.computed[&ComputedMetric::Ehp].value,
            Some(512.75)
        );
    }

    #[test]
    fn overall_level_is_total_level() {
        let formatted = format(Some(&sample()), None).unwrap();
        // attack at 99, the other 22 skills unranked at level 1
        assert_eq!(formatted.data.skills[&Skill::Overall].level, 121);
        assert_eq!(formatted.data.skills[&Skill::Attack].level, 99);
    }

    #[test]
    fn only_finite_efficiency_is_attached() {
        let mut efficiency = EfficiencyMap::new();
        efficiency.insert(Metric::Skill(Skill::Attack), 12.5);
        efficiency.insert(Metric::Skill(Skill::Strength), f64::NAN);
        efficiency.insert(Metric::Boss(Boss::Vorkath), 40.0);

        let formatted = format(Some(&sample()), Some(&efficiency)).unwrap();
        assert_eq!(formatted.data.skills[&Skill::Attack].ehp, Some(12.5));
        assert_eq!(formatted.data.skills[&Skill::Strength].ehp, None);
        assert_eq!(formatted.data.skills[&Skill::Defence].ehp, None);
        assert_eq!(formatted.data.bosses[&Boss::Vorkath].ehb, Some(40.0));
    }

    #[test]
    fn serializes_camel_case_without_missing_efficiency() {
        let formatted = format(Some(&sample()), None).unwrap();
        let json = serde_json::to_value(&formatted).unwrap();
        assert_eq!(json["playerId"], serde_json::json!(20));
        assert_eq!(json["data"]["skills"]["attack"]["level"], serde_json::json!(99));
        assert!(json["data"]["skills"]["attack"].get("ehp").is_none());
        assert_eq!(
            json["data"]["bosses"]["vorkath"]["kills"],
            serde_json::json!(800)
        );
    }
}
