//! Per-metric leaders across a population of snapshots.
//!
//! Resolution happens in two passes: [`get_metric_leaders`] picks the
//! leading snapshot for every metric and records its player id, then
//! [`assign_players_to_metric_leaders`] attaches player records that the
//! caller fetched in one batch (see [`MetricLeaderboard::distinct_leader_ids`]).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::SnapshotError;
use crate::format::{ActivityValue, BossValue, ComputedValue, SkillValue, display_level};
use crate::metrics::{Activity, Boss, ComputedMetric, Metric, Skill};
use crate::snapshot::Snapshot;
use crate::stats::PlayerBuild;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub build: Option<PlayerBuild>,
}

/// A leading value with the player it belongs to, once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader<V> {
    #[serde(flatten)]
    pub value: V,
    pub player: Option<Player>,
}

impl<V> Leader<V> {
    #[must_use]
    pub const fn unassigned(value: V) -> Self {
        Self {
            value,
            player: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricLeaders {
    pub skills: BTreeMap<Skill, Leader<SkillValue>>,
    pub bosses: BTreeMap<Boss, Leader<BossValue>>,
    pub activities: BTreeMap<Activity, Leader<ActivityValue>>,
    pub computed: BTreeMap<ComputedMetric, Leader<ComputedValue>>,
}

impl MetricLeaders {
    /// Player attached to a metric's leader, if any.
    #[must_use]
    pub fn player(&self, metric: Metric) -> Option<&Player> {
        match metric {
            Metric::Skill(s) => self.skills.get(&s)?.player.as_ref(),
            Metric::Activity(a) => self.activities.get(&a)?.player.as_ref(),
            Metric::Boss(b) => self.bosses.get(&b)?.player.as_ref(),
            Metric::Computed(c) => self.computed.get(&c)?.player.as_ref(),
        }
    }

    /// Drop every metric not in `metrics`.
    pub fn retain_metrics(&mut self, metrics: &[Metric]) {
        self.skills.retain(|s, _| metrics.contains(&Metric::Skill(*s)));
        self.bosses.retain(|b, _| metrics.contains(&Metric::Boss(*b)));
        self.activities
            .retain(|a, _| metrics.contains(&Metric::Activity(*a)));
        self.computed
            .retain(|c, _| metrics.contains(&Metric::Computed(*c)));
    }
}

/// Leaders plus the id of the player owning each leading snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricLeaderboard {
    pub leaders: MetricLeaders,
    pub leader_ids: BTreeMap<Metric, i64>,
}

impl MetricLeaderboard {
    /// Sorted, de-duplicated leader ids, ready for a single player lookup.
    #[must_use]
    pub fn distinct_leader_ids(&self) -> Vec<i64> {
        self.leader_ids
            .values()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn with_players(self, players: &[Player]) -> Self {
        let leaders = assign_players_to_metric_leaders(&self.leaders, &self.leader_ids, players);
        Self {
            leaders,
            leader_ids: self.leader_ids,
        }
    }
}

/// Index of the first snapshot holding the highest value for `metric`.
///
/// Unranked values sort below every ranked value; ties keep the earliest
/// snapshot.
fn leading_index(snapshots: &[Snapshot], metric: Metric) -> usize {
    let mut best = 0;
    let mut best_value = snapshots.first().and_then(|s| s.value(metric));
    for (index, snapshot) in snapshots.iter().enumerate().skip(1) {
        let value = snapshot.value(metric);
        if value > best_value {
            best = index;
            best_value = value;
        }
    }
    best
}

/// Find the leader of every metric. Players are left unassigned.
///
/// # Errors
///
/// Returns [`SnapshotError::EmptySnapshots`] if `snapshots` is empty.
pub fn get_metric_leaders(snapshots: &[Snapshot]) -> Result<MetricLeaderboard, SnapshotError> {
    if snapshots.is_empty() {
        return Err(SnapshotError::EmptySnapshots {
            operation: "metric leaders",
        });
    }

    let mut board = MetricLeaderboard::default();

    for metric in Metric::all() {
        let leader = &snapshots[leading_index(snapshots, metric)];
        board.leader_ids.insert(metric, leader.player_id);

        let leaders = &mut board.leaders;
        match metric {
            Metric::Skill(skill) => {
                let entry = leader.skill(skill);
                let value = SkillValue {
                    metric: skill,
                    experience: entry.value,
                    rank: entry.rank,
                    level: display_level(leader, skill),
                    ehp: None,
                };
                leaders.skills.insert(skill, Leader::unassigned(value));
            }
            Metric::Boss(boss) => {
                let entry = leader.boss(boss);
                let value = BossValue {
                    metric: boss,
                    kills: entry.value,
                    rank: entry.rank,
                    ehb: None,
                };
                leaders.bosses.insert(boss, Leader::unassigned(value));
            }
            Metric::Activity(activity) => {
                let entry = leader.activity(activity);
                let value = ActivityValue {
                    metric: activity,
                    score: entry.value,
                    rank: entry.rank,
                };
                leaders.activities.insert(activity, Leader::unassigned(value));
            }
            Metric::Computed(computed) => {
                let entry = leader.computed(computed);
                let value = ComputedValue {
                    metric: computed,
                    value: entry.value,
                    rank: entry.rank,
                };
                leaders.computed.insert(computed, Leader::unassigned(value));
            }
        }
    }

    Ok(board)
}

/// Copy of `leaders` with every leader's `player` looked up by the id
/// recorded in `leader_ids`.
///
/// When `players` repeats an id the last record wins. Leaders whose id is
/// missing from `players` get no player.
#[must_use]
pub fn assign_players_to_metric_leaders(
    leaders: &MetricLeaders,
    leader_ids: &BTreeMap<Metric, i64>,
    players: &[Player],
) -> MetricLeaders {
    let by_id: HashMap<i64, &Player> = players.iter().map(|p| (p.id, p)).collect();
    let lookup = |metric: Metric| -> Option<Player> {
        leader_ids
            .get(&metric)
            .and_then(|id| by_id.get(id))
            .map(|player| (*player).clone())
    };

    MetricLeaders {
        skills: assign(&leaders.skills, |s| lookup(Metric::Skill(s))),
        bosses: assign(&leaders.bosses, |b| lookup(Metric::Boss(b))),
        activities: assign(&leaders.activities, |a| lookup(Metric::Activity(a))),
        computed: assign(&leaders.computed, |c| lookup(Metric::Computed(c))),
    }
}

fn assign<K, V>(
    family: &BTreeMap<K, Leader<V>>,
    lookup: impl Fn(K) -> Option<Player>,
) -> BTreeMap<K, Leader<V>>
where
    K: Copy + Ord,
    V: Clone,
{
    family
        .iter()
        .map(|(key, leader)| {
            let leader = Leader {
                value: leader.value.clone(),
                player: lookup(*key),
            };
            (*key, leader)
        })
        .collect()
}
