use chrono::{DateTime, Utc};
use hiscore_core::{EfficiencyProvider, PlayerBuild, Snapshot, SnapshotValidator, player_build};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of validating one snapshot against its player's baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub player_id: i64,
    pub snapshot_id: i64,
    /// Last accepted snapshot compared against; `None` for a player's first.
    pub baseline_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub accepted: bool,
    pub negative_gains: bool,
    pub excessive_gains: bool,
    pub changed: bool,
    pub build: PlayerBuild,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub players: usize,
    pub transitions: Vec<TransitionRecord>,
}

impl AuditSummary {
    pub fn accepted(&self) -> usize {
        self.transitions.iter().filter(|t| t.accepted).count()
    }

    pub fn rejected(&self) -> usize {
        self.transitions.len() - self.accepted()
    }

    pub fn has_rejections(&self) -> bool {
        self.transitions.iter().any(|t| !t.accepted)
    }
}

/// Replay every player's history in creation order.
///
/// Each snapshot is checked against the player's last accepted snapshot, so
/// one bad import does not poison the snapshots after it. Snapshots without
/// a timestamp sort as if taken at `now`.
pub fn audit_snapshots<E: EfficiencyProvider>(
    snapshots: &[Snapshot],
    validator: &SnapshotValidator<E>,
    now: DateTime<Utc>,
) -> AuditSummary {
    let mut by_player: BTreeMap<i64, Vec<&Snapshot>> = BTreeMap::new();
    for snapshot in snapshots {
        by_player.entry(snapshot.player_id).or_default().push(snapshot);
    }

    let mut summary = AuditSummary {
        players: by_player.len(),
        transitions: Vec::with_capacity(snapshots.len()),
    };

    for history in by_player.values_mut() {
        history.sort_by_key(|s| s.created_at.unwrap_or(now));

        let mut baseline: Option<&Snapshot> = None;
        for &snapshot in history.iter() {
            let accepted = validator.within_range_at(baseline, Some(snapshot), now);
            let assessment = baseline
                .map(|before| validator.assess_at(before, snapshot, now))
                .unwrap_or_default();

            summary.transitions.push(TransitionRecord {
                player_id: snapshot.player_id,
                snapshot_id: snapshot.id,
                baseline_id: baseline.map(|b| b.id),
                created_at: snapshot.created_at,
                accepted,
                negative_gains: assessment.negative_gains,
                excessive_gains: assessment.excessive_gains,
                changed: validator.has_changed(baseline, Some(snapshot)),
                build: player_build(snapshot),
            });

            if accepted {
                baseline = Some(snapshot);
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hiscore_core::{ComputedMetric, Skill, StoredEfficiency};

    fn at(days: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap() + Duration::days(days)
    }

    fn snapshot(id: i64, player_id: i64, day: i64, overall: i64, ehp: f64) -> Snapshot {
        Snapshot::new(id, player_id, Some(at(day)))
            .with_skill(Skill::Overall, overall, 1_000)
            .with_computed(ComputedMetric::Ehp, ehp, 1_000)
    }

    #[test]
    fn first_snapshot_per_player_is_a_baseline() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let snapshots = [snapshot(1, 1, 0, 100, 0.0), snapshot(2, 2, 0, 100, 0.0)];
        let summary = audit_snapshots(&snapshots, &validator, at(30));
        assert_eq!(summary.players, 2);
        assert_eq!(summary.accepted(), 2);
        assert!(summary.transitions.iter().all(|t| t.baseline_id.is_none()));
    }

    #[test]
    fn history_is_replayed_in_creation_order() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let snapshots = [snapshot(2, 1, 10, 200, 1.0), snapshot(1, 1, 0, 100, 0.0)];
        let summary = audit_snapshots(&snapshots, &validator, at(30));
        let ids: Vec<i64> = summary.transitions.iter().map(|t| t.snapshot_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(summary.transitions[1].baseline_id, Some(1));
        assert!(!summary.has_rejections());
        assert!(summary.transitions[1].changed);
    }

    #[test]
    fn rejected_snapshots_do_not_become_baselines() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let snapshots = [
            snapshot(1, 1, 0, 1_000, 0.0),
            snapshot(2, 1, 1, 500, 0.0),
            snapshot(3, 1, 2, 1_100, 1.0),
        ];
        let summary = audit_snapshots(&snapshots, &validator, at(30));

        let rejected = &summary.transitions[1];
        assert!(!rejected.accepted);
        assert!(rejected.negative_gains);
        assert!(!rejected.excessive_gains);

        let recovered = &summary.transitions[2];
        assert!(recovered.accepted);
        assert_eq!(recovered.baseline_id, Some(1));
        assert_eq!(summary.rejected(), 1);
        assert!(summary.has_rejections());
    }

    #[test]
    fn efficiency_spikes_are_flagged() {
        let validator = SnapshotValidator::new(StoredEfficiency);
        let snapshots = [snapshot(1, 7, 0, 1_000, 0.0), snapshot(2, 7, 1, 2_000, 500.0)];
        let summary = audit_snapshots(&snapshots, &validator, at(30));
        assert!(summary.transitions[1].excessive_gains);
        assert!(!summary.transitions[1].accepted);
    }
}
