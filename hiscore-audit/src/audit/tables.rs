use hiscore_core::numbers::i64_to_f64;
use hiscore_core::{FormattedSnapshot, Metric, MetricLeaders, SnapshotData};
use serde::Serialize;

/// One rendered line of a metric table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: Metric,
    pub value: Option<f64>,
    pub rank: Option<i64>,
    pub level: Option<u32>,
    pub player: Option<String>,
}

impl MetricRow {
    fn new(metric: Metric, value: Option<f64>, rank: Option<i64>) -> Self {
        Self {
            metric,
            value,
            rank,
            level: None,
            player: None,
        }
    }

    pub fn is_ranked(&self) -> bool {
        self.value.is_some()
    }

    pub fn display_value(&self) -> String {
        match (self.value, self.metric) {
            (None, _) => "-".to_string(),
            (Some(value), Metric::Computed(_)) => format!("{value:.2}"),
            (Some(value), _) => format!("{value:.0}"),
        }
    }

    pub fn display_rank(&self) -> String {
        self.rank.map_or_else(|| "-".to_string(), |rank| rank.to_string())
    }

    pub fn display_level(&self) -> String {
        self.level.map_or_else(String::new, |level| level.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTable {
    pub title: String,
    pub rows: Vec<MetricRow>,
}

impl MetricTable {
    /// Keep only metrics in `filter` (when given) and, unless `keep_unranked`
    /// is set, rows that hold a value. Skills are always kept.
    pub fn filtered(mut self, filter: Option<&[Metric]>, keep_unranked: bool) -> Self {
        self.rows.retain(|row| {
            filter.is_none_or(|metrics| metrics.contains(&row.metric))
                && (keep_unranked || row.metric.is_skill() || row.is_ranked())
        });
        self
    }
}

fn to_f64(value: Option<i64>) -> Option<f64> {
    value.map(i64_to_f64)
}

fn snapshot_rows(data: &SnapshotData) -> Vec<MetricRow> {
    let mut rows = Vec::new();
    for (skill, value) in &data.skills {
        let mut row = MetricRow::new(Metric::Skill(*skill), to_f64(value.experience), value.rank);
        row.level = Some(value.level);
        rows.push(row);
    }
    for (activity, value) in &data.activities {
        rows.push(MetricRow::new(
            Metric::Activity(*activity),
            to_f64(value.score),
            value.rank,
        ));
    }
    for (boss, value) in &data.bosses {
        rows.push(MetricRow::new(Metric::Boss(*boss), to_f64(value.kills), value.rank));
    }
    for (computed, value) in &data.computed {
        rows.push(MetricRow::new(Metric::Computed(*computed), value.value, value.rank));
    }
    rows
}

pub fn snapshot_table(title: String, snapshot: &FormattedSnapshot) -> MetricTable {
    MetricTable {
        title,
        rows: snapshot_rows(&snapshot.data),
    }
}

pub fn leader_table(leaders: &MetricLeaders) -> MetricTable {
    let mut rows = Vec::new();
    for (skill, leader) in &leaders.skills {
        let mut row = MetricRow::new(
            Metric::Skill(*skill),
            to_f64(leader.value.experience),
            leader.value.rank,
        );
        row.level = Some(leader.value.level);
        row.player = leader.player.as_ref().map(|p| p.display_name.clone());
        rows.push(row);
    }
    for (activity, leader) in &leaders.activities {
        let mut row = MetricRow::new(
            Metric::Activity(*activity),
            to_f64(leader.value.score),
            leader.value.rank,
        );
        row.player = leader.player.as_ref().map(|p| p.display_name.clone());
        rows.push(row);
    }
    for (boss, leader) in &leaders.bosses {
        let mut row = MetricRow::new(
            Metric::Boss(*boss),
            to_f64(leader.value.kills),
            leader.value.rank,
        );
        row.player = leader.player.as_ref().map(|p| p.display_name.clone());
        rows.push(row);
    }
    for (computed, leader) in &leaders.computed {
        let mut row = MetricRow::new(
            Metric::Computed(*computed),
            leader.value.value,
            leader.value.rank,
        );
        row.player = leader.player.as_ref().map(|p| p.display_name.clone());
        rows.push(row);
    }
    MetricTable {
        title: "Metric leaders".to_string(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiscore_core::{Boss, ComputedMetric, Player, Skill, Snapshot, format, get_metric_leaders};

    fn sample() -> Snapshot {
        Snapshot::new(1, 4, None)
            .with_skill(Skill::Attack, 1_154, 30)
            .with_boss(Boss::Obor, 3, 900)
            .with_computed(ComputedMetric::Ehp, 1.5, 70)
    }

    #[test]
    fn snapshot_table_hides_unranked_non_skills() {
        let formatted = format(Some(&sample()), None).unwrap();
        let table = snapshot_table("Snapshot 1".to_string(), &formatted).filtered(None, false);

        let metrics: Vec<Metric> = table.rows.iter().map(|r| r.metric).collect();
        assert!(metrics.contains(&Metric::Boss(Boss::Obor)));
        assert!(!metrics.contains(&Metric::Boss(Boss::Zulrah)));
        assert_eq!(metrics.iter().filter(|m| m.is_skill()).count(), 24);

        let attack = table
            .rows
            .iter()
            .find(|r| r.metric == Metric::Skill(Skill::Attack))
            .unwrap();
        assert_eq!(attack.display_value(), "1154");
        assert_eq!(attack.display_level(), "10");
        assert_eq!(attack.display_rank(), "30");
    }

    #[test]
    fn metric_filter_and_verbose_rows() {
        let formatted = format(Some(&sample()), None).unwrap();
        let filter = [Metric::EHP, Metric::Boss(Boss::Zulrah)];
        let table = snapshot_table("s".to_string(), &formatted).filtered(Some(&filter), true);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].display_value(), "-");
        assert_eq!(table.rows[1].display_value(), "1.50");
    }

    #[test]
    fn leader_table_names_players() {
        let board = get_metric_leaders(&[sample()]).unwrap().with_players(&[Player {
            id: 4,
            username: "iron".to_string(),
            display_name: "Iron".to_string(),
            build: None,
        }]);
        let table = leader_table(&board.leaders);
        assert!(table.rows.iter().all(|r| r.player.as_deref() == Some("Iron")));
        assert_eq!(table.rows.len(), Metric::COUNT);
    }
}
