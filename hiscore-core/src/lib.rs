//! Hiscore Snapshot Engine
//!
//! Pure computation over point-in-time hiscore snapshots: gain validation
//! between consecutive snapshots, derived stats and account classification,
//! per-metric leaderboards and group averages.
//! This crate performs no I/O; efficiency hours are supplied through
//! [`EfficiencyProvider`].

pub mod average;
pub mod constants;
pub mod efficiency;
pub mod error;
pub mod format;
pub mod leaders;
pub mod levels;
pub mod metrics;
pub mod numbers;
pub mod snapshot;
pub mod stats;
pub mod validation;

// Re-export commonly used types
pub use average::{SentinelPolicy, average, average_with};
pub use constants::{CHANGE_IGNORED, NEGATIVE_GAINS_IGNORED};
pub use efficiency::{EfficiencyMap, EfficiencyProvider, StoredEfficiency};
pub use error::SnapshotError;
pub use format::{
    ActivityValue, BossValue, ComputedValue, FormattedSnapshot, SkillValue, SnapshotData, format,
};
pub use leaders::{
    Leader, MetricLeaderboard, MetricLeaders, Player, assign_players_to_metric_leaders,
    get_metric_leaders,
};
pub use levels::{
    combat_level, experience_for_level, level_from_experience, virtual_level_from_experience,
};
pub use metrics::{Activity, Boss, ComputedMetric, Measure, Metric, Skill};
pub use snapshot::{Ranked, RawSnapshot, Snapshot};
pub use stats::{
    PlayerBuild, capped_experience, combat_level_from_snapshot, count_200ms, is_1def, is_10hp,
    is_f2p, is_lvl3, is_zerker, minimum_experience, player_build, total_level,
};
pub use validation::{GainAssessment, GainRules, SnapshotValidator};
