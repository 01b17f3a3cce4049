//! Centralized tuning constants for snapshot validation and derived stats.
//!
//! The gain rules can be overridden through `GainRules` JSON, but the
//! defaults below are what the embedded rule file ships with.

use crate::metrics::Metric;

/// Raw encoding of an unranked value or rank at the JSON boundary.
pub const UNRANKED_SENTINEL: i64 = -1;

/// Id carried by synthetic snapshots (averages) that belong to no player.
pub const SYNTHETIC_ID: i64 = -1;

/// Smallest elapsed window, in hours, used when checking excessive gains.
pub const MIN_ELAPSED_HOURS: f64 = 120.0;

/// Lowest possible combat level, returned when there is no snapshot.
pub const MIN_COMBAT_LEVEL: u32 = 3;

/// Highest regular skill level.
pub const MAX_LEVEL: u32 = 99;

/// Highest virtual skill level (200m experience sits just above it).
pub const MAX_VIRTUAL_LEVEL: u32 = 126;

/// Metrics allowed to decrease between two snapshots.
///
/// Efficiency values move when their formulas change, and LMS / PvP Arena
/// scores are ratings rather than counters.
pub const NEGATIVE_GAINS_IGNORED: [Metric; 4] = [
    Metric::EHP,
    Metric::EHB,
    Metric::LAST_MAN_STANDING,
    Metric::PVP_ARENA,
];

/// Metrics whose growth alone does not make a snapshot worth keeping.
pub const CHANGE_IGNORED: [Metric; 2] = [Metric::EHP, Metric::EHB];
