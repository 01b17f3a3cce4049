//! Stats derived from a single snapshot: total and combat level, account
//! build classification, and experience aggregates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoEnumIterator};

use crate::constants::MIN_COMBAT_LEVEL;
use crate::levels::{combat_level, level_from_experience};
use crate::metrics::{
    Boss, COMBAT_SKILLS, F2P_BOSSES, MAX_SKILL_EXP, MEMBER_SKILLS, Skill, real_skills,
};
use crate::snapshot::Snapshot;

/// Account build inferred from a snapshot's levels and boss kills.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerBuild {
    Main,
    F2p,
    Lvl3,
    Zerker,
    Def1,
    Hp10,
}

fn level(snapshot: &Snapshot, skill: Skill) -> u32 {
    level_from_experience(snapshot.experience(skill))
}

/// Sum of levels over every skill except overall.
#[must_use]
pub fn total_level(snapshot: &Snapshot) -> u32 {
    real_skills().map(|skill| level(snapshot, skill)).sum()
}

/// Combat level of the snapshot, or 3 when there is none.
#[must_use]
pub fn combat_level_from_snapshot(snapshot: Option<&Snapshot>) -> u32 {
    let Some(snapshot) = snapshot else {
        return MIN_COMBAT_LEVEL;
    };

    let [attack, strength, defence, ranged, magic, hitpoints, prayer] =
        COMBAT_SKILLS.map(|skill| level(snapshot, skill));
    combat_level(attack, strength, defence, ranged, magic, hitpoints, prayer)
}

/// No members skill above level 1 and no kills on a members-only boss.
#[must_use]
pub fn is_f2p(snapshot: &Snapshot) -> bool {
    let has_member_stats = MEMBER_SKILLS.iter().any(|s| level(snapshot, *s) > 1);
    let has_boss_kc = Boss::iter()
        .filter(|b| !F2P_BOSSES.contains(b))
        .any(|b| snapshot.kills(b).is_some_and(|kills| kills > 0));

    !has_member_stats && !has_boss_kc
}

#[must_use]
pub fn is_lvl3(snapshot: &Snapshot) -> bool {
    combat_level_from_snapshot(Some(snapshot)) <= MIN_COMBAT_LEVEL
}

#[must_use]
pub fn is_1def(snapshot: &Snapshot) -> bool {
    level(snapshot, Skill::Defence) == 1
}

#[must_use]
pub fn is_10hp(snapshot: &Snapshot) -> bool {
    combat_level_from_snapshot(Some(snapshot)) > MIN_COMBAT_LEVEL
        && level(snapshot, Skill::Hitpoints) == 10
}

#[must_use]
pub fn is_zerker(snapshot: &Snapshot) -> bool {
    level(snapshot, Skill::Defence) == 45
}

/// Classify the account build.
///
/// 10 HP accounts usually have 1 defence too, so the hitpoints check runs
/// before the defence one.
#[must_use]
pub fn player_build(snapshot: &Snapshot) -> PlayerBuild {
    if is_f2p(snapshot) {
        PlayerBuild::F2p
    } else if is_lvl3(snapshot) {
        PlayerBuild::Lvl3
    } else if is_10hp(snapshot) {
        PlayerBuild::Hp10
    } else if is_1def(snapshot) {
        PlayerBuild::Def1
    } else if is_zerker(snapshot) {
        PlayerBuild::Zerker
    } else {
        PlayerBuild::Main
    }
}

/// Number of skills at the 200m experience cap.
#[must_use]
pub fn count_200ms(snapshot: &Snapshot) -> usize {
    real_skills()
        .filter(|s| snapshot.experience(*s) == Some(MAX_SKILL_EXP))
        .count()
}

/// Lowest experience across real skills; unranked skills count as 0.
#[must_use]
pub fn minimum_experience(snapshot: &Snapshot) -> i64 {
    real_skills()
        .map(|s| snapshot.experience(s).unwrap_or(0).max(0))
        .min()
        .unwrap_or(0)
}

/// Experience summed across real skills with each skill capped at `cap`.
///
/// Unranked skills contribute nothing.
#[must_use]
pub fn capped_experience(snapshot: &Snapshot, cap: i64) -> i64 {
    real_skills()
        .filter_map(|s| snapshot.experience(s))
        .map(|exp| exp.min(cap))
        .sum()
}
