//! Experience curve and combat level formula.

use std::sync::OnceLock;

use crate::constants::{MAX_LEVEL, MAX_VIRTUAL_LEVEL};
use crate::numbers::{floor_f64_to_i64, floor_f64_to_u32};

/// Experience needed for each level, indexed by level (index 0 unused).
fn experience_table() -> &'static [i64] {
    static TABLE: OnceLock<Vec<i64>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = vec![0_i64; MAX_VIRTUAL_LEVEL as usize + 1];
        let mut points = 0.0_f64;
        for level in 2..=MAX_VIRTUAL_LEVEL {
            let previous = f64::from(level - 1);
            points += (previous + 300.0 * 2.0_f64.powf(previous / 7.0)).floor();
            table[level as usize] = floor_f64_to_i64(points / 4.0);
        }
        table
    })
}

/// Minimum experience for `level`, clamped to `1..=126`.
#[must_use]
pub fn experience_for_level(level: u32) -> i64 {
    let level = level.clamp(1, MAX_VIRTUAL_LEVEL) as usize;
    experience_table()[level]
}

/// Level reached with `experience`, capped at 99.
///
/// Unranked (`None`) or negative experience counts as level 1.
#[must_use]
pub fn level_from_experience(experience: Option<i64>) -> u32 {
    level_up_to(experience, MAX_LEVEL)
}

/// Like [`level_from_experience`] but continues the curve up to level 126.
#[must_use]
pub fn virtual_level_from_experience(experience: Option<i64>) -> u32 {
    level_up_to(experience, MAX_VIRTUAL_LEVEL)
}

fn level_up_to(experience: Option<i64>, cap: u32) -> u32 {
    let Some(exp) = experience.filter(|e| *e >= 0) else {
        return 1;
    };
    let table = experience_table();
    (2..=cap)
        .take_while(|level| table[*level as usize] <= exp)
        .last()
        .unwrap_or(1)
}

/// Combat level from the seven combat skill levels.
///
/// Inputs are levels, not experience. A zero level marks incomplete data and
/// yields 0.
#[must_use]
pub fn combat_level(
    attack: u32,
    strength: u32,
    defence: u32,
    ranged: u32,
    magic: u32,
    hitpoints: u32,
    prayer: u32,
) -> u32 {
    if [attack, strength, defence, ranged, magic, hitpoints, prayer].contains(&0) {
        return 0;
    }

    let base = 0.25 * f64::from(defence + hitpoints.max(10) + prayer / 2);
    let melee = 0.325 * f64::from(attack + strength);
    let range = 0.325 * f64::from(ranged * 3 / 2);
    let mage = 0.325 * f64::from(magic * 3 / 2);

    floor_f64_to_u32(base + melee.max(range).max(mage))
}
