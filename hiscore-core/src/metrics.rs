//! Metric catalog: every tracked skill, boss, activity and computed metric.
//!
//! Catalog order is skills, activities, bosses, computed metrics. Each metric
//! owns a snake_case key, and the raw snapshot fields holding its value and
//! rank are derived from that key (`attackExperience`, `zulrahKills`,
//! `clue_scrolls_allScore`, `ehpValue`, `attackRank`, ...).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::SnapshotError;

/// Experience cap for a single skill.
pub const MAX_SKILL_EXP: i64 = 200_000_000;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Skill {
    Overall,
    Attack,
    Defence,
    Strength,
    Hitpoints,
    Ranged,
    Prayer,
    Magic,
    Cooking,
    Woodcutting,
    Fletching,
    Fishing,
    Firemaking,
    Crafting,
    Smithing,
    Mining,
    Herblore,
    Agility,
    Thieving,
    Slayer,
    Farming,
    Runecrafting,
    Hunter,
    Construction,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Activity {
    LeaguePoints,
    BountyHunterHunter,
    BountyHunterRogue,
    ClueScrollsAll,
    ClueScrollsBeginner,
    ClueScrollsEasy,
    ClueScrollsMedium,
    ClueScrollsHard,
    ClueScrollsElite,
    ClueScrollsMaster,
    LastManStanding,
    PvpArena,
    SoulWarsZeal,
    GuardiansOfTheRift,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Boss {
    AbyssalSire,
    AlchemicalHydra,
    BarrowsChests,
    Bryophyta,
    Callisto,
    Cerberus,
    ChambersOfXeric,
    ChambersOfXericChallengeMode,
    ChaosElemental,
    ChaosFanatic,
    CommanderZilyana,
    CorporealBeast,
    CrazyArchaeologist,
    DagannothPrime,
    DagannothRex,
    DagannothSupreme,
    DerangedArchaeologist,
    GeneralGraardor,
    GiantMole,
    GrotesqueGuardians,
    Hespori,
    KalphiteQueen,
    KingBlackDragon,
    Kraken,
    Kreearra,
    KrilTsutsaroth,
    Mimic,
    Nex,
    Nightmare,
    PhosanisNightmare,
    Obor,
    Sarachnis,
    Scorpia,
    Skotizo,
    Tempoross,
    TheGauntlet,
    TheCorruptedGauntlet,
    TheatreOfBlood,
    TheatreOfBloodHardMode,
    ThermonuclearSmokeDevil,
    TombsOfAmascut,
    TombsOfAmascutExpert,
    TzkalZuk,
    TztokJad,
    Venenatis,
    Vetion,
    Vorkath,
    Wintertodt,
    Zalcano,
    Zulrah,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComputedMetric {
    Ehp,
    Ehb,
}

/// What a metric's value field measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Experience,
    Kills,
    Score,
    Value,
}

impl Measure {
    #[must_use]
    pub const fn field_suffix(self) -> &'static str {
        match self {
            Self::Experience => "Experience",
            Self::Kills => "Kills",
            Self::Score => "Score",
            Self::Value => "Value",
        }
    }
}

/// Any tracked metric. Ordering follows catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Skill(Skill),
    Activity(Activity),
    Boss(Boss),
    Computed(ComputedMetric),
}

impl Metric {
    pub const OVERALL: Self = Self::Skill(Skill::Overall);
    pub const EHP: Self = Self::Computed(ComputedMetric::Ehp);
    pub const EHB: Self = Self::Computed(ComputedMetric::Ehb);
    pub const LAST_MAN_STANDING: Self = Self::Activity(Activity::LastManStanding);
    pub const PVP_ARENA: Self = Self::Activity(Activity::PvpArena);

    /// Total number of metrics in the catalog.
    pub const COUNT: usize = Skill::COUNT + Activity::COUNT + Boss::COUNT + ComputedMetric::COUNT;

    /// Every metric in catalog order.
    pub fn all() -> impl Iterator<Item = Self> {
        Skill::iter()
            .map(Self::Skill)
            .chain(Activity::iter().map(Self::Activity))
            .chain(Boss::iter().map(Self::Boss))
            .chain(ComputedMetric::iter().map(Self::Computed))
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Skill(s) => s.into(),
            Self::Activity(a) => a.into(),
            Self::Boss(b) => b.into(),
            Self::Computed(c) => c.into(),
        }
    }

    #[must_use]
    pub const fn measure(self) -> Measure {
        match self {
            Self::Skill(_) => Measure::Experience,
            Self::Activity(_) => Measure::Score,
            Self::Boss(_) => Measure::Kills,
            Self::Computed(_) => Measure::Value,
        }
    }

    /// Raw snapshot field holding this metric's value.
    #[must_use]
    pub fn value_key(self) -> String {
        format!("{}{}", self.key(), self.measure().field_suffix())
    }

    /// Raw snapshot field holding this metric's rank.
    #[must_use]
    pub fn rank_key(self) -> String {
        format!("{}Rank", self.key())
    }

    #[must_use]
    pub const fn is_skill(self) -> bool {
        matches!(self, Self::Skill(_))
    }
}

impl From<Skill> for Metric {
    fn from(value: Skill) -> Self {
        Self::Skill(value)
    }
}

impl From<Activity> for Metric {
    fn from(value: Activity) -> Self {
        Self::Activity(value)
    }
}

impl From<Boss> for Metric {
    fn from(value: Boss) -> Self {
        Self::Boss(value)
    }
}

impl From<ComputedMetric> for Metric {
    fn from(value: ComputedMetric) -> Self {
        Self::Computed(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        if let Ok(skill) = Skill::from_str(&key) {
            return Ok(Self::Skill(skill));
        }
        if let Ok(activity) = Activity::from_str(&key) {
            return Ok(Self::Activity(activity));
        }
        if let Ok(boss) = Boss::from_str(&key) {
            return Ok(Self::Boss(boss));
        }
        if let Ok(computed) = ComputedMetric::from_str(&key) {
            return Ok(Self::Computed(computed));
        }
        Err(SnapshotError::UnknownMetric(s.to_string()))
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Every skill except the aggregate overall skill.
pub fn real_skills() -> impl Iterator<Item = Skill> {
    Skill::iter().filter(|s| *s != Skill::Overall)
}

/// Skills that can only be trained on a members account.
pub const MEMBER_SKILLS: [Skill; 8] = [
    Skill::Agility,
    Skill::Construction,
    Skill::Farming,
    Skill::Fletching,
    Skill::Herblore,
    Skill::Hunter,
    Skill::Thieving,
    Skill::Slayer,
];

/// Bosses that a free-to-play account can kill.
pub const F2P_BOSSES: [Boss; 2] = [Boss::Obor, Boss::Bryophyta];

/// The seven skills feeding the combat level formula.
pub const COMBAT_SKILLS: [Skill; 7] = [
    Skill::Attack,
    Skill::Strength,
    Skill::Defence,
    Skill::Ranged,
    Skill::Magic,
    Skill::Hitpoints,
    Skill::Prayer,
];
