use serde::{Deserialize, Serialize};

/// Item rarity ladder, from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
}

/// Fixed sampling order for rarity rolls.
pub const RARITY_ORDER: [Rarity; 5] = [
    Rarity::Common,
    Rarity::Uncommon,
    Rarity::Rare,
    Rarity::Epic,
    Rarity::Legendary,
];

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Number of bonus stat lines rolled in addition to the primary line.
    pub fn bonus_stat_count(&self) -> usize {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
        }
    }

    /// Maximum stat lines an item of this rarity may carry, including the
    /// primary line and a possible tier-0 unique line.
    pub fn max_stat_lines(&self) -> usize {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 3,
            Rarity::Epic => 5,
            Rarity::Legendary => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Armor,
    Trinket,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "Weapon",
            ItemKind::Armor => "Armor",
            ItemKind::Trinket => "Trinket",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Sword,
    Bow,
    Focus,
}

/// Named stat carried by stat lines and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Damage,
    Health,
    Speed,
    CritChance,
    GoldGain,
    XpGain,
    LootLuck,
}

impl StatKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Damage => "Damage",
            StatKind::Health => "Health",
            StatKind::Speed => "Speed",
            StatKind::CritChance => "Crit Chance",
            StatKind::GoldGain => "Gold Gain",
            StatKind::XpGain => "XP Gain",
            StatKind::LootLuck => "Loot Luck",
        }
    }

    pub fn all() -> [StatKind; 7] {
        [
            StatKind::Damage,
            StatKind::Health,
            StatKind::Speed,
            StatKind::CritChance,
            StatKind::GoldGain,
            StatKind::XpGain,
            StatKind::LootLuck,
        ]
    }

    /// Stats that roll as percentage lines on items (the rest roll flat).
    pub fn rolls_as_percent(&self) -> bool {
        !matches!(self, StatKind::Damage | StatKind::Health)
    }
}

/// How a modifier perturbs a stat accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModOp {
    /// Adds to the flat bucket. For CritChance the value is percentage points.
    Flat,
    /// Adds to the percent bucket.
    Percent,
}

/// A pure data description of one stat perturbation. Traits, skill nodes,
/// set bonuses and unique effects are all expressed this way and consumed
/// by a single interpreter in the stat resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatKind,
    pub op: ModOp,
    pub value: f64,
}

impl StatModifier {
    pub const fn flat(stat: StatKind, value: f64) -> Self {
        Self {
            stat,
            op: ModOp::Flat,
            value,
        }
    }

    pub const fn percent(stat: StatKind, value: f64) -> Self {
        Self {
            stat,
            op: ModOp::Percent,
            value,
        }
    }
}

/// One rolled stat line on an item.
///
/// Tier 1 is the best roll and tier 7 the worst; tier 0 marks the special
/// line contributed by a unique effect, which the stat resolver applies
/// through the unique-effect catalogue rather than the line itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub stat: StatKind,
    pub value: f64,
    pub is_percent: bool,
    pub tier: u8,
}

/// Coarse at-a-glance quality grade derived from an item's potential score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VisualTier {
    D,
    C,
    B,
    A,
    S,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    pub weapon_kind: Option<WeaponKind>,
    pub rarity: Rarity,
    pub power_level: u32,
    pub stats: Vec<StatLine>,
    pub scrap_value: u64,
    pub potential: f64,
    pub visual_tier: VisualTier,
    #[serde(default)]
    pub set_id: Option<String>,
    #[serde(default)]
    pub unique_effect: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
}

impl Item {
    pub fn has_stat(&self, stat: StatKind) -> bool {
        self.stats.iter().any(|line| line.stat == stat)
    }

    /// Display label, e.g. "Epic Weapon of the Deep Vault".
    pub fn label(&self) -> String {
        match &self.flavor {
            Some(flavor) => format!("{} {} {}", self.rarity.name(), self.kind.name(), flavor),
            None => format!("{} {}", self.rarity.name(), self.kind.name()),
        }
    }
}

/// Equipment sets. Bonuses unlock at the listed piece count.
pub const SET_IDS: [&str; 3] = ["wolfpack", "tideborn", "emberguard"];

const WOLFPACK_2: [StatModifier; 1] = [StatModifier::percent(StatKind::Damage, 8.0)];
const WOLFPACK_3: [StatModifier; 2] = [
    StatModifier::percent(StatKind::Damage, 15.0),
    StatModifier::flat(StatKind::CritChance, 3.0),
];
const TIDEBORN_2: [StatModifier; 1] = [StatModifier::percent(StatKind::LootLuck, 10.0)];
const TIDEBORN_3: [StatModifier; 2] = [
    StatModifier::percent(StatKind::LootLuck, 18.0),
    StatModifier::percent(StatKind::GoldGain, 10.0),
];
const EMBERGUARD_2: [StatModifier; 1] = [StatModifier::percent(StatKind::Health, 10.0)];
const EMBERGUARD_3: [StatModifier; 2] = [
    StatModifier::percent(StatKind::Health, 20.0),
    StatModifier::percent(StatKind::XpGain, 8.0),
];

/// Bonus modifiers granted by `set_id` at `pieces` equipped pieces.
/// Bonuses do not stack across thresholds; the highest met threshold wins.
pub fn set_bonus(set_id: &str, pieces: usize) -> &'static [StatModifier] {
    match (set_id, pieces) {
        ("wolfpack", 2) => &WOLFPACK_2,
        ("wolfpack", n) if n >= 3 => &WOLFPACK_3,
        ("tideborn", 2) => &TIDEBORN_2,
        ("tideborn", n) if n >= 3 => &TIDEBORN_3,
        ("emberguard", 2) => &EMBERGUARD_2,
        ("emberguard", n) if n >= 3 => &EMBERGUARD_3,
        _ => &[],
    }
}

/// Unique item effects. Each id maps to the modifiers the stat resolver
/// applies and to the tier-0 display line the generator embeds.
pub const UNIQUE_IDS: [&str; 3] = ["bulwark_of_ages", "headsman_edge", "midas_touch"];

const BULWARK: [StatModifier; 1] = [StatModifier::percent(StatKind::Health, 25.0)];
const HEADSMAN: [StatModifier; 2] = [
    StatModifier::percent(StatKind::Damage, 15.0),
    StatModifier::flat(StatKind::CritChance, 5.0),
];
const MIDAS: [StatModifier; 1] = [StatModifier::percent(StatKind::GoldGain, 20.0)];

pub fn unique_effect_modifiers(id: &str) -> &'static [StatModifier] {
    match id {
        "bulwark_of_ages" => &BULWARK,
        "headsman_edge" => &HEADSMAN,
        "midas_touch" => &MIDAS,
        _ => &[],
    }
}

/// The headline stat shown on a unique's tier-0 line.
pub fn unique_display_line(id: &str) -> Option<StatLine> {
    let modifier = unique_effect_modifiers(id).first()?;
    Some(StatLine {
        stat: modifier.stat,
        value: modifier.value,
        is_percent: matches!(modifier.op, ModOp::Percent),
        tier: 0,
    })
}
