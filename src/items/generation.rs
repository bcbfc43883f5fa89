//! Item generation — stat budget, tiered stat lines, affixes, sets,
//! uniques, scrap value.

use crate::core::constants::{
    AFFIX_DAMAGE_SCALING, AFFIX_HEALTH_SCALING, AFFIX_PERCENT_BASE, AFFIX_PERCENT_PER_LEVEL,
    ARMOR_HEALTH_SCALING, BUDGET_PER_LEVEL, FLAVOR_TIER_THRESHOLD, RARITY_BUDGET_MULTIPLIERS,
    SCRAP_AFFIX_FACTOR, SCRAP_SET_MULTIPLIER, SCRAP_UNIQUE_MULTIPLIER, SET_CHANCE_BY_RARITY,
    TIER_MULTIPLIERS, TIER_WEIGHTS, TRINKET_DAMAGE_SCALING, TRINKET_HEALTH_SCALING,
    UNIQUE_CHANCE_EPIC, UNIQUE_CHANCE_LEGENDARY,
};
use crate::items::scoring::{potential_score, visual_tier_for};
use crate::items::types::{
    unique_display_line, Item, ItemKind, Rarity, StatKind, StatLine, WeaponKind, SET_IDS,
    UNIQUE_IDS,
};
use rand::Rng;
use uuid::Uuid;

const FLAVOR_TAGS: [&str; 6] = [
    "of the Deep Vault",
    "of the First Watch",
    "of Hollow Kings",
    "of the Long Road",
    "of Silent Oaths",
    "of the Last Ember",
];

/// Stat budget for an item of the given power level and rarity.
/// `crafting_bonus_percent` comes from the forge upgrade (0 for drops).
pub fn stat_budget(level: u32, rarity: Rarity, crafting_bonus_percent: f64) -> f64 {
    BUDGET_PER_LEVEL
        * level.max(1) as f64
        * RARITY_BUDGET_MULTIPLIERS[rarity.index()]
        * (1.0 + crafting_bonus_percent / 100.0)
}

/// Rolls a stat-line tier (1..=7) from the fixed tier weight table.
pub fn roll_stat_tier<R: Rng>(rng: &mut R) -> u8 {
    let total: f64 = TIER_WEIGHTS.iter().sum();
    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (idx, weight) in TIER_WEIGHTS.iter().enumerate() {
        cumulative += weight;
        if roll < cumulative {
            return (idx + 1) as u8;
        }
    }
    TIER_WEIGHTS.len() as u8
}

/// Budget multiplier for a rolled tier (tier 1 best).
pub fn tier_multiplier(tier: u8) -> f64 {
    TIER_MULTIPLIERS[(tier.clamp(1, 7) - 1) as usize]
}

/// Generates one concrete item of the given kind, rarity, and power level.
pub fn generate_item<R: Rng>(
    kind: ItemKind,
    rarity: Rarity,
    level: u32,
    crafting_bonus_percent: f64,
    rng: &mut R,
) -> Item {
    let budget = stat_budget(level, rarity, crafting_bonus_percent);

    let primary_tier = roll_stat_tier(rng);
    let primary_budget = budget * tier_multiplier(primary_tier);
    let primary = primary_stat_line(kind, primary_budget, primary_tier, rng);

    let mut stats = vec![primary];
    for _ in 0..rarity.bonus_stat_count() {
        if let Some(line) = roll_affix(&stats, budget, level, rng) {
            stats.push(line);
        }
    }

    let set_id = if rng.gen_bool(SET_CHANCE_BY_RARITY[rarity.index()]) {
        Some(SET_IDS[rng.gen_range(0..SET_IDS.len())].to_string())
    } else {
        None
    };

    let unique_chance = match rarity {
        Rarity::Legendary => UNIQUE_CHANCE_LEGENDARY,
        Rarity::Epic => UNIQUE_CHANCE_EPIC,
        _ => 0.0,
    };
    let unique_effect = if unique_chance > 0.0 && rng.gen_bool(unique_chance) {
        let id = UNIQUE_IDS[rng.gen_range(0..UNIQUE_IDS.len())];
        if let Some(line) = unique_display_line(id) {
            stats.push(line);
        }
        Some(id.to_string())
    } else {
        None
    };

    let flavor = if primary_tier <= FLAVOR_TIER_THRESHOLD {
        Some(FLAVOR_TAGS[rng.gen_range(0..FLAVOR_TAGS.len())].to_string())
    } else {
        None
    };

    let affix_count = stats.len().saturating_sub(1);
    let scrap_value = scrap_value(budget, affix_count, set_id.is_some(), unique_effect.is_some());

    let weapon_kind = match kind {
        ItemKind::Weapon => Some(match rng.gen_range(0..3) {
            0 => WeaponKind::Sword,
            1 => WeaponKind::Bow,
            _ => WeaponKind::Focus,
        }),
        _ => None,
    };

    let potential = potential_score(&stats, rarity, level);
    let visual_tier = visual_tier_for(potential);

    Item {
        id: Uuid::new_v4().to_string(),
        kind,
        weapon_kind,
        rarity,
        power_level: level,
        stats,
        scrap_value,
        potential,
        visual_tier,
        set_id,
        unique_effect,
        flavor,
    }
}

/// The primary line: weapons roll damage, armor rolls health at 5x scaling,
/// trinkets split 50/50 between half-damage and 2.5x health.
fn primary_stat_line<R: Rng>(kind: ItemKind, budget: f64, tier: u8, rng: &mut R) -> StatLine {
    let (stat, value) = match kind {
        ItemKind::Weapon => (StatKind::Damage, budget),
        ItemKind::Armor => (StatKind::Health, budget * ARMOR_HEALTH_SCALING),
        ItemKind::Trinket => {
            if rng.gen_bool(0.5) {
                (StatKind::Damage, budget * TRINKET_DAMAGE_SCALING)
            } else {
                (StatKind::Health, budget * TRINKET_HEALTH_SCALING)
            }
        }
    };
    StatLine {
        stat,
        value: value.round().max(1.0),
        is_percent: false,
        tier,
    }
}

/// Rolls one bonus affix from the stat pool, excluding stats already present.
/// Returns None only when the pool is exhausted.
pub fn roll_affix<R: Rng>(
    existing: &[StatLine],
    budget: f64,
    level: u32,
    rng: &mut R,
) -> Option<StatLine> {
    let pool: Vec<StatKind> = StatKind::all()
        .into_iter()
        .filter(|stat| !existing.iter().any(|line| line.stat == *stat))
        .collect();
    if pool.is_empty() {
        return None;
    }

    let stat = pool[rng.gen_range(0..pool.len())];
    let tier = roll_stat_tier(rng);
    Some(affix_line(stat, tier, budget, level))
}

/// Value formula for a single affix of the given stat and tier.
pub fn affix_line(stat: StatKind, tier: u8, budget: f64, level: u32) -> StatLine {
    let mult = tier_multiplier(tier);
    if stat.rolls_as_percent() {
        let value = (AFFIX_PERCENT_BASE + level as f64 * AFFIX_PERCENT_PER_LEVEL) * mult;
        StatLine {
            stat,
            value: (value * 100.0).round() / 100.0,
            is_percent: true,
            tier,
        }
    } else {
        let scaling = match stat {
            StatKind::Health => AFFIX_HEALTH_SCALING,
            _ => AFFIX_DAMAGE_SCALING,
        };
        StatLine {
            stat,
            value: (budget * scaling * mult).round().max(1.0),
            is_percent: false,
            tier,
        }
    }
}

fn scrap_value(budget: f64, affix_count: usize, has_set: bool, has_unique: bool) -> u64 {
    let mut value = budget * (1.0 + SCRAP_AFFIX_FACTOR * affix_count as f64);
    if has_set {
        value *= SCRAP_SET_MULTIPLIER;
    }
    if has_unique {
        value *= SCRAP_UNIQUE_MULTIPLIER;
    }
    (value as u64).max(1)
}
