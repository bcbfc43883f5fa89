//! Crafting and item enhancement — craft from materials, enchant to append
//! a stat line, reroll one line's tier and value.

use crate::core::constants::{CRAFT_MATERIAL_COST, ENCHANT_BASE_COST, REROLL_BASE_COST};
use crate::core::game_state::GameState;
use crate::items::generation::{roll_affix, roll_stat_tier, stat_budget, tier_multiplier};
use crate::items::rarity::{roll_rarity, RarityContext};
use crate::items::scoring::{potential_score, visual_tier_for};
use crate::items::types::{Item, ItemKind};
use rand::Rng;

/// Rarity-roll bias applied to crafted items over dropped ones.
const CRAFT_RANK_SHIFT: f64 = 2.0;

/// Crafts a fresh item of the chosen kind from a named material. The item
/// level tracks the strongest roster member; the forge upgrade raises the
/// stat budget.
pub fn craft_item<R: Rng>(
    state: &mut GameState,
    kind: ItemKind,
    material: &str,
    rng: &mut R,
) -> Option<String> {
    let held = state.materials.get(material).copied().unwrap_or(0);
    if held < CRAFT_MATERIAL_COST || state.inventory.len() >= state.inventory_capacity() {
        return None;
    }
    let level = state.roster.iter().map(|a| a.level).max().unwrap_or(1);

    let ctx = RarityContext {
        contract_tier: 0,
        rarity_bonus_percent: state.rarity_bonus_percent(),
        pity: 0,
        reset_count: state.reset_count,
        rank_shift: CRAFT_RANK_SHIFT,
    };
    let rarity = roll_rarity(&ctx, rng);
    let item = crate::items::generation::generate_item(
        kind,
        rarity,
        level,
        state.crafting_bonus_percent(),
        rng,
    );

    state
        .materials
        .insert(material.to_string(), held - CRAFT_MATERIAL_COST);
    state.statistics.items_generated += 1;
    let id = item.id.clone();
    state.inventory.push(item);
    Some(id)
}

/// Appends one freshly rolled stat line, up to the rarity's line cap.
/// Works on inventory and equipped items alike; the conservative stat view
/// catches mid-run enchants through the stat-line mismatch rule.
pub fn enchant_item<R: Rng>(state: &mut GameState, item_id: &str, rng: &mut R) -> bool {
    let Some((existing, rarity, level)) = find_item(state, item_id)
        .map(|item| (item.stats.clone(), item.rarity, item.power_level))
    else {
        return false;
    };
    if existing.len() >= rarity.max_stat_lines() {
        return false;
    }
    let cost = ENCHANT_BASE_COST * existing.len().max(1) as u64;
    if state.gold < cost {
        return false;
    }

    let budget = stat_budget(level, rarity, 0.0);
    let Some(line) = roll_affix(&existing, budget, level, rng) else {
        return false;
    };

    state.gold -= cost;
    if let Some(item) = find_item_mut(state, item_id) {
        item.stats.push(line);
        refresh_derived(item);
        true
    } else {
        false
    }
}

/// Rerolls one stat line's tier, rescaling its value by the tier-multiplier
/// ratio. Tier-0 unique lines cannot be rerolled.
pub fn reroll_item_stat<R: Rng>(
    state: &mut GameState,
    item_id: &str,
    stat_index: usize,
    rng: &mut R,
) -> bool {
    let line = match find_item(state, item_id) {
        Some(item) => item.stats.get(stat_index).cloned(),
        None => return false,
    };
    let Some(line) = line else {
        return false;
    };
    if line.tier == 0 {
        return false;
    }
    let rarity = match find_item(state, item_id) {
        Some(item) => item.rarity,
        None => return false,
    };
    let cost = REROLL_BASE_COST * (rarity.index() as u64 + 1);
    if state.gold < cost {
        return false;
    }

    let new_tier = roll_stat_tier(rng);
    let ratio = tier_multiplier(new_tier) / tier_multiplier(line.tier);
    let new_value = if line.is_percent {
        ((line.value * ratio) * 100.0).round() / 100.0
    } else {
        (line.value * ratio).round().max(1.0)
    };

    state.gold -= cost;
    if let Some(item) = find_item_mut(state, item_id) {
        item.stats[stat_index].tier = new_tier;
        item.stats[stat_index].value = new_value;
        refresh_derived(item);
        true
    } else {
        false
    }
}

fn refresh_derived(item: &mut Item) {
    item.potential = potential_score(&item.stats, item.rarity, item.power_level);
    item.visual_tier = visual_tier_for(item.potential);
}

/// Looks an item up in the inventory first, then in every loadout.
fn find_item<'a>(state: &'a GameState, item_id: &str) -> Option<&'a Item> {
    if let Some(item) = state.inventory.iter().find(|item| item.id == item_id) {
        return Some(item);
    }
    for adventurer in &state.roster {
        for (_, item) in adventurer.loadout.iter_equipped() {
            if item.id == item_id {
                return Some(item);
            }
        }
    }
    None
}

fn find_item_mut<'a>(state: &'a mut GameState, item_id: &str) -> Option<&'a mut Item> {
    let in_inventory = state.inventory.iter().any(|item| item.id == item_id);
    if in_inventory {
        return state.inventory.iter_mut().find(|item| item.id == item_id);
    }
    for adventurer in &mut state.roster {
        let slots = [
            &mut adventurer.loadout.weapon,
            &mut adventurer.loadout.armor,
            &mut adventurer.loadout.trinket,
        ];
        for slot in slots {
            if let Some(item) = slot {
                if item.id == item_id {
                    return Some(item);
                }
            }
        }
    }
    None
}
