//! Player-initiated operations. Every operation is soft-reject: when a
//! precondition fails it returns without touching the state, and the caller
//! cannot tell a rejection from a no-op except by comparing state.

use crate::character::recruit::roll_recruit;
use crate::character::skill_tree::{can_unlock, node, spent_points};
use crate::character::types::EquipSlot;
use crate::contracts::scheduler::record_equipment_change;
use crate::core::constants::{
    RECRUIT_BASE_COST, RESET_SHARD_GOLD_DIVISOR, TONIC_DURATION_SECS, TONIC_MATERIAL_COST,
};
use crate::core::game_state::{Buff, GameState};
use crate::core::upgrades::{
    permanent_upgrade_cost, permanent_upgrade_def, upgrade_cost, upgrade_def,
};
use crate::items::types::{ItemKind, Rarity, StatKind, StatModifier};
use rand::Rng;

/// Moves an inventory item into the matching equipment slot, swapping any
/// previous item back into the inventory. Equipping on a busy adventurer is
/// allowed but marks the slot as modified for that run.
pub fn equip_item(state: &mut GameState, adventurer_id: &str, item_id: &str) -> bool {
    let Some(index) = state.find_item_in_inventory(item_id) else {
        return false;
    };
    if state.adventurer(adventurer_id).is_none() {
        return false;
    }

    let item = state.inventory.remove(index);
    let slot = EquipSlot::for_kind(item.kind);
    let busy = state.is_busy(adventurer_id);

    let previous = match state.adventurer_mut(adventurer_id) {
        Some(adventurer) => adventurer.loadout.set(slot, Some(item)),
        None => return false,
    };
    if let Some(previous) = previous {
        state.inventory.push(previous);
    }
    if busy {
        record_equipment_change(state, adventurer_id, slot);
    }
    true
}

/// Returns the equipped item to the inventory. Rejected when the slot is
/// empty or the inventory is full (nothing is ever silently destroyed by
/// an unequip).
pub fn unequip_item(state: &mut GameState, adventurer_id: &str, slot: EquipSlot) -> bool {
    let has_item = state
        .adventurer(adventurer_id)
        .map(|adventurer| adventurer.loadout.get(slot).is_some())
        .unwrap_or(false);
    if !has_item || state.inventory.len() >= state.inventory_capacity() {
        return false;
    }

    let busy = state.is_busy(adventurer_id);
    let item = match state.adventurer_mut(adventurer_id) {
        Some(adventurer) => adventurer.loadout.set(slot, None),
        None => None,
    };
    match item {
        Some(item) => {
            state.inventory.push(item);
            if busy {
                record_equipment_change(state, adventurer_id, slot);
            }
            true
        }
        None => false,
    }
}

/// Destroys an inventory item for its scrap value.
pub fn salvage_item(state: &mut GameState, item_id: &str) -> bool {
    let Some(index) = state.find_item_in_inventory(item_id) else {
        return false;
    };
    let item = state.inventory.remove(index);
    state.gold += item.scrap_value;
    state.statistics.lifetime_gold += item.scrap_value;
    state.statistics.items_salvaged += 1;
    true
}

/// Salvages a batch; unknown ids are skipped. Returns how many were sold.
pub fn salvage_items(state: &mut GameState, item_ids: &[String]) -> usize {
    item_ids
        .iter()
        .filter(|id| salvage_item(state, id))
        .count()
}

/// Buys the next level of a gold upgrade.
pub fn purchase_upgrade(state: &mut GameState, upgrade_id: &str) -> bool {
    let Some(def) = upgrade_def(upgrade_id) else {
        return false;
    };
    let level = state.upgrade_level(upgrade_id);
    if level >= def.max_level {
        return false;
    }
    let cost = upgrade_cost(def, level);
    if state.gold < cost {
        return false;
    }
    state.gold -= cost;
    state.upgrades.insert(upgrade_id.to_string(), level + 1);
    true
}

/// Buys the next level of a permanent upgrade with reset shards.
pub fn purchase_permanent_upgrade(state: &mut GameState, upgrade_id: &str) -> bool {
    let Some(def) = permanent_upgrade_def(upgrade_id) else {
        return false;
    };
    let level = state.permanent_upgrade_level(upgrade_id);
    if level >= def.max_level {
        return false;
    }
    let cost = permanent_upgrade_cost(def, level);
    if state.reset_shards < cost {
        return false;
    }
    state.reset_shards -= cost;
    state
        .permanent_upgrades
        .insert(upgrade_id.to_string(), level + 1);
    true
}

/// Shards earned for a lifetime gold total: `floor(sqrt(gold / 1000))`.
pub fn reset_shards_for_lifetime_gold(lifetime_gold: u64) -> u64 {
    ((lifetime_gold / RESET_SHARD_GOLD_DIVISOR) as f64).sqrt().floor() as u64
}

/// Full progression reset: wipes the roster, inventory, runs, gold
/// upgrades, and unlocks; preserves permanent upgrades, shards, lifetime
/// statistics, and the loot filter; grants new shards against lifetime
/// earnings.
pub fn perform_reset(state: &mut GameState, now: i64) {
    let earned_total = reset_shards_for_lifetime_gold(state.statistics.lifetime_gold);
    let new_shards = earned_total.saturating_sub(state.reset_shards_granted);

    let mut next = GameState::new(now);
    next.reset_shards = state.reset_shards + new_shards;
    next.reset_shards_granted = state.reset_shards_granted + new_shards;
    next.reset_count = state.reset_count + 1;
    next.permanent_upgrades = state.permanent_upgrades.clone();
    next.loot_filter = state.loot_filter.clone();
    next.statistics = state.statistics.clone();
    next.statistics.resets += 1;
    *state = next;
}

/// Spends skill points to unlock a node, if its prerequisites are met.
pub fn unlock_skill_node(state: &mut GameState, adventurer_id: &str, node_id: &str) -> bool {
    let can = state
        .adventurer(adventurer_id)
        .map(|adventurer| can_unlock(adventurer, node_id))
        .unwrap_or(false);
    if !can {
        return false;
    }
    let Some(def) = node(node_id) else {
        return false;
    };
    if let Some(adventurer) = state.adventurer_mut(adventurer_id) {
        adventurer.skill_points -= def.cost;
        adventurer.unlocked_nodes.insert(node_id.to_string());
        true
    } else {
        false
    }
}

/// Refunds every spent skill point and clears the unlocked nodes.
pub fn respec_adventurer(state: &mut GameState, adventurer_id: &str) -> bool {
    let refund = state
        .adventurer(adventurer_id)
        .map(spent_points)
        .unwrap_or(0);
    if refund == 0 {
        return false;
    }
    if let Some(adventurer) = state.adventurer_mut(adventurer_id) {
        adventurer.skill_points += refund;
        adventurer.unlocked_nodes.clear();
        true
    } else {
        false
    }
}

/// Partial loot-filter update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct LootFilterUpdate {
    pub keep_stats: Option<Vec<StatKind>>,
    pub min_rarity: Option<Rarity>,
    pub keep_kinds: Option<Vec<ItemKind>>,
}

pub fn update_loot_filter(state: &mut GameState, update: LootFilterUpdate) {
    if let Some(keep_stats) = update.keep_stats {
        state.loot_filter.keep_stats = keep_stats;
    }
    if let Some(min_rarity) = update.min_rarity {
        state.loot_filter.min_rarity = min_rarity;
    }
    if let Some(keep_kinds) = update.keep_kinds {
        state.loot_filter.keep_kinds = keep_kinds;
    }
}

pub fn dismiss_report(state: &mut GameState, report_id: &str) -> bool {
    let before = state.reports.len();
    state.reports.retain(|report| report.id != report_id);
    state.reports.len() != before
}

/// Recruits a new adventurer for gold. Cost scales with roster size.
pub fn recruit_adventurer<R: Rng>(state: &mut GameState, rng: &mut R) -> Option<String> {
    let cost = RECRUIT_BASE_COST * state.roster.len() as u64;
    if state.gold < cost {
        return None;
    }
    state.gold -= cost;
    let recruit = roll_recruit(rng);
    let id = recruit.id.clone();
    state.roster.push(recruit);
    Some(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TonicKind {
    Might,
    Haste,
    Fortune,
}

impl TonicKind {
    fn id(&self) -> &'static str {
        match self {
            TonicKind::Might => "might_tonic",
            TonicKind::Haste => "haste_tonic",
            TonicKind::Fortune => "fortune_tonic",
        }
    }

    fn modifier(&self) -> StatModifier {
        match self {
            TonicKind::Might => StatModifier::percent(StatKind::Damage, 20.0),
            TonicKind::Haste => StatModifier::percent(StatKind::Speed, 10.0),
            TonicKind::Fortune => StatModifier::percent(StatKind::GoldGain, 15.0),
        }
    }
}

/// Brews and drinks a tonic from arcane essence; refreshes the buff when
/// the same tonic is already active.
pub fn drink_tonic(state: &mut GameState, tonic: TonicKind, now: i64) -> bool {
    let essence = state.materials.get("arcane_essence").copied().unwrap_or(0);
    if essence < TONIC_MATERIAL_COST {
        return false;
    }
    state
        .materials
        .insert("arcane_essence".to_string(), essence - TONIC_MATERIAL_COST);

    let buff = Buff {
        id: tonic.id().to_string(),
        modifier: tonic.modifier(),
        expires_at: now + TONIC_DURATION_SECS,
    };
    match state.buffs.iter_mut().find(|b| b.id == buff.id) {
        Some(existing) => *existing = buff,
        None => state.buffs.push(buff),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::STARTING_GOLD;
    use crate::items::generation::generate_item;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn state_with_item(kind: ItemKind) -> (GameState, String, String) {
        let mut state = GameState::new(0);
        let item = generate_item(kind, Rarity::Common, 10, 0.0, &mut test_rng());
        let item_id = item.id.clone();
        state.inventory.push(item);
        let adventurer_id = state.roster[0].id.clone();
        (state, adventurer_id, item_id)
    }

    #[test]
    fn test_equip_moves_item_and_swaps_previous() {
        let (mut state, adventurer_id, item_id) = state_with_item(ItemKind::Weapon);
        assert!(equip_item(&mut state, &adventurer_id, &item_id));
        assert!(state.inventory.is_empty());
        assert!(state.roster[0].loadout.weapon.is_some());

        // Equip a second weapon: the first returns to the inventory
        let second = generate_item(ItemKind::Weapon, Rarity::Rare, 10, 0.0, &mut test_rng());
        let second_id = second.id.clone();
        state.inventory.push(second);
        assert!(equip_item(&mut state, &adventurer_id, &second_id));
        assert_eq!(state.inventory.len(), 1);
        assert_eq!(state.inventory[0].id, item_id);
        assert_eq!(
            state.roster[0].loadout.weapon.as_ref().map(|i| i.id.clone()),
            Some(second_id)
        );
    }

    #[test]
    fn test_equip_rejects_unknown_ids() {
        let (mut state, adventurer_id, item_id) = state_with_item(ItemKind::Weapon);
        let before = state.clone();
        assert!(!equip_item(&mut state, &adventurer_id, "missing"));
        assert!(!equip_item(&mut state, "missing", &item_id));
        assert_eq!(state, before);
    }

    #[test]
    fn test_unequip_requires_inventory_room() {
        let (mut state, adventurer_id, item_id) = state_with_item(ItemKind::Armor);
        assert!(equip_item(&mut state, &adventurer_id, &item_id));

        // Stuff the inventory to capacity
        let mut rng = test_rng();
        while state.inventory.len() < state.inventory_capacity() {
            state
                .inventory
                .push(generate_item(ItemKind::Trinket, Rarity::Common, 1, 0.0, &mut rng));
        }
        assert!(!unequip_item(&mut state, &adventurer_id, EquipSlot::Armor));
        assert!(state.roster[0].loadout.armor.is_some());

        state.inventory.pop();
        assert!(unequip_item(&mut state, &adventurer_id, EquipSlot::Armor));
        assert!(state.roster[0].loadout.armor.is_none());
    }

    #[test]
    fn test_salvage_pays_scrap_value() {
        let (mut state, _, item_id) = state_with_item(ItemKind::Weapon);
        let scrap = state.inventory[0].scrap_value;
        let gold_before = state.gold;
        assert!(salvage_item(&mut state, &item_id));
        assert_eq!(state.gold, gold_before + scrap);
        assert!(state.inventory.is_empty());
        assert_eq!(state.statistics.items_salvaged, 1);
        // Salvaging twice is a rejected no-op
        assert!(!salvage_item(&mut state, &item_id));
    }

    #[test]
    fn test_salvage_items_skips_unknown() {
        let (mut state, _, item_id) = state_with_item(ItemKind::Weapon);
        let sold = salvage_items(&mut state, &[item_id, "ghost".to_string()]);
        assert_eq!(sold, 1);
    }

    #[test]
    fn test_purchase_upgrade_costs_and_caps() {
        let mut state = GameState::new(0);
        state.gold = 1_000_000;
        assert!(purchase_upgrade(&mut state, "training_grounds"));
        assert_eq!(state.upgrade_level("training_grounds"), 1);
        assert_eq!(state.gold, 1_000_000 - 100);

        for _ in 0..9 {
            assert!(purchase_upgrade(&mut state, "training_grounds"));
        }
        // Max level reached
        assert!(!purchase_upgrade(&mut state, "training_grounds"));
        assert_eq!(state.upgrade_level("training_grounds"), 10);
    }

    #[test]
    fn test_purchase_upgrade_rejects_poor_and_unknown() {
        let mut state = GameState::new(0);
        state.gold = 0;
        assert!(!purchase_upgrade(&mut state, "training_grounds"));
        state.gold = 10_000;
        assert!(!purchase_upgrade(&mut state, "free_lunch"));
        assert_eq!(state.gold, 10_000);
    }

    #[test]
    fn test_purchase_permanent_upgrade_spends_shards() {
        let mut state = GameState::new(0);
        state.reset_shards = 10;
        assert!(purchase_permanent_upgrade(&mut state, "power_growth"));
        assert_eq!(state.permanent_upgrade_level("power_growth"), 1);
        assert_eq!(state.reset_shards, 8);
        state.reset_shards = 0;
        assert!(!purchase_permanent_upgrade(&mut state, "power_growth"));
    }

    #[test]
    fn test_reset_preserves_permanent_progress() {
        let mut state = GameState::new(0);
        state.statistics.lifetime_gold = 9_000_000; // sqrt(9000) = 94
        state.permanent_upgrades.insert("power_growth".into(), 3);
        state.reset_shards = 5;
        state.gold = 99_999;
        state.roster.push(crate::character::recruit::starter_adventurer());
        state.upgrades.insert("training_grounds".into(), 4);
        state.loot_filter.min_rarity = Rarity::Epic;

        perform_reset(&mut state, 777);

        assert_eq!(state.reset_count, 1);
        assert_eq!(state.statistics.resets, 1);
        assert_eq!(state.gold, STARTING_GOLD);
        assert_eq!(state.roster.len(), 1, "roster wiped back to the starter");
        assert!(state.upgrades.is_empty());
        assert_eq!(state.permanent_upgrade_level("power_growth"), 3);
        assert_eq!(state.reset_shards, 5 + 94);
        assert_eq!(state.reset_shards_granted, 94);
        assert_eq!(state.loot_filter.min_rarity, Rarity::Epic);
        assert_eq!(state.statistics.lifetime_gold, 9_000_000);
        assert_eq!(state.created_at, 777);
    }

    #[test]
    fn test_second_reset_only_grants_the_delta() {
        let mut state = GameState::new(0);
        state.statistics.lifetime_gold = 1_000_000; // sqrt(1000) = 31
        perform_reset(&mut state, 0);
        assert_eq!(state.reset_shards, 31);

        // No further earnings: the next reset grants nothing new
        perform_reset(&mut state, 0);
        assert_eq!(state.reset_shards, 31);
        assert_eq!(state.reset_count, 2);
    }

    #[test]
    fn test_unlock_skill_node_spends_points() {
        let mut state = GameState::new(0);
        state.roster[0].skill_points = 3;
        let id = state.roster[0].id.clone();
        assert!(unlock_skill_node(&mut state, &id, "iron_grip"));
        assert_eq!(state.roster[0].skill_points, 2);
        assert!(state.roster[0].has_node("iron_grip"));

        // Prerequisite not met
        assert!(!unlock_skill_node(&mut state, &id, "avatar"));
        // Unknown node
        assert!(!unlock_skill_node(&mut state, &id, "galaxy_brain"));
    }

    #[test]
    fn test_respec_refunds_everything() {
        let mut state = GameState::new(0);
        state.roster[0].skill_points = 4;
        let id = state.roster[0].id.clone();
        assert!(unlock_skill_node(&mut state, &id, "iron_grip"));
        assert!(unlock_skill_node(&mut state, &id, "deadeye"));
        assert_eq!(state.roster[0].skill_points, 1);

        assert!(respec_adventurer(&mut state, &id));
        assert_eq!(state.roster[0].skill_points, 4);
        assert!(state.roster[0].unlocked_nodes.is_empty());

        // Nothing to refund now
        assert!(!respec_adventurer(&mut state, &id));
    }

    #[test]
    fn test_update_loot_filter_is_partial() {
        let mut state = GameState::new(0);
        update_loot_filter(
            &mut state,
            LootFilterUpdate {
                min_rarity: Some(Rarity::Epic),
                ..Default::default()
            },
        );
        assert_eq!(state.loot_filter.min_rarity, Rarity::Epic);
        // Untouched fields keep their defaults
        assert_eq!(state.loot_filter.keep_kinds.len(), 3);
    }

    #[test]
    fn test_recruit_costs_scale_with_roster() {
        let mut state = GameState::new(0);
        state.gold = 10_000;
        let mut rng = test_rng();

        let first = recruit_adventurer(&mut state, &mut rng);
        assert!(first.is_some());
        assert_eq!(state.gold, 10_000 - RECRUIT_BASE_COST);
        assert_eq!(state.roster.len(), 2);

        let second = recruit_adventurer(&mut state, &mut rng);
        assert!(second.is_some());
        assert_eq!(state.gold, 10_000 - RECRUIT_BASE_COST * 3);

        state.gold = 0;
        assert!(recruit_adventurer(&mut state, &mut rng).is_none());
        assert_eq!(state.roster.len(), 3);
    }

    #[test]
    fn test_drink_tonic_consumes_essence_and_refreshes() {
        let mut state = GameState::new(0);
        assert!(!drink_tonic(&mut state, TonicKind::Might, 0));

        state.materials.insert("arcane_essence".into(), 12);
        assert!(drink_tonic(&mut state, TonicKind::Might, 0));
        assert_eq!(state.materials["arcane_essence"], 7);
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.buffs[0].expires_at, TONIC_DURATION_SECS);

        // Same tonic again refreshes instead of stacking
        assert!(drink_tonic(&mut state, TonicKind::Might, 100));
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.buffs[0].expires_at, 100 + TONIC_DURATION_SECS);
    }

    #[test]
    fn test_dismiss_report() {
        let mut state = GameState::new(0);
        state.push_report(crate::contracts::rewards::RunReport {
            id: "r1".into(),
            contract_id: "rat_cellar".into(),
            contract_name: "The Rat Cellar".into(),
            victory: true,
            gold: 1,
            xp: 1,
            items_kept: vec![],
            materials: vec![],
            auto_salvaged: 0,
            salvage_gold: 0,
            overpowered: false,
        });
        assert!(dismiss_report(&mut state, "r1"));
        assert!(state.reports.is_empty());
        assert!(!dismiss_report(&mut state, "r1"));
    }
}
