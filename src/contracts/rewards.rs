//! The reward resolver — converts one finished run into gold, xp, items,
//! and materials, applying every snapshot bonus and the loot filter.

use crate::character::types::{grants_skill_point, xp_for_next_level, Adventurer};
use crate::contracts::data;
use crate::contracts::scheduler::ActiveRun;
use crate::core::constants::{
    DROP_CHANCE_CAP, GATHER_CYCLE_SECS, MAX_LOOT_ROLLS, OVERPOWERED_FACTOR,
    OVERPOWERED_XP_FRACTION,
};
use crate::core::game_state::{GameState, LootFilter};
use crate::items::generation::generate_item;
use crate::items::rarity::{roll_rarity, RarityContext};
use crate::items::types::{Item, ItemKind, Rarity};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome summary for one resolved run, kept in the bounded report ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub id: String,
    pub contract_id: String,
    pub contract_name: String,
    pub victory: bool,
    pub gold: u64,
    pub xp: u64,
    pub items_kept: Vec<String>,
    pub materials: Vec<(String, u64)>,
    pub auto_salvaged: u32,
    pub salvage_gold: u64,
    pub overpowered: bool,
}

/// Fine-grained reward notifications; the tick driver maps these into its
/// own event surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RewardEvent {
    ItemDropped {
        label: String,
        rarity: Rarity,
        kept: bool,
    },
    MaterialGained {
        material: String,
        amount: u64,
    },
    LeveledUp {
        adventurer: String,
        level: u32,
    },
    SkillPointGained {
        adventurer: String,
    },
    ContractUnlocked {
        contract: String,
    },
}

/// Resolves one finished run against the live state. Returns `None` only
/// for an unrecognized contract id (silent skip — the run is still removed
/// by the tick driver, but nothing else changes).
pub fn resolve_run<R: Rng>(
    state: &mut GameState,
    run: &ActiveRun,
    rng: &mut R,
) -> Option<(RunReport, Vec<RewardEvent>)> {
    let contract = data::contract(&run.contract_id)?;
    let mut events = Vec::new();

    state.statistics.runs_completed += 1;

    // A defeated pressure run yields nothing but the report.
    if !run.victorious() {
        let report = RunReport {
            id: run.id.clone(),
            contract_id: run.contract_id.clone(),
            contract_name: contract.name.to_string(),
            victory: false,
            gold: 0,
            xp: 0,
            items_kept: Vec::new(),
            materials: Vec::new(),
            auto_salvaged: 0,
            salvage_gold: 0,
            overpowered: false,
        };
        state.push_report(report.clone());
        return Some((report, events));
    }

    // ── Gold and XP rolls, snapshot bonuses, overpowered clamp ──
    let mut gold =
        rng.gen_range(contract.gold_min..=contract.gold_max) as f64
            * (1.0 + run.snapshot.gold_bonus / 100.0);
    let mut xp = rng.gen_range(contract.xp_min..=contract.xp_max) as f64
        * (1.0 + run.snapshot.xp_bonus / 100.0);

    let overpowered = contract.kind.is_combat()
        && run.snapshot.party_power as f64 > contract.recommended_power as f64 * OVERPOWERED_FACTOR;
    if overpowered {
        gold = contract.gold_min as f64;
        xp *= OVERPOWERED_XP_FRACTION;
    }
    let gold = gold.round() as u64;
    let xp = xp.round() as u64;

    // ── Even XP split with level-up loop ────────────────────────
    let share = xp / run.adventurer_ids.len().max(1) as u64;
    for id in &run.adventurer_ids {
        if let Some(adventurer) = state.adventurer_mut(id) {
            apply_xp(adventurer, share, &mut events);
        }
    }

    // ── Loot rolls ──────────────────────────────────────────────
    let rolls = roll_count(run, contract);
    if contract.kind.is_combat() {
        state.statistics.kills += rolls as u64;
    }
    let drop_chance = (contract.base_drop_chance * (1.0 + run.snapshot.loot_bonus / 100.0))
        .min(DROP_CHANCE_CAP);

    let mut items_kept = Vec::new();
    let mut materials: Vec<(String, u64)> = Vec::new();
    let mut auto_salvaged = 0u32;
    let mut salvage_gold = 0u64;

    for _ in 0..rolls {
        if !rng.gen_bool(drop_chance) {
            continue;
        }
        if contract.kind.is_combat() {
            let item = roll_item(state, contract.tier, contract.item_level, rng);
            let label = item.label();
            let rarity = item.rarity;
            if passes_filter(&state.loot_filter, &item) {
                let kept = state.inventory.len() < state.inventory_capacity();
                if kept {
                    items_kept.push(label.clone());
                    state.inventory.push(item);
                }
                // Overflow past capacity is silently discarded.
                events.push(RewardEvent::ItemDropped { label, rarity, kept });
            } else {
                salvage_gold += item.scrap_value;
                auto_salvaged += 1;
                state.statistics.items_salvaged += 1;
                events.push(RewardEvent::ItemDropped {
                    label,
                    rarity,
                    kept: false,
                });
            }
        } else {
            let material = roll_material(contract.materials, rng);
            let amount = rng.gen_range(1..=3u64);
            *state.materials.entry(material.clone()).or_insert(0) += amount;
            match materials.iter_mut().find(|(name, _)| *name == material) {
                Some((_, total)) => *total += amount,
                None => materials.push((material.clone(), amount)),
            }
            events.push(RewardEvent::MaterialGained { material, amount });
        }
    }

    state.gold += gold + salvage_gold;
    state.statistics.lifetime_gold += gold + salvage_gold;

    // ── Contract chain unlock ───────────────────────────────────
    if let Some(next) = contract.unlocks {
        if state.unlocked_contracts.insert(next.to_string()) {
            events.push(RewardEvent::ContractUnlocked {
                contract: next.to_string(),
            });
        }
    }

    let report = RunReport {
        id: run.id.clone(),
        contract_id: run.contract_id.clone(),
        contract_name: contract.name.to_string(),
        victory: true,
        gold,
        xp,
        items_kept,
        materials,
        auto_salvaged,
        salvage_gold,
        overpowered,
    };
    state.push_report(report.clone());
    Some((report, events))
}

/// Number of loot rolls: encounter kills for pressure runs, kills-per-run
/// from DPS vs enemy HP for clocked combat, coarse duration cycles for
/// gathering and fishing.
fn roll_count(run: &ActiveRun, contract: &crate::contracts::types::Contract) -> u32 {
    if let Some(encounter) = &run.encounter {
        return encounter.kills.clamp(1, MAX_LOOT_ROLLS);
    }
    match contract.enemy {
        Some(enemy) if contract.kind.is_combat() => {
            let kills = (run.snapshot.party_dps * run.duration_secs as f64 / enemy.hp).floor();
            (kills as u32).clamp(1, MAX_LOOT_ROLLS)
        }
        _ => {
            let cycles = (run.duration_secs as f64 / GATHER_CYCLE_SECS).ceil();
            (cycles as u32).clamp(1, MAX_LOOT_ROLLS)
        }
    }
}

fn roll_item<R: Rng>(state: &mut GameState, tier: u32, item_level: u32, rng: &mut R) -> Item {
    let ctx = RarityContext {
        contract_tier: tier,
        rarity_bonus_percent: state.rarity_bonus_percent(),
        pity: state.pity,
        reset_count: state.reset_count,
        rank_shift: 0.0,
    };
    let rarity = roll_rarity(&ctx, rng);
    if rarity == Rarity::Legendary {
        state.pity = 0;
    } else {
        state.pity += 1;
    }

    let kind = match rng.gen_range(0..3) {
        0 => ItemKind::Weapon,
        1 => ItemKind::Armor,
        _ => ItemKind::Trinket,
    };
    state.statistics.items_generated += 1;
    generate_item(kind, rarity, item_level, 0.0, rng)
}

/// Whitelisted stat names always keep; otherwise both the rarity floor and
/// the kind keep-set must pass.
pub fn passes_filter(filter: &LootFilter, item: &Item) -> bool {
    if item
        .stats
        .iter()
        .any(|line| filter.keep_stats.contains(&line.stat))
    {
        return true;
    }
    item.rarity >= filter.min_rarity && filter.keep_kinds.contains(&item.kind)
}

fn roll_material<R: Rng>(table: &[(&'static str, f64)], rng: &mut R) -> String {
    let total: f64 = table.iter().map(|(_, weight)| weight).sum();
    if total <= 0.0 {
        return "scrap".to_string();
    }
    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (name, weight) in table {
        cumulative += weight;
        if roll < cumulative {
            return name.to_string();
        }
    }
    table[table.len() - 1].0.to_string()
}

/// Adds xp and processes the level-up loop, granting skill points on the
/// milestone levels.
pub fn apply_xp(adventurer: &mut Adventurer, amount: u64, events: &mut Vec<RewardEvent>) {
    adventurer.xp += amount;
    loop {
        let needed = xp_for_next_level(adventurer.level);
        if adventurer.xp < needed {
            break;
        }
        adventurer.xp -= needed;
        adventurer.level += 1;
        events.push(RewardEvent::LeveledUp {
            adventurer: adventurer.name.clone(),
            level: adventurer.level,
        });
        if grants_skill_point(adventurer.level) {
            adventurer.skill_points += 1;
            events.push(RewardEvent::SkillPointGained {
                adventurer: adventurer.name.clone(),
            });
        }
    }
}
