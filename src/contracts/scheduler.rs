//! The run scheduler — starting, cancelling, and stopping repeats of timed
//! contracts, plus the snapshot/pending-change protocol that keeps a run's
//! reward math frozen against later equipment changes.

use crate::character::skill_tree::{rule_modifiers, RuleModifier};
use crate::character::stats::{effective_stats_in_party, EffectiveStats};
use crate::character::types::{Adventurer, EquipSlot};
use crate::contracts::data;
use crate::contracts::pressure::{EncounterState, MemberState, PressureEncounter};
use crate::contracts::types::Contract;
use crate::core::constants::{
    MAX_PARTY_SIZE, MIN_RUN_DURATION_SECS, RESET_SPEED_PERCENT_CAP, RESET_SPEED_PERCENT_PER_RANK,
    SPEED_REDUCTION_CAP_PERCENT,
};
use crate::core::game_state::GameState;
use crate::items::types::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Aggregate party stats frozen at run start. All reward math reads these,
/// never the live roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub party_dps: f64,
    pub party_power: u32,
    /// Summed member bonuses, in percent.
    pub gold_bonus: f64,
    pub xp_bonus: f64,
    pub loot_bonus: f64,
    /// Union of the party's rule modifiers.
    pub modifiers: BTreeSet<RuleModifier>,
}

/// One in-flight contract execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRun {
    pub id: String,
    pub contract_id: String,
    pub adventurer_ids: Vec<String>,
    pub started_at: i64,
    /// Already adjusted for every speed modifier.
    pub duration_secs: i64,
    pub auto_repeat: bool,
    /// Set by `stop_repeat`; the current run still completes once.
    #[serde(default)]
    pub stop_requested: bool,
    /// Remaining repeats when bounded; `None` repeats indefinitely.
    #[serde(default)]
    pub remaining_runs: Option<u32>,
    /// How many times this run has been (re)started, starting at 1.
    pub total_runs: u32,
    pub snapshot: RunSnapshot,
    /// Full deep copy of each member at start time.
    pub adventurer_state: BTreeMap<String, Adventurer>,
    /// Slots changed on a member while this run was in flight.
    pub modified_slots: BTreeMap<String, Vec<EquipSlot>>,
    /// Present only for pressure-model contracts.
    #[serde(default)]
    pub encounter: Option<PressureEncounter>,
}

impl ActiveRun {
    pub fn finished(&self, now: i64) -> bool {
        match &self.encounter {
            Some(encounter) => encounter.state != EncounterState::Ongoing,
            None => now >= self.started_at + self.duration_secs,
        }
    }

    pub fn victorious(&self) -> bool {
        match &self.encounter {
            Some(encounter) => encounter.state == EncounterState::Victory,
            None => true,
        }
    }
}

/// Union of rule modifiers across the party.
pub fn party_rule_modifiers(state: &GameState, ids: &[String]) -> BTreeSet<RuleModifier> {
    let mut modifiers = BTreeSet::new();
    for id in ids {
        if let Some(adventurer) = state.adventurer(id) {
            modifiers.extend(rule_modifiers(adventurer));
        }
    }
    modifiers
}

/// Computes the frozen aggregate snapshot for a party.
pub fn build_snapshot(state: &GameState, ids: &[String], now: i64) -> RunSnapshot {
    let modifiers = party_rule_modifiers(state, ids);
    let mut snapshot = RunSnapshot {
        party_dps: 0.0,
        party_power: 0,
        gold_bonus: 0.0,
        xp_bonus: 0.0,
        loot_bonus: 0.0,
        modifiers: modifiers.clone(),
    };

    for id in ids {
        if let Some(adventurer) = state.adventurer(id) {
            let stats = effective_stats_in_party(adventurer, state, &modifiers, now);
            snapshot.party_dps += stats.dps();
            snapshot.party_power += stats.power();
            snapshot.gold_bonus += stats.gold_gain;
            snapshot.xp_bonus += stats.xp_gain;
            snapshot.loot_bonus += stats.loot_luck;
        }
    }
    snapshot
}

/// Base duration reduced by the capped speed upgrade, reset bonus, and any
/// active speed consumables, floored at the minimum run length.
pub fn adjusted_duration(state: &GameState, contract: &Contract, now: i64) -> i64 {
    let upgrade_percent = state
        .run_speed_percent()
        .min(SPEED_REDUCTION_CAP_PERCENT);
    let reset_percent = (state.reset_count as f64 * RESET_SPEED_PERCENT_PER_RANK)
        .min(RESET_SPEED_PERCENT_CAP);
    let buff_percent: f64 = state
        .buffs
        .iter()
        .filter(|buff| buff.expires_at > now && buff.modifier.stat == StatKind::Speed)
        .map(|buff| buff.modifier.value)
        .sum();

    let reduction = upgrade_percent + reset_percent + buff_percent;
    let adjusted = (contract.duration_secs as f64 * (1.0 - reduction / 100.0)).round() as i64;
    adjusted.max(MIN_RUN_DURATION_SECS)
}

/// Starts a run with an unbounded repeat when `auto_repeat` is set.
/// Soft-rejects (returns `None`, state untouched) on any bad precondition:
/// empty or oversized party, duplicate/unknown/busy members, or an unknown
/// or locked contract.
pub fn start_run(
    state: &mut GameState,
    ids: &[String],
    contract_id: &str,
    auto_repeat: bool,
    now: i64,
) -> Option<String> {
    start_run_limited(state, ids, contract_id, auto_repeat, None, now)
}

pub fn start_run_limited(
    state: &mut GameState,
    ids: &[String],
    contract_id: &str,
    auto_repeat: bool,
    remaining_runs: Option<u32>,
    now: i64,
) -> Option<String> {
    if ids.is_empty() || ids.len() > MAX_PARTY_SIZE {
        return None;
    }
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return None;
        }
        if state.adventurer(id).is_none() || state.is_busy(id) {
            return None;
        }
    }
    let contract = data::contract(contract_id)?;
    if !state.unlocked_contracts.contains(contract_id) {
        return None;
    }

    let run = build_run(state, contract, ids.to_vec(), auto_repeat, remaining_runs, 1, now);
    let run_id = run.id.clone();
    state
        .last_party
        .insert(contract_id.to_string(), ids.to_vec());
    state.active_runs.push(run);
    Some(run_id)
}

/// Builds a fresh run (also used by the tick driver to respawn repeats).
pub fn build_run(
    state: &GameState,
    contract: &Contract,
    ids: Vec<String>,
    auto_repeat: bool,
    remaining_runs: Option<u32>,
    total_runs: u32,
    now: i64,
) -> ActiveRun {
    let snapshot = build_snapshot(state, &ids, now);
    let duration_secs = adjusted_duration(state, contract, now);

    let mut adventurer_state = BTreeMap::new();
    for id in &ids {
        if let Some(adventurer) = state.adventurer(id) {
            adventurer_state.insert(id.clone(), adventurer.clone());
        }
    }

    let encounter = match (contract.pressure, contract.enemy) {
        (true, Some(enemy)) => {
            let members = ids
                .iter()
                .filter_map(|id| {
                    state.adventurer(id).map(|adventurer| {
                        let stats = effective_stats_in_party(
                            adventurer,
                            state,
                            &snapshot.modifiers,
                            now,
                        );
                        MemberState {
                            adventurer_id: id.clone(),
                            max_hp: stats.health as f64,
                            hp: stats.health as f64,
                            dps: stats.dps(),
                            collapsed: false,
                        }
                    })
                })
                .collect();
            Some(PressureEncounter::new(
                enemy.name,
                enemy.hp,
                duration_secs as f64,
                members,
            ))
        }
        _ => None,
    };

    ActiveRun {
        id: Uuid::new_v4().to_string(),
        contract_id: contract.id.to_string(),
        adventurer_ids: ids,
        started_at: now,
        duration_secs,
        auto_repeat,
        stop_requested: false,
        remaining_runs,
        total_runs,
        snapshot,
        adventurer_state,
        modified_slots: BTreeMap::new(),
        encounter,
    }
}

/// Removes the run outright: no reward, no penalty.
pub fn cancel_run(state: &mut GameState, run_id: &str) -> bool {
    let before = state.active_runs.len();
    state.active_runs.retain(|run| run.id != run_id);
    state.active_runs.len() != before
}

/// Flips auto-repeat off; the in-flight run completes as a single run.
pub fn stop_repeat(state: &mut GameState, run_id: &str) -> bool {
    match state.run_mut(run_id) {
        Some(run) => {
            run.stop_requested = true;
            true
        }
        None => false,
    }
}

/// Records an equipment change on a busy adventurer so the UI's
/// conservative view knows which slots went stale.
pub fn record_equipment_change(state: &mut GameState, adventurer_id: &str, slot: EquipSlot) {
    for run in &mut state.active_runs {
        if run.adventurer_ids.iter().any(|id| id == adventurer_id) {
            let slots = run
                .modified_slots
                .entry(adventurer_id.to_string())
                .or_default();
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
    }
}

/// Deliberately pessimistic in-flight stat estimate: every slot that was
/// modified, or whose live item no longer matches the snapshot's item (id
/// or stat lines), is treated as empty.
pub fn conservative_stats(
    state: &GameState,
    run: &ActiveRun,
    adventurer_id: &str,
    now: i64,
) -> Option<EffectiveStats> {
    let live = state.adventurer(adventurer_id)?;
    let frozen = run.adventurer_state.get(adventurer_id)?;

    let mut pessimistic = live.clone();
    let modified = run.modified_slots.get(adventurer_id);
    for slot in EquipSlot::all() {
        let marked = modified.map(|slots| slots.contains(&slot)).unwrap_or(false);
        let mismatched = match (live.loadout.get(slot), frozen.loadout.get(slot)) {
            (Some(a), Some(b)) => a.id != b.id || a.stats != b.stats,
            (None, None) => false,
            _ => true,
        };
        if marked || mismatched {
            pessimistic.loadout.set(slot, None);
        }
    }

    Some(effective_stats_in_party(
        &pessimistic,
        state,
        &run.snapshot.modifiers,
        now,
    ))
}
