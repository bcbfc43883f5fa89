//! Integration test: run lifecycle — start, busy invariant, snapshot
//! freezing, conservative stat view, cancel, and stop-repeat.

use guildhall::character::types::EquipSlot;
use guildhall::contracts::scheduler::{
    cancel_run, conservative_stats, start_run, stop_repeat,
};
use guildhall::core::actions::{equip_item, recruit_adventurer};
use guildhall::core::tick::game_tick;
use guildhall::items::generation::generate_item;
use guildhall::items::types::{ItemKind, Rarity};
use guildhall::GameState;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn test_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

fn state_with_roster(count: usize) -> GameState {
    let mut state = GameState::new(0);
    state.gold = 1_000_000;
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    while state.roster.len() < count {
        recruit_adventurer(&mut state, &mut rng).expect("recruitment should succeed");
    }
    state
}

#[test]
fn test_character_never_in_two_runs() {
    let mut state = state_with_roster(3);
    let ids: Vec<String> = state.roster.iter().map(|a| a.id.clone()).collect();

    assert!(start_run(&mut state, &ids[0..2], "rat_cellar", false, 0).is_some());
    // Overlapping party: rejected wholesale
    assert!(start_run(&mut state, &ids[1..3], "copper_vein", false, 0).is_none());
    // Disjoint party: fine
    assert!(start_run(&mut state, &ids[2..3], "copper_vein", false, 0).is_some());

    let mut seen: Vec<&String> = state
        .active_runs
        .iter()
        .flat_map(|run| run.adventurer_ids.iter())
        .collect();
    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total, "an id appeared in two active runs");
}

#[test]
fn test_equipment_change_mid_run_does_not_leak_into_snapshot() {
    let mut state = state_with_roster(1);
    let id = state.roster[0].id.clone();
    let run_id = start_run(&mut state, &[id.clone()], "rat_cellar", false, 0).unwrap();

    let frozen_power = state.run(&run_id).unwrap().snapshot.party_power;
    let frozen_dps = state.run(&run_id).unwrap().snapshot.party_dps;

    // A monstrous weapon arrives mid-run
    let weapon = generate_item(ItemKind::Weapon, Rarity::Legendary, 80, 0.0, &mut test_rng());
    let weapon_id = weapon.id.clone();
    state.inventory.push(weapon);
    assert!(equip_item(&mut state, &id, &weapon_id));

    let run = state.run(&run_id).unwrap();
    assert_eq!(run.snapshot.party_power, frozen_power);
    assert_eq!(run.snapshot.party_dps, frozen_dps);
    assert_eq!(run.modified_slots.get(&id), Some(&vec![EquipSlot::Weapon]));

    // The conservative view treats the touched slot as empty
    let run = run.clone();
    let pessimistic = conservative_stats(&state, &run, &id, 0).unwrap();
    let live = guildhall::character::stats::effective_stats(state.adventurer(&id).unwrap(), &state, 0);
    assert!(pessimistic.damage < live.damage);
}

#[test]
fn test_cancel_grants_nothing_and_frees_the_party() {
    let mut state = state_with_roster(1);
    let id = state.roster[0].id.clone();
    let gold = state.gold;
    let xp = state.roster[0].xp;

    let run_id = start_run(&mut state, &[id.clone()], "rat_cellar", false, 0).unwrap();
    assert!(state.is_busy(&id));
    assert!(cancel_run(&mut state, &run_id));

    assert!(!state.is_busy(&id));
    assert_eq!(state.gold, gold);
    assert_eq!(state.roster[0].xp, xp);
    assert!(state.reports.is_empty());

    // Freed adventurers can start again immediately
    assert!(start_run(&mut state, &[id], "rat_cellar", false, 0).is_some());
}

#[test]
fn test_stop_repeat_keeps_reward_but_prevents_respawn() {
    let mut state = state_with_roster(1);
    let id = state.roster[0].id.clone();
    let run_id = start_run(&mut state, &[id], "rat_cellar", true, 0).unwrap();

    // First completion with repeat on: respawns
    game_tick(&mut state, 61, &mut test_rng());
    assert_eq!(state.active_runs.len(), 1);
    assert_eq!(state.reports.len(), 1);
    let respawned_id = state.active_runs[0].id.clone();
    assert_ne!(respawned_id, run_id);

    // Now stop the repeat; the current run still pays out once
    assert!(stop_repeat(&mut state, &respawned_id));
    let started = state.active_runs[0].started_at;
    let gold_before = state.gold;
    game_tick(&mut state, started + 61, &mut test_rng());

    assert!(state.active_runs.is_empty());
    assert!(state.gold > gold_before, "final run reward intact");
    assert_eq!(state.reports.len(), 2);
}

#[test]
fn test_full_party_snapshot_and_reward_split() {
    let mut state = state_with_roster(3);
    let ids: Vec<String> = state.roster.iter().map(|a| a.id.clone()).collect();
    let run_id = start_run(&mut state, &ids, "rat_cellar", false, 0).unwrap();

    let run = state.run(&run_id).unwrap();
    assert_eq!(run.adventurer_ids.len(), 3);
    assert_eq!(run.adventurer_state.len(), 3);
    assert!(run.snapshot.party_power > 0);

    game_tick(&mut state, 61, &mut test_rng());
    // Every member shares the xp evenly
    let xps: Vec<u64> = state.roster.iter().map(|a| a.xp).collect();
    assert!(xps.iter().all(|&xp| xp == xps[0]), "uneven split: {xps:?}");
}
