//! The periodic driver. Each tick advances pressure encounters by one fixed
//! interval, expires consumable buffs, resolves every run whose window has
//! elapsed (in list order, against the progressively updated state), and
//! respawns auto-repeating runs from the post-reward roster.
//!
//! The returned [`TickResult`] carries every notification the presentation
//! layer needs; game logic never touches UI types.

use crate::contracts::data;
use crate::contracts::pressure::{EncounterState, PressureEvent};
use crate::contracts::rewards::{resolve_run, RewardEvent};
use crate::contracts::scheduler::{build_run, ActiveRun};
use crate::core::constants::TICK_INTERVAL_SECS;
use crate::core::game_state::GameState;
use crate::items::types::Rarity;
use rand::Rng;

/// A single notification produced by a game tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// A run finished and paid out.
    RunCompleted {
        run_id: String,
        contract: String,
        gold: u64,
        xp: u64,
    },

    /// A pressure run ended in defeat; no reward.
    RunFailed { run_id: String, contract: String },

    /// An item dropped; `kept` is false when filtered or discarded.
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

    /// The late-run boss escalation fired in a pressure encounter.
    BossSpawned { run_id: String, enemy: String },

    /// A minion wave fell in a pressure encounter.
    WaveCleared { run_id: String, kills: u32 },

    /// A party member collapsed under pressure.
    PartyMemberDown {
        run_id: String,
        adventurer_id: String,
    },

    /// An auto-repeating run respawned with a fresh snapshot.
    RunRespawned {
        run_id: String,
        contract: String,
        total_runs: u32,
    },
}

/// Everything that happened in one tick.
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    pub events: Vec<TickEvent>,
}

/// Processes one fixed-interval tick at wall-clock time `now`.
///
/// With no due runs, no live encounters, and no expiring buffs, the tick is
/// a strict no-op. Pass a seeded RNG in tests for deterministic outcomes.
pub fn game_tick<R: Rng>(state: &mut GameState, now: i64, rng: &mut R) -> TickResult {
    let mut result = TickResult::default();

    // ── 1. Advance pressure encounters one interval ─────────────
    for run in &mut state.active_runs {
        let run_id = run.id.clone();
        if let Some(encounter) = &mut run.encounter {
            if encounter.state == EncounterState::Ongoing {
                for event in encounter.tick(TICK_INTERVAL_SECS) {
                    if let Some(mapped) = map_pressure_event(&run_id, event) {
                        result.events.push(mapped);
                    }
                }
            }
        }
    }

    // ── 2. Expire consumable buffs ──────────────────────────────
    if state.buffs.iter().any(|buff| buff.expires_at <= now) {
        state.buffs.retain(|buff| buff.expires_at > now);
    }

    // ── 3. Partition finished runs from running ones ────────────
    let (finished, running): (Vec<ActiveRun>, Vec<ActiveRun>) = state
        .active_runs
        .drain(..)
        .partition(|run| run.finished(now));
    state.active_runs = running;
    if finished.is_empty() {
        return result;
    }

    // ── 4. Resolve in list order against the updated state ──────
    let mut respawn_queue: Vec<(ActiveRun, Option<u32>)> = Vec::new();
    for run in finished {
        match resolve_run(state, &run, rng) {
            Some((report, reward_events)) => {
                if report.victory {
                    result.events.push(TickEvent::RunCompleted {
                        run_id: run.id.clone(),
                        contract: run.contract_id.clone(),
                        gold: report.gold,
                        xp: report.xp,
                    });
                } else {
                    result.events.push(TickEvent::RunFailed {
                        run_id: run.id.clone(),
                        contract: run.contract_id.clone(),
                    });
                }
                for event in reward_events {
                    result.events.push(map_reward_event(event));
                }
            }
            // Unknown contract: the run is dropped, nothing else changes.
            None => continue,
        }

        let remaining = run.remaining_runs.map(|n| n.saturating_sub(1));
        let exhausted = remaining.map(|n| n == 0).unwrap_or(false);
        let roster_intact = run
            .adventurer_ids
            .iter()
            .all(|id| state.adventurer(id).is_some());
        if run.auto_repeat
            && !run.stop_requested
            && !exhausted
            && run.victorious()
            && roster_intact
        {
            respawn_queue.push((run, remaining));
        }
    }

    // ── 5. Respawn repeats from the post-reward roster ──────────
    for (previous, remaining) in respawn_queue {
        if let Some(contract) = data::contract(&previous.contract_id) {
            let run = build_run(
                state,
                contract,
                previous.adventurer_ids.clone(),
                true,
                remaining,
                previous.total_runs + 1,
                now,
            );
            result.events.push(TickEvent::RunRespawned {
                run_id: run.id.clone(),
                contract: run.contract_id.clone(),
                total_runs: run.total_runs,
            });
            state.active_runs.push(run);
        }
    }

    result
}

fn map_pressure_event(run_id: &str, event: PressureEvent) -> Option<TickEvent> {
    match event {
        PressureEvent::BossSpawned { enemy } => Some(TickEvent::BossSpawned {
            run_id: run_id.to_string(),
            enemy,
        }),
        PressureEvent::WaveCleared { kills } => Some(TickEvent::WaveCleared {
            run_id: run_id.to_string(),
            kills,
        }),
        PressureEvent::MemberDown { adventurer_id } => Some(TickEvent::PartyMemberDown {
            run_id: run_id.to_string(),
            adventurer_id,
        }),
        // Victory/defeat surface through run resolution.
        PressureEvent::Victory { .. } | PressureEvent::Defeat => None,
    }
}

fn map_reward_event(event: RewardEvent) -> TickEvent {
    match event {
        RewardEvent::ItemDropped {
            label,
            rarity,
            kept,
        } => TickEvent::ItemDropped {
            label,
            rarity,
            kept,
        },
        RewardEvent::MaterialGained { material, amount } => {
            TickEvent::MaterialGained { material, amount }
        }
        RewardEvent::LeveledUp { adventurer, level } => {
            TickEvent::LeveledUp { adventurer, level }
        }
        RewardEvent::SkillPointGained { adventurer } => {
            TickEvent::SkillPointGained { adventurer }
        }
        RewardEvent::ContractUnlocked { contract } => TickEvent::ContractUnlocked { contract },
    }
}
