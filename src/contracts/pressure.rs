//! The combat pressure encounter — an alternate, tick-driven resolution
//! model for high-tier dungeons. Instead of a clock, the run ends when the
//! late-run boss falls (victory) or the whole party collapses (defeat).

use crate::core::constants::{
    PRESSURE_BOSS_HP_MULTIPLIER, PRESSURE_BOSS_KILL_BONUS, PRESSURE_BOSS_MULTIPLIER,
    PRESSURE_BOSS_TIME_FRACTION, PRESSURE_PARTY_HP_FRACTION, PRESSURE_SOLO_BONUS,
    PRESSURE_WAVE_REFILL_FRACTION,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterState {
    Ongoing,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberState {
    pub adventurer_id: String,
    pub max_hp: f64,
    pub hp: f64,
    pub dps: f64,
    pub collapsed: bool,
}

/// Events surfaced to the tick driver for notification purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum PressureEvent {
    BossSpawned { enemy: String },
    WaveCleared { kills: u32 },
    MemberDown { adventurer_id: String },
    Victory { kills: u32 },
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureEncounter {
    pub elapsed: f64,
    pub duration: f64,
    pub enemy_name: String,
    pub enemy_max_hp: f64,
    pub enemy_hp: f64,
    pub elite: bool,
    pub kills: u32,
    pub state: EncounterState,
    pub members: Vec<MemberState>,
    base_pressure: f64,
}

impl PressureEncounter {
    pub fn new(
        enemy_name: &str,
        enemy_hp: f64,
        duration_secs: f64,
        members: Vec<MemberState>,
    ) -> Self {
        let party_hp: f64 = members.iter().map(|m| m.max_hp).sum();
        Self {
            elapsed: 0.0,
            duration: duration_secs.max(1.0),
            enemy_name: enemy_name.to_string(),
            enemy_max_hp: enemy_hp,
            enemy_hp,
            elite: false,
            kills: 0,
            state: EncounterState::Ongoing,
            members,
            // Chip rate sized so roughly half the party's health pool is
            // spent across one nominal duration.
            base_pressure: party_hp * PRESSURE_PARTY_HP_FRACTION / duration_secs.max(1.0),
        }
    }

    /// Remaining wall-clock seconds. Clamped to zero once the boss phase
    /// begins; from then on only the outcome ends the run.
    pub fn remaining_secs(&self) -> f64 {
        if self.elite {
            0.0
        } else {
            (self.duration - self.elapsed).max(0.0)
        }
    }

    pub fn active_members(&self) -> usize {
        self.members.iter().filter(|m| !m.collapsed).count()
    }

    /// Advances the encounter by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> Vec<PressureEvent> {
        let mut events = Vec::new();
        if self.state != EncounterState::Ongoing {
            return events;
        }

        self.elapsed += dt;
        let fraction = (self.elapsed / self.duration).min(1.0);

        // Boss escalation, exactly once, at the time threshold.
        if !self.elite && fraction >= PRESSURE_BOSS_TIME_FRACTION {
            self.elite = true;
            self.base_pressure *= PRESSURE_BOSS_MULTIPLIER;
            self.enemy_max_hp *= PRESSURE_BOSS_HP_MULTIPLIER;
            self.enemy_hp *= PRESSURE_BOSS_HP_MULTIPLIER;
            self.enemy_name = format!("Elite {}", self.enemy_name);
            events.push(PressureEvent::BossSpawned {
                enemy: self.enemy_name.clone(),
            });
        }

        let active: Vec<usize> = (0..self.members.len())
            .filter(|&i| !self.members[i].collapsed)
            .collect();
        if active.is_empty() {
            self.state = EncounterState::Defeat;
            events.push(PressureEvent::Defeat);
            return events;
        }

        let mut squad_dps: f64 = active.iter().map(|&i| self.members[i].dps).sum();
        if active.len() == 1 {
            squad_dps *= PRESSURE_SOLO_BONUS;
        }

        // Chip damage grows linearly with elapsed time fraction and is
        // split evenly among standing members.
        let pressure = self.base_pressure * (1.0 + fraction);
        let per_member = pressure * dt / active.len() as f64;
        for &idx in &active {
            let member = &mut self.members[idx];
            member.hp -= per_member;
            if member.hp <= 0.0 {
                member.hp = 0.0;
                member.collapsed = true;
                events.push(PressureEvent::MemberDown {
                    adventurer_id: member.adventurer_id.clone(),
                });
            }
        }

        if self.active_members() == 0 {
            self.state = EncounterState::Defeat;
            events.push(PressureEvent::Defeat);
            return events;
        }

        self.enemy_hp -= squad_dps * dt;
        if self.enemy_hp <= 0.0 {
            if self.elite {
                self.kills += PRESSURE_BOSS_KILL_BONUS;
                self.enemy_hp = 0.0;
                self.state = EncounterState::Victory;
                events.push(PressureEvent::Victory { kills: self.kills });
            } else {
                // Another wave: a minion kill, not the end of the run.
                self.kills += 1;
                self.enemy_hp = self.enemy_max_hp * PRESSURE_WAVE_REFILL_FRACTION;
                events.push(PressureEvent::WaveCleared { kills: self.kills });
            }
        }

        events
    }
}
