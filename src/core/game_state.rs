use crate::character::recruit::starter_adventurer;
use crate::character::types::Adventurer;
use crate::contracts::data::STARTING_CONTRACTS;
use crate::contracts::rewards::RunReport;
use crate::contracts::scheduler::ActiveRun;
use crate::core::constants::{BASE_INVENTORY_CAP, MAX_REPORTS, STARTING_GOLD};
use crate::core::upgrades::{upgrade_def, UpgradeEffect};
use crate::items::types::{Item, ItemKind, Rarity, StatKind, StatModifier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Lifetime totals. Survive a progression reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub lifetime_gold: u64,
    pub runs_completed: u64,
    pub items_generated: u64,
    pub items_salvaged: u64,
    pub kills: u64,
    pub resets: u32,
}

/// Player-configured loot filter. An item is kept when any of its stat
/// names is whitelisted, or when it clears both the rarity floor and the
/// kind keep-set; otherwise it is salvaged on the spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootFilter {
    pub keep_stats: Vec<StatKind>,
    pub min_rarity: Rarity,
    pub keep_kinds: Vec<ItemKind>,
}

impl Default for LootFilter {
    fn default() -> Self {
        Self {
            keep_stats: Vec::new(),
            min_rarity: Rarity::Rare,
            keep_kinds: vec![ItemKind::Weapon, ItemKind::Armor, ItemKind::Trinket],
        }
    }
}

/// A timed consumable buff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub id: String,
    pub modifier: StatModifier,
    pub expires_at: i64,
}

/// The aggregate root. Mutated only by user-initiated operations and the
/// tick driver; single-threaded by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub gold: u64,
    pub reset_shards: u64,
    pub reset_count: u32,
    /// Shards already granted by past resets, for the grant formula.
    pub reset_shards_granted: u64,
    pub roster: Vec<Adventurer>,
    pub inventory: Vec<Item>,
    pub materials: BTreeMap<String, u64>,
    pub active_runs: Vec<ActiveRun>,
    pub unlocked_contracts: BTreeSet<String>,
    pub upgrades: BTreeMap<String, u32>,
    pub permanent_upgrades: BTreeMap<String, u32>,
    #[serde(default)]
    pub loot_filter: LootFilter,
    /// Consecutive item drops without a legendary.
    #[serde(default)]
    pub pity: u32,
    #[serde(default)]
    pub buffs: Vec<Buff>,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default)]
    pub reports: VecDeque<RunReport>,
    /// Last party used per contract, remembered for the UI.
    #[serde(default)]
    pub last_party: BTreeMap<String, Vec<String>>,
    pub created_at: i64,
}

impl GameState {
    /// Fresh state: starting gold, the fixed starter adventurer, and the
    /// tier-1 contracts unlocked.
    pub fn new(now: i64) -> Self {
        Self {
            gold: STARTING_GOLD,
            reset_shards: 0,
            reset_count: 0,
            reset_shards_granted: 0,
            roster: vec![starter_adventurer()],
            inventory: Vec::new(),
            materials: BTreeMap::new(),
            active_runs: Vec::new(),
            unlocked_contracts: STARTING_CONTRACTS
                .iter()
                .map(|id| id.to_string())
                .collect(),
            upgrades: BTreeMap::new(),
            permanent_upgrades: BTreeMap::new(),
            loot_filter: LootFilter::default(),
            pity: 0,
            buffs: Vec::new(),
            statistics: Statistics::default(),
            reports: VecDeque::new(),
            last_party: BTreeMap::new(),
            created_at: now,
        }
    }

    pub fn adventurer(&self, id: &str) -> Option<&Adventurer> {
        self.roster.iter().find(|a| a.id == id)
    }

    pub fn adventurer_mut(&mut self, id: &str) -> Option<&mut Adventurer> {
        self.roster.iter_mut().find(|a| a.id == id)
    }

    /// True when the adventurer is committed to any active run.
    pub fn is_busy(&self, adventurer_id: &str) -> bool {
        self.active_runs
            .iter()
            .any(|run| run.adventurer_ids.iter().any(|id| id == adventurer_id))
    }

    pub fn run(&self, run_id: &str) -> Option<&ActiveRun> {
        self.active_runs.iter().find(|run| run.id == run_id)
    }

    pub fn run_mut(&mut self, run_id: &str) -> Option<&mut ActiveRun> {
        self.active_runs.iter_mut().find(|run| run.id == run_id)
    }

    pub fn upgrade_level(&self, id: &str) -> u32 {
        self.upgrades.get(id).copied().unwrap_or(0)
    }

    pub fn permanent_upgrade_level(&self, id: &str) -> u32 {
        self.permanent_upgrades.get(id).copied().unwrap_or(0)
    }

    pub fn inventory_capacity(&self) -> usize {
        let mut capacity = BASE_INVENTORY_CAP;
        for (id, level) in &self.upgrades {
            if let Some(def) = upgrade_def(id) {
                if let UpgradeEffect::InventoryCap { slots_per_level } = def.effect {
                    capacity += slots_per_level * *level as usize;
                }
            }
        }
        capacity
    }

    /// Crafting quality bonus from the forge upgrade, in percent.
    pub fn crafting_bonus_percent(&self) -> f64 {
        self.upgrade_effect_total(|effect| match effect {
            UpgradeEffect::CraftQuality { percent_per_level } => Some(percent_per_level),
            _ => None,
        })
    }

    /// Player-wide rarity-roll bonus, in percent.
    pub fn rarity_bonus_percent(&self) -> f64 {
        self.upgrade_effect_total(|effect| match effect {
            UpgradeEffect::RarityLuck { percent_per_level } => Some(percent_per_level),
            _ => None,
        })
    }

    /// Run-duration reduction from upgrades, in percent (uncapped here;
    /// the scheduler applies the cap).
    pub fn run_speed_percent(&self) -> f64 {
        self.upgrade_effect_total(|effect| match effect {
            UpgradeEffect::RunSpeed { percent_per_level } => Some(percent_per_level),
            _ => None,
        })
    }

    fn upgrade_effect_total(&self, pick: impl Fn(UpgradeEffect) -> Option<f64>) -> f64 {
        let mut total = 0.0;
        for (id, level) in &self.upgrades {
            if let Some(def) = upgrade_def(id) {
                if let Some(per_level) = pick(def.effect) {
                    total += per_level * *level as f64;
                }
            }
        }
        total
    }

    /// Appends a run report, evicting the oldest past the cap.
    pub fn push_report(&mut self, report: RunReport) {
        if self.reports.len() >= MAX_REPORTS {
            self.reports.pop_back();
        }
        self.reports.push_front(report);
    }

    pub fn find_item_in_inventory(&self, item_id: &str) -> Option<usize> {
        self.inventory.iter().position(|item| item.id == item_id)
    }
}
