use serde::{Deserialize, Serialize};

/// The three timed-activity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    Dungeon,
    Gathering,
    Fishing,
}

impl ContractKind {
    pub fn is_combat(&self) -> bool {
        matches!(self, ContractKind::Dungeon)
    }
}

/// Enemy encountered in a combat contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDef {
    pub name: &'static str,
    pub hp: f64,
}

/// A timed activity definition. Duration and rewards are base values; the
/// scheduler and reward resolver apply every bonus on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contract {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ContractKind,
    pub tier: u32,
    pub duration_secs: i64,
    pub recommended_power: u32,
    /// Power level fed into the loot generator for drops.
    pub item_level: u32,
    pub base_drop_chance: f64,
    pub gold_min: u64,
    pub gold_max: u64,
    pub xp_min: u64,
    pub xp_max: u64,
    /// When set, the run resolves through the pressure encounter model
    /// instead of the clock.
    pub pressure: bool,
    pub enemy: Option<EnemyDef>,
    /// Weighted material table for gathering/fishing drops.
    pub materials: &'static [(&'static str, f64)],
    /// Contract unlocked on first completion of this one.
    pub unlocks: Option<&'static str>,
}
