//! Purchasable upgrade catalogues — gold upgrades and permanent
//! reset-shard upgrades.

use crate::items::types::{StatKind, StatModifier};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeEffect {
    /// Per-level stat modifier fed into the stat resolver.
    Stat(StatModifier),
    /// Per-level run duration reduction, percent (capped by the scheduler).
    RunSpeed { percent_per_level: f64 },
    /// Per-level inventory slots.
    InventoryCap { slots_per_level: usize },
    /// Per-level crafting quality bonus, percent.
    CraftQuality { percent_per_level: f64 },
    /// Per-level rarity-roll bonus, percent.
    RarityLuck { percent_per_level: f64 },
}

pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub max_level: u32,
    pub base_cost: u64,
    pub cost_growth: f64,
    pub effect: UpgradeEffect,
}

pub const UPGRADES: [UpgradeDef; 8] = [
    UpgradeDef {
        id: "training_grounds",
        name: "Training Grounds",
        max_level: 10,
        base_cost: 100,
        cost_growth: 1.6,
        effect: UpgradeEffect::Stat(StatModifier::percent(StatKind::Damage, 2.0)),
    },
    UpgradeDef {
        id: "fortification",
        name: "Fortification",
        max_level: 10,
        base_cost: 100,
        cost_growth: 1.6,
        effect: UpgradeEffect::Stat(StatModifier::percent(StatKind::Health, 2.0)),
    },
    UpgradeDef {
        id: "war_ledgers",
        name: "War Ledgers",
        max_level: 10,
        base_cost: 150,
        cost_growth: 1.7,
        effect: UpgradeEffect::Stat(StatModifier::percent(StatKind::GoldGain, 3.0)),
    },
    UpgradeDef {
        id: "scriptorium",
        name: "Scriptorium",
        max_level: 10,
        base_cost: 150,
        cost_growth: 1.7,
        effect: UpgradeEffect::Stat(StatModifier::percent(StatKind::XpGain, 3.0)),
    },
    UpgradeDef {
        id: "fleet_caravans",
        name: "Fleet Caravans",
        max_level: 10,
        base_cost: 200,
        cost_growth: 1.8,
        effect: UpgradeEffect::RunSpeed {
            percent_per_level: 2.0,
        },
    },
    UpgradeDef {
        id: "pack_lines",
        name: "Pack Lines",
        max_level: 8,
        base_cost: 120,
        cost_growth: 1.5,
        effect: UpgradeEffect::InventoryCap { slots_per_level: 5 },
    },
    UpgradeDef {
        id: "master_forge",
        name: "Master Forge",
        max_level: 10,
        base_cost: 250,
        cost_growth: 1.8,
        effect: UpgradeEffect::CraftQuality {
            percent_per_level: 5.0,
        },
    },
    UpgradeDef {
        id: "lucky_charms",
        name: "Lucky Charms",
        max_level: 10,
        base_cost: 300,
        cost_growth: 1.9,
        effect: UpgradeEffect::RarityLuck {
            percent_per_level: 1.0,
        },
    },
];

/// Permanent upgrades bought with reset shards. Their effect scales with
/// both the purchased level and the reset count.
pub struct PermanentUpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub max_level: u32,
    pub base_cost: u64,
}

pub const PERMANENT_UPGRADES: [PermanentUpgradeDef; 2] = [
    PermanentUpgradeDef {
        id: "power_growth",
        name: "Power Growth",
        max_level: 20,
        base_cost: 2,
    },
    PermanentUpgradeDef {
        id: "gold_growth",
        name: "Gold Growth",
        max_level: 20,
        base_cost: 2,
    },
];

pub fn upgrade_def(id: &str) -> Option<&'static UpgradeDef> {
    UPGRADES.iter().find(|def| def.id == id)
}

pub fn permanent_upgrade_def(id: &str) -> Option<&'static PermanentUpgradeDef> {
    PERMANENT_UPGRADES.iter().find(|def| def.id == id)
}

/// Gold cost to buy the next level of an upgrade currently at `level`.
pub fn upgrade_cost(def: &UpgradeDef, level: u32) -> u64 {
    (def.base_cost as f64 * def.cost_growth.powi(level as i32)) as u64
}

/// Shard cost to buy the next level of a permanent upgrade at `level`.
pub fn permanent_upgrade_cost(def: &PermanentUpgradeDef, level: u32) -> u64 {
    def.base_cost * (level as u64 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_ids_unique() {
        let mut ids: Vec<&str> = UPGRADES.iter().map(|u| u.id).collect();
        ids.extend(PERMANENT_UPGRADES.iter().map(|u| u.id));
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_upgrade_cost_grows() {
        let def = upgrade_def("training_grounds").unwrap();
        assert_eq!(upgrade_cost(def, 0), 100);
        assert!(upgrade_cost(def, 1) > upgrade_cost(def, 0));
        assert!(upgrade_cost(def, 5) > upgrade_cost(def, 4));
    }

    #[test]
    fn test_permanent_cost_is_linear() {
        let def = permanent_upgrade_def("power_growth").unwrap();
        assert_eq!(permanent_upgrade_cost(def, 0), 2);
        assert_eq!(permanent_upgrade_cost(def, 4), 10);
    }

    #[test]
    fn test_unknown_ids_rejected() {
        assert!(upgrade_def("free_money").is_none());
        assert!(permanent_upgrade_def("free_money").is_none());
    }
}
