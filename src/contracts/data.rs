//! The contract catalogue. Dungeon chains feed the loot economy, gathering
//! and fishing chains feed materials.

use super::types::{Contract, ContractKind, EnemyDef};

pub const STARTING_CONTRACTS: [&str; 3] = ["rat_cellar", "copper_vein", "riverbank"];

pub const CONTRACTS: [Contract; 9] = [
    // ── Dungeons ────────────────────────────────────────────────
    Contract {
        id: "rat_cellar",
        name: "The Rat Cellar",
        kind: ContractKind::Dungeon,
        tier: 1,
        duration_secs: 60,
        recommended_power: 20,
        item_level: 5,
        base_drop_chance: 0.35,
        gold_min: 10,
        gold_max: 25,
        xp_min: 30,
        xp_max: 60,
        pressure: false,
        enemy: Some(EnemyDef {
            name: "Cellar Rat",
            hp: 80.0,
        }),
        materials: &[],
        unlocks: Some("bandit_camp"),
    },
    Contract {
        id: "bandit_camp",
        name: "Bandit Camp",
        kind: ContractKind::Dungeon,
        tier: 2,
        duration_secs: 120,
        recommended_power: 60,
        item_level: 15,
        base_drop_chance: 0.40,
        gold_min: 40,
        gold_max: 90,
        xp_min: 120,
        xp_max: 220,
        pressure: false,
        enemy: Some(EnemyDef {
            name: "Bandit Cutthroat",
            hp: 260.0,
        }),
        materials: &[],
        unlocks: Some("haunted_keep"),
    },
    Contract {
        id: "haunted_keep",
        name: "The Haunted Keep",
        kind: ContractKind::Dungeon,
        tier: 3,
        duration_secs: 240,
        recommended_power: 150,
        item_level: 30,
        base_drop_chance: 0.45,
        gold_min: 120,
        gold_max: 260,
        xp_min: 400,
        xp_max: 700,
        pressure: false,
        enemy: Some(EnemyDef {
            name: "Hollow Knight",
            hp: 700.0,
        }),
        materials: &[],
        unlocks: Some("drake_roost"),
    },
    Contract {
        id: "drake_roost",
        name: "Drake Roost",
        kind: ContractKind::Dungeon,
        tier: 4,
        duration_secs: 480,
        recommended_power: 400,
        item_level: 50,
        base_drop_chance: 0.50,
        gold_min: 400,
        gold_max: 800,
        xp_min: 1500,
        xp_max: 2600,
        pressure: true,
        enemy: Some(EnemyDef {
            name: "Roost Drake",
            hp: 2200.0,
        }),
        materials: &[],
        unlocks: None,
    },
    // ── Gathering ───────────────────────────────────────────────
    Contract {
        id: "copper_vein",
        name: "Copper Vein",
        kind: ContractKind::Gathering,
        tier: 1,
        duration_secs: 90,
        recommended_power: 15,
        item_level: 5,
        base_drop_chance: 0.60,
        gold_min: 5,
        gold_max: 15,
        xp_min: 20,
        xp_max: 40,
        pressure: false,
        enemy: None,
        materials: &[("copper_ore", 3.0), ("tin_ore", 1.0)],
        unlocks: Some("ironwood_grove"),
    },
    Contract {
        id: "ironwood_grove",
        name: "Ironwood Grove",
        kind: ContractKind::Gathering,
        tier: 2,
        duration_secs: 180,
        recommended_power: 50,
        item_level: 15,
        base_drop_chance: 0.60,
        gold_min: 20,
        gold_max: 45,
        xp_min: 80,
        xp_max: 150,
        pressure: false,
        enemy: None,
        materials: &[("ironwood", 3.0), ("amber_sap", 1.0)],
        unlocks: Some("mystic_quarry"),
    },
    Contract {
        id: "mystic_quarry",
        name: "Mystic Quarry",
        kind: ContractKind::Gathering,
        tier: 3,
        duration_secs: 300,
        recommended_power: 140,
        item_level: 30,
        base_drop_chance: 0.55,
        gold_min: 60,
        gold_max: 140,
        xp_min: 260,
        xp_max: 450,
        pressure: false,
        enemy: None,
        materials: &[("arcane_essence", 2.0), ("deep_crystal", 1.0)],
        unlocks: None,
    },
    // ── Fishing ─────────────────────────────────────────────────
    Contract {
        id: "riverbank",
        name: "Riverbank Shallows",
        kind: ContractKind::Fishing,
        tier: 1,
        duration_secs: 75,
        recommended_power: 10,
        item_level: 5,
        base_drop_chance: 0.55,
        gold_min: 4,
        gold_max: 12,
        xp_min: 15,
        xp_max: 35,
        pressure: false,
        enemy: None,
        materials: &[("river_perch", 3.0), ("silver_eel", 1.0)],
        unlocks: Some("deep_lake"),
    },
    Contract {
        id: "deep_lake",
        name: "The Deep Lake",
        kind: ContractKind::Fishing,
        tier: 3,
        duration_secs: 200,
        recommended_power: 120,
        item_level: 25,
        base_drop_chance: 0.50,
        gold_min: 45,
        gold_max: 100,
        xp_min: 200,
        xp_max: 380,
        pressure: false,
        enemy: None,
        materials: &[("abyssal_carp", 2.0), ("pearl", 1.0)],
        unlocks: None,
    },
];

pub fn contract(id: &str) -> Option<&'static Contract> {
    CONTRACTS.iter().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_ids_unique() {
        let mut ids: Vec<&str> = CONTRACTS.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CONTRACTS.len());
    }

    #[test]
    fn test_unlock_chain_targets_exist() {
        for def in &CONTRACTS {
            if let Some(next) = def.unlocks {
                assert!(contract(next).is_some(), "{} unlocks unknown {next}", def.id);
            }
        }
    }

    #[test]
    fn test_combat_contracts_have_enemies() {
        for def in &CONTRACTS {
            match def.kind {
                ContractKind::Dungeon => {
                    assert!(def.enemy.is_some(), "{} needs an enemy", def.id)
                }
                _ => {
                    assert!(def.enemy.is_none());
                    assert!(!def.materials.is_empty(), "{} needs a loot table", def.id);
                }
            }
        }
    }

    #[test]
    fn test_starting_contracts_exist() {
        for id in STARTING_CONTRACTS {
            assert!(contract(id).is_some());
        }
    }

    #[test]
    fn test_reward_ranges_are_ordered() {
        for def in &CONTRACTS {
            assert!(def.gold_min <= def.gold_max);
            assert!(def.xp_min <= def.xp_max);
            assert!(def.base_drop_chance > 0.0 && def.base_drop_chance <= 1.0);
        }
    }
}
