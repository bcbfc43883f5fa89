//! The skill tree — a small DAG of nodes with prerequisites and costs.
//!
//! Node effects come in three shapes: a stat bonus, an economy bonus, or a
//! named rule modifier that changes how other systems behave.

use crate::character::types::Adventurer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatTarget {
    Damage,
    Health,
    Speed,
    Crit,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EconomyTarget {
    Gold,
    Xp,
    Loot,
}

/// Rule-changing flags. These apply to every member of a shared run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleModifier {
    /// More damage, less health.
    GlassCannon,
    /// Weapon stat lines count double; the trinket slot is dead weight.
    WeaponMaster,
    /// Flat loot-luck bump for the whole party.
    TreasureSense,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEffect {
    Stat {
        target: StatTarget,
        value: f64,
        percent: bool,
    },
    Economy {
        target: EconomyTarget,
        /// Percent bonus.
        value: f64,
    },
    Modifier(RuleModifier),
}

pub struct SkillNode {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: u32,
    pub requires: &'static [&'static str],
    pub effect: NodeEffect,
}

pub const SKILL_TREE: [SkillNode; 12] = [
    // Roots
    SkillNode {
        id: "iron_grip",
        name: "Iron Grip",
        cost: 1,
        requires: &[],
        effect: NodeEffect::Stat {
            target: StatTarget::Damage,
            value: 5.0,
            percent: true,
        },
    },
    SkillNode {
        id: "stout_heart",
        name: "Stout Heart",
        cost: 1,
        requires: &[],
        effect: NodeEffect::Stat {
            target: StatTarget::Health,
            value: 8.0,
            percent: true,
        },
    },
    SkillNode {
        id: "coin_sense",
        name: "Coin Sense",
        cost: 1,
        requires: &[],
        effect: NodeEffect::Economy {
            target: EconomyTarget::Gold,
            value: 6.0,
        },
    },
    // Second ring
    SkillNode {
        id: "fleet_foot",
        name: "Fleet Foot",
        cost: 1,
        requires: &["iron_grip"],
        effect: NodeEffect::Stat {
            target: StatTarget::Speed,
            value: 5.0,
            percent: true,
        },
    },
    SkillNode {
        id: "deadeye",
        name: "Deadeye",
        cost: 2,
        requires: &["iron_grip"],
        effect: NodeEffect::Stat {
            target: StatTarget::Crit,
            value: 4.0,
            percent: false,
        },
    },
    SkillNode {
        id: "second_wind",
        name: "Second Wind",
        cost: 2,
        requires: &["stout_heart"],
        effect: NodeEffect::Stat {
            target: StatTarget::Health,
            value: 30.0,
            percent: false,
        },
    },
    SkillNode {
        id: "scholars_eye",
        name: "Scholar's Eye",
        cost: 1,
        requires: &["coin_sense"],
        effect: NodeEffect::Economy {
            target: EconomyTarget::Xp,
            value: 8.0,
        },
    },
    SkillNode {
        id: "scavenger",
        name: "Scavenger",
        cost: 2,
        requires: &["coin_sense"],
        effect: NodeEffect::Economy {
            target: EconomyTarget::Loot,
            value: 10.0,
        },
    },
    // Deep nodes
    SkillNode {
        id: "avatar",
        name: "Avatar",
        cost: 3,
        requires: &["fleet_foot", "second_wind"],
        effect: NodeEffect::Stat {
            target: StatTarget::All,
            value: 4.0,
            percent: true,
        },
    },
    SkillNode {
        id: "glass_cannon",
        name: "Glass Cannon",
        cost: 3,
        requires: &["deadeye"],
        effect: NodeEffect::Modifier(RuleModifier::GlassCannon),
    },
    SkillNode {
        id: "weapon_master",
        name: "Weapon Master",
        cost: 3,
        requires: &["deadeye"],
        effect: NodeEffect::Modifier(RuleModifier::WeaponMaster),
    },
    SkillNode {
        id: "treasure_sense",
        name: "Treasure Sense",
        cost: 3,
        requires: &["scavenger"],
        effect: NodeEffect::Modifier(RuleModifier::TreasureSense),
    },
];

pub fn node(id: &str) -> Option<&'static SkillNode> {
    SKILL_TREE.iter().find(|n| n.id == id)
}

/// A node is unlockable when it exists, is not already unlocked, all of its
/// prerequisites are unlocked, and the adventurer can pay its cost.
pub fn can_unlock(adventurer: &Adventurer, node_id: &str) -> bool {
    let Some(def) = node(node_id) else {
        return false;
    };
    if adventurer.has_node(node_id) || adventurer.skill_points < def.cost {
        return false;
    }
    def.requires.iter().all(|req| adventurer.has_node(req))
}

/// Rule modifiers contributed by an adventurer's unlocked nodes.
pub fn rule_modifiers(adventurer: &Adventurer) -> Vec<RuleModifier> {
    adventurer
        .unlocked_nodes
        .iter()
        .filter_map(|id| match node(id).map(|n| &n.effect) {
            Some(NodeEffect::Modifier(modifier)) => Some(*modifier),
            _ => None,
        })
        .collect()
}

/// Total points sunk into currently unlocked nodes (respec refund amount).
pub fn spent_points(adventurer: &Adventurer) -> u32 {
    adventurer
        .unlocked_nodes
        .iter()
        .filter_map(|id| node(id).map(|n| n.cost))
        .sum()
}
