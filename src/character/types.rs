use crate::core::constants::{XP_CURVE_BASE, XP_CURVE_EXPONENT};
use crate::items::types::{Item, ItemKind, Rarity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Combat archetype. Determines class skills and recruitment stat spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Warrior,
    Ranger,
    Mage,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Warrior => "Warrior",
            Role::Ranger => "Ranger",
            Role::Mage => "Mage",
        }
    }

    pub fn all() -> [Role; 3] {
        [Role::Warrior, Role::Ranger, Role::Mage]
    }
}

/// Equipment slot on an adventurer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Trinket,
}

impl EquipSlot {
    pub fn all() -> [EquipSlot; 3] {
        [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Trinket]
    }

    pub fn for_kind(kind: ItemKind) -> EquipSlot {
        match kind {
            ItemKind::Weapon => EquipSlot::Weapon,
            ItemKind::Armor => EquipSlot::Armor,
            ItemKind::Trinket => EquipSlot::Trinket,
        }
    }
}

/// The three equipment slots. At most one item each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
    pub trinket: Option<Item>,
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipSlot) -> &Option<Item> {
        match slot {
            EquipSlot::Weapon => &self.weapon,
            EquipSlot::Armor => &self.armor,
            EquipSlot::Trinket => &self.trinket,
        }
    }

    pub fn set(&mut self, slot: EquipSlot, item: Option<Item>) -> Option<Item> {
        let target = match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Trinket => &mut self.trinket,
        };
        std::mem::replace(target, item)
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = (EquipSlot, &Item)> {
        EquipSlot::all()
            .into_iter()
            .filter_map(|slot| self.get(slot).as_ref().map(|item| (slot, item)))
    }
}

/// Raw stats before any modifier sources are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub damage: f64,
    pub health: f64,
    /// Attacks per second; also the pace factor in the power formula.
    pub speed: f64,
    /// Fraction in [0, 1].
    pub crit_chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adventurer {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub rarity: Rarity,
    pub level: u32,
    pub xp: u64,
    pub base: BaseStats,
    pub loadout: Loadout,
    /// Unlocked trait ids from the trait catalogue.
    #[serde(default)]
    pub traits: Vec<String>,
    /// Unlocked skill-tree node ids.
    #[serde(default)]
    pub unlocked_nodes: BTreeSet<String>,
    /// Unspent skill points.
    #[serde(default)]
    pub skill_points: u32,
}

impl Adventurer {
    pub fn xp_to_next(&self) -> u64 {
        xp_for_next_level(self.level)
    }

    pub fn has_node(&self, node_id: &str) -> bool {
        self.unlocked_nodes.contains(node_id)
    }
}

/// XP required to advance past the given level.
pub fn xp_for_next_level(level: u32) -> u64 {
    (XP_CURVE_BASE * f64::powf(level as f64, XP_CURVE_EXPONENT)) as u64
}

/// Whether reaching `level` grants a skill point: first at level 5, then
/// every third level after that (8, 11, 14, ...).
pub fn grants_skill_point(level: u32) -> bool {
    use crate::core::constants::{FIRST_SKILL_POINT_LEVEL, SKILL_POINT_LEVEL_STEP};
    level >= FIRST_SKILL_POINT_LEVEL
        && (level - FIRST_SKILL_POINT_LEVEL) % SKILL_POINT_LEVEL_STEP == 0
}
