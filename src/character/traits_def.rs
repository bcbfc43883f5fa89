//! The trait catalogue. Every trait is a fixed, named bundle of stat
//! modifiers plus an affinity used by the specialization classifier.

use crate::items::types::{StatKind, StatModifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Combat,
    Gathering,
    Fishing,
}

pub struct TraitDef {
    pub id: &'static str,
    pub name: &'static str,
    pub primary: Affinity,
    /// Present on hybrid traits; scores +2 primary / +1 secondary instead
    /// of +5 primary.
    pub secondary: Option<Affinity>,
    pub modifiers: &'static [StatModifier],
}

const KEEN_EDGE: [StatModifier; 1] = [StatModifier::percent(StatKind::Damage, 8.0)];
const THICK_HIDE: [StatModifier; 1] = [StatModifier::percent(StatKind::Health, 10.0)];
const BATTLE_TRANCE: [StatModifier; 2] = [
    StatModifier::flat(StatKind::CritChance, 3.0),
    StatModifier::percent(StatKind::Speed, 4.0),
];
const PROSPECTOR: [StatModifier; 1] = [StatModifier::percent(StatKind::GoldGain, 10.0)];
const PACK_MULE: [StatModifier; 2] = [
    StatModifier::percent(StatKind::GoldGain, 5.0),
    StatModifier::percent(StatKind::LootLuck, 5.0),
];
const ANGLERS_PATIENCE: [StatModifier; 1] = [StatModifier::percent(StatKind::LootLuck, 12.0)];
const WANDERLUST: [StatModifier; 2] = [
    StatModifier::percent(StatKind::Damage, 4.0),
    StatModifier::percent(StatKind::GoldGain, 4.0),
];
const TIDE_READER: [StatModifier; 2] = [
    StatModifier::percent(StatKind::LootLuck, 6.0),
    StatModifier::percent(StatKind::GoldGain, 3.0),
];

pub const TRAITS: [TraitDef; 8] = [
    TraitDef {
        id: "keen_edge",
        name: "Keen Edge",
        primary: Affinity::Combat,
        secondary: None,
        modifiers: &KEEN_EDGE,
    },
    TraitDef {
        id: "thick_hide",
        name: "Thick Hide",
        primary: Affinity::Combat,
        secondary: None,
        modifiers: &THICK_HIDE,
    },
    TraitDef {
        id: "battle_trance",
        name: "Battle Trance",
        primary: Affinity::Combat,
        secondary: None,
        modifiers: &BATTLE_TRANCE,
    },
    TraitDef {
        id: "prospector",
        name: "Prospector",
        primary: Affinity::Gathering,
        secondary: None,
        modifiers: &PROSPECTOR,
    },
    TraitDef {
        id: "pack_mule",
        name: "Pack Mule",
        primary: Affinity::Gathering,
        secondary: None,
        modifiers: &PACK_MULE,
    },
    TraitDef {
        id: "anglers_patience",
        name: "Angler's Patience",
        primary: Affinity::Fishing,
        secondary: None,
        modifiers: &ANGLERS_PATIENCE,
    },
    TraitDef {
        id: "wanderlust",
        name: "Wanderlust",
        primary: Affinity::Combat,
        secondary: Some(Affinity::Gathering),
        modifiers: &WANDERLUST,
    },
    TraitDef {
        id: "tide_reader",
        name: "Tide Reader",
        primary: Affinity::Fishing,
        secondary: Some(Affinity::Gathering),
        modifiers: &TIDE_READER,
    },
];

pub fn trait_def(id: &str) -> Option<&'static TraitDef> {
    TRAITS.iter().find(|def| def.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_ids_are_unique() {
        let mut ids: Vec<&str> = TRAITS.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TRAITS.len());
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        assert_eq!(trait_def("keen_edge").map(|t| t.name), Some("Keen Edge"));
        assert!(trait_def("nonexistent").is_none());
    }

    #[test]
    fn test_every_trait_has_modifiers() {
        for def in &TRAITS {
            assert!(!def.modifiers.is_empty(), "{} has no modifiers", def.id);
        }
    }
}
