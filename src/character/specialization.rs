//! Specialization classifier — scores an adventurer's combat, gathering,
//! and fishing affinity from traits, skill nodes, and equipped stat names,
//! then derives a small efficiency bonus.

use crate::character::skill_tree::{self, EconomyTarget, NodeEffect, RuleModifier};
use crate::character::traits_def::{trait_def, Affinity};
use crate::character::types::Adventurer;
use crate::core::constants::{HYBRID_BONUS_PERCENT, SPECIALIST_BONUS_PERCENT};
use crate::items::types::StatKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Neutral,
    Combat,
    Gathering,
    Fishing,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Specialization {
    pub kind: SpecKind,
    pub bonus_percent: f64,
    pub combat_score: u32,
    pub gathering_score: u32,
    pub fishing_score: u32,
}

/// Classifies an adventurer. A zero top score is Neutral with no bonus; a
/// strict winner is a specialist at 10%; a tie for the top is Hybrid at 5%.
pub fn classify(adventurer: &Adventurer) -> Specialization {
    let mut combat = 0u32;
    let mut gathering = 0u32;
    let mut fishing = 0u32;

    let mut add = |affinity: Affinity, points: u32| match affinity {
        Affinity::Combat => combat += points,
        Affinity::Gathering => gathering += points,
        Affinity::Fishing => fishing += points,
    };

    // Traits: +5 own type, +2/+1 for hybrids
    for id in &adventurer.traits {
        if let Some(def) = trait_def(id) {
            match def.secondary {
                Some(secondary) => {
                    add(def.primary, 2);
                    add(secondary, 1);
                }
                None => add(def.primary, 5),
            }
        }
    }

    // Skill nodes: stat nodes and combat-flavored modifiers +2 combat,
    // gold nodes +2 gathering, loot nodes +1 fishing
    for id in &adventurer.unlocked_nodes {
        if let Some(node) = skill_tree::node(id) {
            match &node.effect {
                NodeEffect::Stat { .. } => combat += 2,
                NodeEffect::Economy { target, .. } => match target {
                    EconomyTarget::Gold => gathering += 2,
                    EconomyTarget::Loot => fishing += 1,
                    EconomyTarget::Xp => {}
                },
                NodeEffect::Modifier(modifier) => match modifier {
                    RuleModifier::GlassCannon | RuleModifier::WeaponMaster => combat += 2,
                    RuleModifier::TreasureSense => fishing += 1,
                },
            }
        }
    }

    // Equipped stat names: combat stats +2; gold gain +3 gathering;
    // loot luck splits +2 gathering / +3 fishing
    for (_, item) in adventurer.loadout.iter_equipped() {
        for line in &item.stats {
            match line.stat {
                StatKind::Damage | StatKind::Health | StatKind::Speed | StatKind::CritChance => {
                    combat += 2
                }
                StatKind::GoldGain => gathering += 3,
                StatKind::LootLuck => {
                    gathering += 2;
                    fishing += 3;
                }
                StatKind::XpGain => {}
            }
        }
    }

    let mut scores = [
        (SpecKind::Combat, combat),
        (SpecKind::Gathering, gathering),
        (SpecKind::Fishing, fishing),
    ];
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    let (top_kind, top) = scores[0];
    let (_, second) = scores[1];

    let (kind, bonus_percent) = if top == 0 {
        (SpecKind::Neutral, 0.0)
    } else if top > second {
        (top_kind, SPECIALIST_BONUS_PERCENT)
    } else {
        (SpecKind::Hybrid, HYBRID_BONUS_PERCENT)
    };

    Specialization {
        kind,
        bonus_percent,
        combat_score: combat,
        gathering_score: gathering,
        fishing_score: fishing,
    }
}
