//! The stat resolver — folds every modifier source into one
//! `(flat, percent)` accumulator pair per stat and produces the final
//! effective stats for an adventurer.
//!
//! Source order: global upgrades, class skills, traits, skill-tree nodes,
//! party rule modifiers, equipped stat lines, set bonuses, unique effects,
//! specialization, reset growth, consumable buffs. Every contribution is an
//! independent delta on the same accumulator, so the ordering is
//! observationally equivalent to the layered description and much simpler
//! to test.

use crate::character::skill_tree::{
    self, EconomyTarget, NodeEffect, RuleModifier, StatTarget,
};
use crate::character::specialization::{classify, SpecKind};
use crate::character::traits_def::trait_def;
use crate::character::types::{Adventurer, EquipSlot, Role};
use crate::core::constants::{RESET_GOLD_GROWTH_PERCENT, RESET_POWER_GROWTH_PERCENT};
use crate::core::game_state::GameState;
use crate::core::upgrades::{upgrade_def, UpgradeEffect};
use crate::items::types::{
    set_bonus, unique_effect_modifiers, ModOp, StatKind, StatModifier,
};
use std::collections::BTreeSet;

/// Final effective stats. Damage and health are floored integers; speed and
/// the percentage bonuses are rounded to two decimals; everything clamps at
/// zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStats {
    pub damage: u32,
    pub health: u32,
    pub speed: f64,
    /// Fraction in [0, ...), e.g. 0.05 for 5%.
    pub crit_chance: f64,
    /// Percent bonuses.
    pub gold_gain: f64,
    pub xp_gain: f64,
    pub loot_luck: f64,
}

impl EffectiveStats {
    /// Published power formula:
    /// `floor((damage * (1 + crit) + health / 5) * speed)`.
    pub fn power(&self) -> u32 {
        ((self.damage as f64 * (1.0 + self.crit_chance) + self.health as f64 / 5.0) * self.speed)
            .floor() as u32
    }

    /// Expected damage per second.
    pub fn dps(&self) -> f64 {
        self.damage as f64 * (1.0 + self.crit_chance) * self.speed
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    flat: f64,
    percent: f64,
}

impl Accumulator {
    fn resolve(&self) -> f64 {
        (self.flat * (1.0 + self.percent / 100.0)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AccumulatorSet {
    damage: Accumulator,
    health: Accumulator,
    speed: Accumulator,
    crit: Accumulator,
    gold: Accumulator,
    xp: Accumulator,
    loot: Accumulator,
}

impl AccumulatorSet {
    fn seeded(adventurer: &Adventurer) -> Self {
        let mut set = Self::default();
        set.damage.flat = adventurer.base.damage;
        set.health.flat = adventurer.base.health;
        set.speed.flat = adventurer.base.speed;
        set.crit.flat = adventurer.base.crit_chance;
        set
    }

    /// Single interpreter for modifier records.
    ///
    /// Crit flat values are percentage points added to the fraction. The
    /// economy stats (gold/xp/loot) are percent bonuses themselves, so both
    /// ops land in their flat bucket.
    fn apply(&mut self, modifier: &StatModifier) {
        match modifier.stat {
            StatKind::Damage => apply_op(&mut self.damage, modifier.op, modifier.value),
            StatKind::Health => apply_op(&mut self.health, modifier.op, modifier.value),
            StatKind::Speed => apply_op(&mut self.speed, modifier.op, modifier.value),
            StatKind::CritChance => match modifier.op {
                ModOp::Flat => self.crit.flat += modifier.value / 100.0,
                ModOp::Percent => self.crit.percent += modifier.value,
            },
            StatKind::GoldGain => self.gold.flat += modifier.value,
            StatKind::XpGain => self.xp.flat += modifier.value,
            StatKind::LootLuck => self.loot.flat += modifier.value,
        }
    }

    fn apply_scaled(&mut self, modifier: &StatModifier, factor: f64) {
        self.apply(&StatModifier {
            value: modifier.value * factor,
            ..*modifier
        });
    }

    fn finish(self) -> EffectiveStats {
        EffectiveStats {
            damage: self.damage.resolve().floor() as u32,
            health: self.health.resolve().floor() as u32,
            speed: round2(self.speed.resolve()),
            crit_chance: round2(self.crit.resolve()),
            gold_gain: round2(self.gold.resolve()),
            xp_gain: round2(self.xp.resolve()),
            loot_luck: round2(self.loot.resolve()),
        }
    }
}

fn apply_op(acc: &mut Accumulator, op: ModOp, value: f64) {
    match op {
        ModOp::Flat => acc.flat += value,
        ModOp::Percent => acc.percent += value,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Effective stats for an adventurer outside any party context: only the
/// adventurer's own rule modifiers apply.
pub fn effective_stats(adventurer: &Adventurer, state: &GameState, now: i64) -> EffectiveStats {
    let own: BTreeSet<RuleModifier> =
        skill_tree::rule_modifiers(adventurer).into_iter().collect();
    effective_stats_in_party(adventurer, state, &own, now)
}

/// Effective stats with an explicit set of active rule modifiers — used for
/// run snapshots, where every member shares the party's union of flags.
pub fn effective_stats_in_party(
    adventurer: &Adventurer,
    state: &GameState,
    modifiers: &BTreeSet<RuleModifier>,
    now: i64,
) -> EffectiveStats {
    let mut acc = AccumulatorSet::seeded(adventurer);
    let weapon_master = modifiers.contains(&RuleModifier::WeaponMaster);

    // 1. Global purchased upgrades
    for (id, level) in &state.upgrades {
        if let Some(def) = upgrade_def(id) {
            if let UpgradeEffect::Stat(per_level) = def.effect {
                acc.apply_scaled(&per_level, *level as f64);
            }
        }
    }

    // 2. Level-gated class skills
    for modifier in class_skill_modifiers(adventurer.role, adventurer.level) {
        acc.apply(&modifier);
    }

    // 3. Traits
    for id in &adventurer.traits {
        if let Some(def) = trait_def(id) {
            for modifier in def.modifiers {
                acc.apply(modifier);
            }
        }
    }

    // 4. Skill-tree stat and economy nodes
    for id in &adventurer.unlocked_nodes {
        if let Some(node) = skill_tree::node(id) {
            apply_node_effect(&mut acc, &node.effect);
        }
    }

    // 5. Active rule modifiers (party union)
    for modifier in modifiers {
        match modifier {
            RuleModifier::GlassCannon => {
                acc.damage.percent += 25.0;
                acc.health.percent -= 15.0;
            }
            RuleModifier::TreasureSense => acc.loot.flat += 10.0,
            RuleModifier::WeaponMaster => {} // handled in the item pass
        }
    }

    // 6. Equipped stat lines (tier 0 lines belong to the unique pass)
    for (slot, item) in adventurer.loadout.iter_equipped() {
        if weapon_master && slot == EquipSlot::Trinket {
            continue;
        }
        let factor = if weapon_master && slot == EquipSlot::Weapon {
            2.0
        } else {
            1.0
        };
        for line in item.stats.iter().filter(|line| line.tier != 0) {
            let op = if line.is_percent && matches!(line.stat, StatKind::Speed) {
                ModOp::Percent
            } else {
                ModOp::Flat
            };
            acc.apply_scaled(
                &StatModifier {
                    stat: line.stat,
                    op,
                    value: line.value,
                },
                factor,
            );
        }
    }

    // 7. Set bonuses at met piece counts
    let mut sets: Vec<(&str, usize)> = Vec::new();
    for (slot, item) in adventurer.loadout.iter_equipped() {
        if weapon_master && slot == EquipSlot::Trinket {
            continue;
        }
        if let Some(set_id) = item.set_id.as_deref() {
            match sets.iter_mut().find(|(id, _)| *id == set_id) {
                Some((_, count)) => *count += 1,
                None => sets.push((set_id, 1)),
            }
        }
    }
    for (set_id, pieces) in sets {
        for modifier in set_bonus(set_id, pieces) {
            acc.apply(modifier);
        }
    }

    // 8. Unique item effects
    for (slot, item) in adventurer.loadout.iter_equipped() {
        if weapon_master && slot == EquipSlot::Trinket {
            continue;
        }
        if let Some(unique_id) = &item.unique_effect {
            for modifier in unique_effect_modifiers(unique_id) {
                acc.apply(modifier);
            }
        }
    }

    // 9. Specialization bonus
    let spec = classify(adventurer);
    match spec.kind {
        SpecKind::Combat => {
            acc.damage.percent += spec.bonus_percent;
            acc.health.percent += spec.bonus_percent;
        }
        SpecKind::Gathering => {
            acc.gold.flat += spec.bonus_percent;
            acc.loot.flat += spec.bonus_percent;
        }
        SpecKind::Fishing => acc.loot.flat += spec.bonus_percent * 2.0,
        SpecKind::Hybrid => {
            acc.damage.percent += spec.bonus_percent / 2.0;
            acc.gold.flat += spec.bonus_percent / 2.0;
        }
        SpecKind::Neutral => {}
    }

    // 10. Permanent reset growth
    if state.reset_count > 0 {
        let resets = state.reset_count as f64;
        if let Some(level) = state.permanent_upgrades.get("power_growth") {
            let bonus = *level as f64 * resets * RESET_POWER_GROWTH_PERCENT;
            acc.damage.percent += bonus;
            acc.health.percent += bonus;
        }
        if let Some(level) = state.permanent_upgrades.get("gold_growth") {
            acc.gold.flat += *level as f64 * resets * RESET_GOLD_GROWTH_PERCENT;
        }
    }

    // 11. Unexpired consumable buffs
    for buff in &state.buffs {
        if buff.expires_at > now {
            acc.apply(&buff.modifier);
        }
    }

    acc.finish()
}

fn apply_node_effect(acc: &mut AccumulatorSet, effect: &NodeEffect) {
    match effect {
        NodeEffect::Stat {
            target,
            value,
            percent,
        } => {
            let op = if *percent { ModOp::Percent } else { ModOp::Flat };
            let stats: &[StatKind] = match target {
                StatTarget::Damage => &[StatKind::Damage],
                StatTarget::Health => &[StatKind::Health],
                StatTarget::Speed => &[StatKind::Speed],
                StatTarget::Crit => &[StatKind::CritChance],
                StatTarget::All => &[
                    StatKind::Damage,
                    StatKind::Health,
                    StatKind::Speed,
                    StatKind::CritChance,
                ],
            };
            for stat in stats {
                acc.apply(&StatModifier {
                    stat: *stat,
                    op,
                    value: *value,
                });
            }
        }
        NodeEffect::Economy { target, value } => {
            let stat = match target {
                EconomyTarget::Gold => StatKind::GoldGain,
                EconomyTarget::Xp => StatKind::XpGain,
                EconomyTarget::Loot => StatKind::LootLuck,
            };
            acc.apply(&StatModifier::percent(stat, *value));
        }
        NodeEffect::Modifier(_) => {}
    }
}

/// Fixed class skills, gated by level.
pub fn class_skill_modifiers(role: Role, level: u32) -> Vec<StatModifier> {
    let mut modifiers = Vec::new();
    let gates: [(u32, StatModifier); 3] = match role {
        Role::Warrior => [
            (5, StatModifier::percent(StatKind::Health, 10.0)),
            (15, StatModifier::percent(StatKind::Damage, 10.0)),
            (30, StatModifier::flat(StatKind::CritChance, 2.0)),
        ],
        Role::Ranger => [
            (5, StatModifier::percent(StatKind::Speed, 5.0)),
            (15, StatModifier::flat(StatKind::CritChance, 3.0)),
            (30, StatModifier::percent(StatKind::Damage, 10.0)),
        ],
        Role::Mage => [
            (5, StatModifier::percent(StatKind::Damage, 10.0)),
            (15, StatModifier::percent(StatKind::XpGain, 8.0)),
            (30, StatModifier::percent(StatKind::LootLuck, 10.0)),
        ],
    };
    for (gate, modifier) in gates {
        if level >= gate {
            modifiers.push(modifier);
        }
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game_state::GameState;
    use crate::items::types::{Item, ItemKind, Rarity, StatLine, VisualTier};

    fn bare_state() -> GameState {
        GameState::new(0)
    }

    fn starter(state: &GameState) -> &Adventurer {
        &state.roster[0]
    }

    fn make_item(kind: ItemKind, stats: Vec<StatLine>) -> Item {
        Item {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            weapon_kind: None,
            rarity: Rarity::Common,
            power_level: 1,
            stats,
            scrap_value: 1,
            potential: 0.0,
            visual_tier: VisualTier::D,
            set_id: None,
            unique_effect: None,
            flavor: None,
        }
    }

    fn damage_line(value: f64) -> StatLine {
        StatLine {
            stat: StatKind::Damage,
            value,
            is_percent: false,
            tier: 4,
        }
    }

    #[test]
    fn test_bare_starter_matches_base_stats() {
        let state = bare_state();
        let stats = effective_stats(starter(&state), &state, 0);

        assert_eq!(stats.damage, 4);
        assert_eq!(stats.health, 120);
        assert!((stats.speed - 0.9).abs() < 1e-9);
        assert!((stats.crit_chance - 0.05).abs() < 1e-9);
        assert_eq!(stats.gold_gain, 0.0);
        assert_eq!(stats.xp_gain, 0.0);
        assert_eq!(stats.loot_luck, 0.0);
    }

    #[test]
    fn test_published_power_formula() {
        // floor((4 * 1.05 + 120/5) * 0.9) = floor(25.38) = 25
        let state = bare_state();
        let stats = effective_stats(starter(&state), &state, 0);
        assert_eq!(stats.power(), 25);
    }

    #[test]
    fn test_stats_never_negative() {
        let mut state = bare_state();
        // GlassCannon on a nearly-dead base should clamp, not underflow
        state.roster[0].unlocked_nodes.insert("glass_cannon".into());
        state.roster[0].base.health = 1.0;
        let stats = effective_stats(&state.roster[0], &state, 0);
        assert!(stats.health < 120);
        let all = [
            stats.damage as f64,
            stats.health as f64,
            stats.speed,
            stats.crit_chance,
            stats.gold_gain,
            stats.xp_gain,
            stats.loot_luck,
        ];
        for value in all {
            assert!(value >= 0.0 && value.is_finite());
        }
    }

    #[test]
    fn test_equipment_lines_add_flat_stats() {
        let mut state = bare_state();
        let weapon = make_item(ItemKind::Weapon, vec![damage_line(10.0)]);
        state.roster[0]
            .loadout
            .set(EquipSlot::Weapon, Some(weapon));

        // The damage line also tips the classifier into combat specialist:
        // (4 + 10) * 1.10 = 15.4, floored
        let stats = effective_stats(&state.roster[0], &state, 0);
        assert_eq!(stats.damage, 15);
    }

    #[test]
    fn test_upgrades_scale_with_level() {
        let mut state = bare_state();
        state.roster[0].base.damage = 100.0;
        state.upgrades.insert("training_grounds".into(), 5);

        // +2% per level * 5 = +10%
        let stats = effective_stats(&state.roster[0], &state, 0);
        assert_eq!(stats.damage, 110);
    }

    #[test]
    fn test_glass_cannon_trades_health_for_damage() {
        let mut state = bare_state();
        state.roster[0].base.damage = 100.0;
        state.roster[0].base.health = 100.0;
        let plain = effective_stats(&state.roster[0], &state, 0);

        state.roster[0].unlocked_nodes.insert("glass_cannon".into());
        let cannon = effective_stats(&state.roster[0], &state, 0);

        assert!(cannon.damage > plain.damage);
        assert!(cannon.health < plain.health);
    }

    #[test]
    fn test_weapon_master_doubles_weapon_and_disables_trinket() {
        let mut state = bare_state();
        state.roster[0].base.damage = 10.0;
        let weapon = make_item(ItemKind::Weapon, vec![damage_line(10.0)]);
        let trinket = make_item(ItemKind::Trinket, vec![damage_line(50.0)]);
        state.roster[0].loadout.set(EquipSlot::Weapon, Some(weapon));
        state.roster[0]
            .loadout
            .set(EquipSlot::Trinket, Some(trinket));

        // Combat-specialized by its gear: (10 + 10 + 50) * 1.10 = 77
        let plain = effective_stats(&state.roster[0], &state, 0);
        assert_eq!(plain.damage, 77);

        state
            .roster[0]
            .unlocked_nodes
            .insert("weapon_master".into());
        // 10 base + 20 doubled weapon, trinket dead: (10 + 20) * 1.10 = 33
        let mastered = effective_stats(&state.roster[0], &state, 0);
        assert_eq!(mastered.damage, 33);
    }

    #[test]
    fn test_party_modifiers_apply_to_all_members() {
        let state = bare_state();
        let mut party_mods = BTreeSet::new();
        party_mods.insert(RuleModifier::GlassCannon);

        let solo = effective_stats(starter(&state), &state, 0);
        let in_party = effective_stats_in_party(starter(&state), &state, &party_mods, 0);
        assert!(in_party.damage > solo.damage);
        assert!(in_party.health < solo.health);
    }

    #[test]
    fn test_set_bonus_requires_two_pieces() {
        let mut state = bare_state();
        state.roster[0].base.damage = 100.0;

        let mut weapon = make_item(ItemKind::Weapon, vec![]);
        weapon.set_id = Some("wolfpack".into());
        state.roster[0].loadout.set(EquipSlot::Weapon, Some(weapon));
        let one_piece = effective_stats(&state.roster[0], &state, 0);
        assert_eq!(one_piece.damage, 100);

        let mut armor = make_item(ItemKind::Armor, vec![]);
        armor.set_id = Some("wolfpack".into());
        state.roster[0].loadout.set(EquipSlot::Armor, Some(armor));
        let two_pieces = effective_stats(&state.roster[0], &state, 0);
        // wolfpack(2): +8% damage
        assert_eq!(two_pieces.damage, 108);
    }

    #[test]
    fn test_unique_effect_applies_via_catalogue() {
        let mut state = bare_state();
        state.roster[0].base.health = 100.0;
        let mut armor = make_item(ItemKind::Armor, vec![]);
        armor.unique_effect = Some("bulwark_of_ages".into());
        state.roster[0].loadout.set(EquipSlot::Armor, Some(armor));

        let stats = effective_stats(&state.roster[0], &state, 0);
        // +25% health
        assert_eq!(stats.health, 125);
    }

    #[test]
    fn test_tier_zero_lines_are_not_double_counted() {
        let mut state = bare_state();
        state.roster[0].base.health = 100.0;
        let mut armor = make_item(
            ItemKind::Armor,
            vec![StatLine {
                stat: StatKind::Health,
                value: 25.0,
                is_percent: true,
                tier: 0,
            }],
        );
        armor.unique_effect = Some("bulwark_of_ages".into());
        state.roster[0].loadout.set(EquipSlot::Armor, Some(armor));

        // Only the catalogue's +25% applies (not a second +25% from the
        // line itself), plus the +10% combat-specialist bonus the health
        // line earns: 100 * (1 + 0.35) = 135
        let stats = effective_stats(&state.roster[0], &state, 0);
        assert_eq!(stats.health, 135);
    }

    #[test]
    fn test_reset_growth_scales_with_reset_count() {
        let mut state = bare_state();
        state.roster[0].base.damage = 100.0;
        state.permanent_upgrades.insert("power_growth".into(), 2);

        let no_resets = effective_stats(&state.roster[0], &state, 0);
        assert_eq!(no_resets.damage, 100);

        state.reset_count = 5;
        let with_resets = effective_stats(&state.roster[0], &state, 0);
        // 2 levels * 5 resets * 1% = +10%
        assert_eq!(with_resets.damage, 110);
    }

    #[test]
    fn test_expired_buffs_are_ignored() {
        let mut state = bare_state();
        state.roster[0].base.damage = 100.0;
        state.buffs.push(crate::core::game_state::Buff {
            id: "war_draught".into(),
            modifier: StatModifier::percent(StatKind::Damage, 20.0),
            expires_at: 100,
        });

        let active = effective_stats(&state.roster[0], &state, 50);
        assert_eq!(active.damage, 120);

        let expired = effective_stats(&state.roster[0], &state, 100);
        assert_eq!(expired.damage, 100);
    }

    #[test]
    fn test_gathering_specialist_bonus_lands_on_gold_and_loot() {
        let mut state = bare_state();
        state.roster[0].traits.push("prospector".into());
        let stats = effective_stats(&state.roster[0], &state, 0);
        // +10 from the trait, +10 from the gathering-specialist bonus
        assert_eq!(stats.gold_gain, 20.0);
        assert_eq!(stats.loot_luck, 10.0);
        assert_eq!(stats.damage, 4, "combat stats untouched");
    }

    #[test]
    fn test_class_skills_gate_by_level() {
        assert!(class_skill_modifiers(Role::Warrior, 4).is_empty());
        assert_eq!(class_skill_modifiers(Role::Warrior, 5).len(), 1);
        assert_eq!(class_skill_modifiers(Role::Warrior, 30).len(), 3);
        assert_eq!(class_skill_modifiers(Role::Mage, 15).len(), 2);
    }

    #[test]
    fn test_crit_contributions_are_percentage_points() {
        let mut state = bare_state();
        // Deadeye: +4 crit points
        state.roster[0].unlocked_nodes.insert("iron_grip".into());
        state.roster[0].unlocked_nodes.insert("deadeye".into());
        let stats = effective_stats(&state.roster[0], &state, 0);
        // 0.05 base + 0.04 = 0.09
        assert!((stats.crit_chance - 0.09).abs() < 1e-9);
    }
}
