//! Recruitment — rolls a new adventurer and builds the fixed starter.

use crate::character::types::{Adventurer, BaseStats, Loadout, Role};
use crate::core::constants::{
    ADVENTURER_RARITY_STAT_BONUS, ADVENTURER_RARITY_WEIGHTS, RECRUIT_MAX_TRAITS, STARTER_CRIT,
    STARTER_DAMAGE, STARTER_HEALTH, STARTER_SPEED,
};
use crate::character::traits_def::TRAITS;
use crate::items::types::{Rarity, RARITY_ORDER};
use rand::Rng;
use uuid::Uuid;

const RECRUIT_NAMES: [&str; 12] = [
    "Bramble", "Cass", "Dorian", "Edda", "Fenn", "Greta", "Halvar", "Isolde", "Joss", "Kiri",
    "Lunete", "Marrow",
];

/// The guaranteed first roster member.
pub fn starter_adventurer() -> Adventurer {
    Adventurer {
        id: Uuid::new_v4().to_string(),
        name: "Ash".to_string(),
        role: Role::Warrior,
        rarity: Rarity::Common,
        level: 1,
        xp: 0,
        base: BaseStats {
            damage: STARTER_DAMAGE,
            health: STARTER_HEALTH,
            speed: STARTER_SPEED,
            crit_chance: STARTER_CRIT,
        },
        loadout: Loadout::new(),
        traits: vec![],
        unlocked_nodes: Default::default(),
        skill_points: 0,
    }
}

/// Rolls a fresh recruit: uniform role, weighted rarity, rarity-scaled base
/// stats with a small jitter, and up to two distinct traits.
pub fn roll_recruit<R: Rng>(rng: &mut R) -> Adventurer {
    let role = Role::all()[rng.gen_range(0..3)];
    let rarity = roll_adventurer_rarity(rng);

    let rarity_mult = 1.0 + rarity.index() as f64 * ADVENTURER_RARITY_STAT_BONUS;
    let jitter = rng.gen_range(0.9..=1.1);

    // Role flavors the spread: warriors tanky, rangers fast, mages spiky.
    let (damage, health, speed, crit): (f64, f64, f64, f64) = match role {
        Role::Warrior => (4.0, 140.0, 0.85, 0.04),
        Role::Ranger => (5.0, 100.0, 1.1, 0.08),
        Role::Mage => (7.0, 80.0, 0.9, 0.06),
    };

    let trait_count = rng.gen_range(0..=RECRUIT_MAX_TRAITS);
    let mut traits: Vec<String> = Vec::with_capacity(trait_count);
    while traits.len() < trait_count {
        let candidate = TRAITS[rng.gen_range(0..TRAITS.len())].id.to_string();
        if !traits.contains(&candidate) {
            traits.push(candidate);
        }
    }

    Adventurer {
        id: Uuid::new_v4().to_string(),
        name: RECRUIT_NAMES[rng.gen_range(0..RECRUIT_NAMES.len())].to_string(),
        role,
        rarity,
        level: 1,
        xp: 0,
        base: BaseStats {
            damage: (damage * rarity_mult * jitter * 100.0).round() / 100.0,
            health: (health * rarity_mult * jitter).round(),
            speed: (speed * 100.0).round() / 100.0,
            crit_chance: crit,
        },
        loadout: Loadout::new(),
        traits,
        unlocked_nodes: Default::default(),
        skill_points: 0,
    }
}

fn roll_adventurer_rarity<R: Rng>(rng: &mut R) -> Rarity {
    let total: f64 = ADVENTURER_RARITY_WEIGHTS.iter().sum();
    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (rarity, weight) in RARITY_ORDER.iter().zip(ADVENTURER_RARITY_WEIGHTS.iter()) {
        cumulative += weight;
        if roll < cumulative {
            return *rarity;
        }
    }
    Rarity::Legendary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_starter_matches_published_base_stats() {
        let starter = starter_adventurer();
        assert_eq!(starter.base.damage, 4.0);
        assert_eq!(starter.base.health, 120.0);
        assert_eq!(starter.base.speed, 0.9);
        assert_eq!(starter.base.crit_chance, 0.05);
        assert_eq!(starter.level, 1);
        assert!(starter.loadout.iter_equipped().count() == 0);
    }

    #[test]
    fn test_recruits_have_unique_ids_and_valid_traits() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = roll_recruit(&mut rng);
        let b = roll_recruit(&mut rng);
        assert_ne!(a.id, b.id);

        for _ in 0..200 {
            let recruit = roll_recruit(&mut rng);
            assert!(recruit.traits.len() <= RECRUIT_MAX_TRAITS);
            let mut deduped = recruit.traits.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), recruit.traits.len(), "duplicate traits");
            for id in &recruit.traits {
                assert!(
                    crate::character::traits_def::trait_def(id).is_some(),
                    "unknown trait {id}"
                );
            }
        }
    }

    #[test]
    fn test_rarity_distribution_is_common_heavy() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let commons = (0..2000)
            .filter(|_| roll_recruit(&mut rng).rarity == Rarity::Common)
            .count();
        // 60% expected; allow a wide band
        assert!(
            (1000..1400).contains(&commons),
            "common recruit rate off: {commons}/2000"
        );
    }

    #[test]
    fn test_higher_rarity_recruits_hit_harder() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut common_damage = Vec::new();
        let mut rare_plus_damage = Vec::new();
        for _ in 0..3000 {
            let recruit = roll_recruit(&mut rng);
            if recruit.role != Role::Warrior {
                continue;
            }
            if recruit.rarity == Rarity::Common {
                common_damage.push(recruit.base.damage);
            } else if recruit.rarity >= Rarity::Rare {
                rare_plus_damage.push(recruit.base.damage);
            }
        }
        let avg = |v: &[f64]| v.iter().sum::<f64>() / v.len().max(1) as f64;
        assert!(
            avg(&rare_plus_damage) > avg(&common_damage),
            "rarity should scale stats"
        );
    }
}
