//! Item potential scoring and the coarse D..S visual grade.

use crate::core::constants::{
    POTENTIAL_HEALTH_WEIGHT, POTENTIAL_LEVEL_DAMPENING, POTENTIAL_PERCENT_WEIGHT,
    RARITY_BUDGET_MULTIPLIERS, VISUAL_TIER_THRESHOLDS,
};
use crate::items::types::{Rarity, StatKind, StatLine, VisualTier};

/// Normalized potential score: weighted stat sum, percentage lines scaled
/// up, rarity-multiplied, dampened by power level so grades stay comparable
/// across the whole level range.
pub fn potential_score(stats: &[StatLine], rarity: Rarity, level: u32) -> f64 {
    let mut weighted = 0.0;
    for line in stats {
        let weight = if line.is_percent {
            POTENTIAL_PERCENT_WEIGHT
        } else if line.stat == StatKind::Health {
            POTENTIAL_HEALTH_WEIGHT
        } else {
            1.0
        };
        weighted += line.value * weight;
    }

    let rarity_mult = RARITY_BUDGET_MULTIPLIERS[rarity.index()];
    let dampening = 1.0 + level as f64 / POTENTIAL_LEVEL_DAMPENING;
    let score = weighted * rarity_mult / dampening;
    (score * 100.0).round() / 100.0
}

pub fn visual_tier_for(potential: f64) -> VisualTier {
    let [s, a, b, c] = VISUAL_TIER_THRESHOLDS;
    if potential >= s {
        VisualTier::S
    } else if potential >= a {
        VisualTier::A
    } else if potential >= b {
        VisualTier::B
    } else if potential >= c {
        VisualTier::C
    } else {
        VisualTier::D
    }
}
