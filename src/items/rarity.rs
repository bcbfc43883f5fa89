//! Rarity rolling — pity- and context-adjusted weight vector plus
//! cumulative-weight roulette sampling.

use crate::core::constants::{
    BASE_RARITY_WEIGHTS, PITY_SHIFT_PER_DRAW, PITY_THRESHOLD, RARITY_SHIFT_PER_BONUS_PERCENT,
    RARITY_SHIFT_PER_CONTRACT_TIER, RARITY_SHIFT_PER_RESET, RARITY_SHIFT_SHARES,
};
use crate::items::types::{Rarity, RARITY_ORDER};
use rand::Rng;

/// Everything that bends the rarity distribution for one roll.
#[derive(Debug, Clone, Copy, Default)]
pub struct RarityContext {
    pub contract_tier: u32,
    /// Player-wide rarity bonus, in percent.
    pub rarity_bonus_percent: f64,
    /// Consecutive draws without a legendary.
    pub pity: u32,
    pub reset_count: u32,
    /// Contextual rank/mutation shift, already in weight points.
    pub rank_shift: f64,
}

/// Computes the adjusted rarity weight vector, normalized to sum to 100.
///
/// A single scalar shift is taken from Common and redistributed up the
/// ladder in fixed proportions. Pity past the threshold moves additional
/// weight straight from Common into Legendary. A degenerate (all-zero)
/// result falls back to the base table unchanged.
pub fn rarity_weights(ctx: &RarityContext) -> [f64; 5] {
    let mut weights = BASE_RARITY_WEIGHTS;

    let shift = ctx.contract_tier as f64 * RARITY_SHIFT_PER_CONTRACT_TIER
        + ctx.rarity_bonus_percent * RARITY_SHIFT_PER_BONUS_PERCENT
        + ctx.reset_count as f64 * RARITY_SHIFT_PER_RESET
        + ctx.rank_shift;

    weights[0] -= shift;
    for (idx, share) in RARITY_SHIFT_SHARES.iter().enumerate() {
        weights[idx + 1] += shift * share;
    }

    if ctx.pity > PITY_THRESHOLD {
        let pity_shift = (ctx.pity - PITY_THRESHOLD) as f64 * PITY_SHIFT_PER_DRAW;
        weights[0] -= pity_shift;
        weights[4] += pity_shift;
    }

    for weight in &mut weights {
        *weight = weight.max(0.0);
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return BASE_RARITY_WEIGHTS;
    }

    for weight in &mut weights {
        *weight = *weight * 100.0 / total;
    }
    weights
}

/// Samples one rarity via roulette over the fixed rarity order.
pub fn roll_rarity<R: Rng>(ctx: &RarityContext, rng: &mut R) -> Rarity {
    let weights = rarity_weights(ctx);
    let roll = rng.gen_range(0.0..100.0);

    let mut cumulative = 0.0;
    for (rarity, weight) in RARITY_ORDER.iter().zip(weights.iter()) {
        cumulative += weight;
        if roll < cumulative {
            return *rarity;
        }
    }
    // Floating-point slack on the last bucket.
    Rarity::Legendary
}
