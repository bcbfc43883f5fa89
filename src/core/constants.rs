//! Shared balance constants for the resolution engine.
//!
//! All core balance numbers are defined here.
//! Change once, test everywhere.

// Tick and timing
pub const TICK_INTERVAL_SECS: f64 = 1.0;
pub const MIN_RUN_DURATION_SECS: i64 = 10;
pub const SPEED_REDUCTION_CAP_PERCENT: f64 = 40.0;
pub const RESET_SPEED_PERCENT_PER_RANK: f64 = 0.5;
pub const RESET_SPEED_PERCENT_CAP: f64 = 10.0;

// Party
pub const MAX_PARTY_SIZE: usize = 3;

// XP and leveling
pub const XP_CURVE_BASE: f64 = 100.0;
pub const XP_CURVE_EXPONENT: f64 = 1.5;
pub const FIRST_SKILL_POINT_LEVEL: u32 = 5;
pub const SKILL_POINT_LEVEL_STEP: u32 = 3;

// Starter adventurer base stats
pub const STARTER_DAMAGE: f64 = 4.0;
pub const STARTER_HEALTH: f64 = 120.0;
pub const STARTER_SPEED: f64 = 0.9;
pub const STARTER_CRIT: f64 = 0.05;

// Recruitment
pub const RECRUIT_BASE_COST: u64 = 250;
pub const RECRUIT_MAX_TRAITS: usize = 2;
pub const ADVENTURER_RARITY_WEIGHTS: [f64; 5] = [60.0, 25.0, 10.0, 4.0, 1.0];
pub const ADVENTURER_RARITY_STAT_BONUS: f64 = 0.15;

// Rarity roll (base weights sum to 100, common-heavy)
pub const BASE_RARITY_WEIGHTS: [f64; 5] = [62.0, 24.0, 10.0, 3.5, 0.5];
/// Shift shares up the ladder (uncommon..legendary), proportions 1.0/0.6/0.3/0.1.
pub const RARITY_SHIFT_SHARES: [f64; 4] = [0.5, 0.3, 0.15, 0.05];
pub const RARITY_SHIFT_PER_CONTRACT_TIER: f64 = 1.5;
pub const RARITY_SHIFT_PER_BONUS_PERCENT: f64 = 0.5;
pub const RARITY_SHIFT_PER_RESET: f64 = 0.8;
pub const PITY_THRESHOLD: u32 = 40;
pub const PITY_SHIFT_PER_DRAW: f64 = 0.5;

// Loot generation
/// Stat budget per power level. Keep in step with the enemy HP tables in
/// `contracts/data.rs`.
pub const BUDGET_PER_LEVEL: f64 = 3.0;
pub const RARITY_BUDGET_MULTIPLIERS: [f64; 5] = [1.0, 1.35, 1.8, 2.4, 3.2];
/// Stat-line tier weights, tier 1 (best) through tier 7 (worst).
pub const TIER_WEIGHTS: [f64; 7] = [0.5, 9.5, 14.0, 17.0, 19.0, 20.0, 20.0];
pub const TIER_MULTIPLIERS: [f64; 7] = [1.6, 1.4, 1.25, 1.1, 1.0, 0.9, 0.8];
pub const ARMOR_HEALTH_SCALING: f64 = 5.0;
pub const TRINKET_DAMAGE_SCALING: f64 = 0.5;
pub const TRINKET_HEALTH_SCALING: f64 = 2.5;
pub const AFFIX_DAMAGE_SCALING: f64 = 0.4;
pub const AFFIX_HEALTH_SCALING: f64 = 2.0;
pub const AFFIX_PERCENT_BASE: f64 = 3.0;
pub const AFFIX_PERCENT_PER_LEVEL: f64 = 0.06;
pub const SET_CHANCE_BY_RARITY: [f64; 5] = [0.0, 0.0, 0.08, 0.12, 0.15];
pub const UNIQUE_CHANCE_EPIC: f64 = 0.03;
pub const UNIQUE_CHANCE_LEGENDARY: f64 = 0.10;
pub const FLAVOR_TIER_THRESHOLD: u8 = 2;

// Scrap value
pub const SCRAP_AFFIX_FACTOR: f64 = 0.25;
pub const SCRAP_SET_MULTIPLIER: f64 = 1.5;
pub const SCRAP_UNIQUE_MULTIPLIER: f64 = 2.0;

// Potential score
pub const POTENTIAL_PERCENT_WEIGHT: f64 = 4.0;
pub const POTENTIAL_HEALTH_WEIGHT: f64 = 0.2;
pub const POTENTIAL_LEVEL_DAMPENING: f64 = 25.0;
/// Visual tier thresholds: S, A, B, C (below C is D).
pub const VISUAL_TIER_THRESHOLDS: [f64; 4] = [90.0, 70.0, 50.0, 30.0];

// Rewards
pub const OVERPOWERED_FACTOR: f64 = 3.0;
pub const OVERPOWERED_XP_FRACTION: f64 = 0.10;
pub const MAX_LOOT_ROLLS: u32 = 30;
pub const GATHER_CYCLE_SECS: f64 = 20.0;
pub const DROP_CHANCE_CAP: f64 = 0.95;
pub const MAX_REPORTS: usize = 20;

// Combat pressure model
pub const PRESSURE_BOSS_TIME_FRACTION: f64 = 0.8;
/// Fraction of the party's total HP chipped away across one nominal run
/// duration (before the linear time growth and boss escalation).
pub const PRESSURE_PARTY_HP_FRACTION: f64 = 0.5;
pub const PRESSURE_BOSS_MULTIPLIER: f64 = 2.5;
pub const PRESSURE_BOSS_HP_MULTIPLIER: f64 = 3.0;
pub const PRESSURE_WAVE_REFILL_FRACTION: f64 = 0.5;
pub const PRESSURE_SOLO_BONUS: f64 = 1.25;
pub const PRESSURE_BOSS_KILL_BONUS: u32 = 5;

// Economy
pub const STARTING_GOLD: u64 = 100;
pub const BASE_INVENTORY_CAP: usize = 40;
pub const ENCHANT_BASE_COST: u64 = 150;
pub const REROLL_BASE_COST: u64 = 75;
pub const CRAFT_MATERIAL_COST: u64 = 10;
pub const TONIC_MATERIAL_COST: u64 = 5;
pub const TONIC_DURATION_SECS: i64 = 600;

// Specialization
pub const SPECIALIST_BONUS_PERCENT: f64 = 10.0;
pub const HYBRID_BONUS_PERCENT: f64 = 5.0;

// Reset
pub const RESET_SHARD_GOLD_DIVISOR: u64 = 1000;
pub const RESET_POWER_GROWTH_PERCENT: f64 = 1.0;
pub const RESET_GOLD_GROWTH_PERCENT: f64 = 1.0;

// Save format
pub const SAVE_VERSION_MAGIC: u64 = 0x4755_494C_4448_0001;
