pub mod recruit;
pub mod skill_tree;
pub mod specialization;
pub mod stats;
pub mod traits_def;
pub mod types;

pub use stats::EffectiveStats;
pub use types::Adventurer;
