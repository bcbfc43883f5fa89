pub mod crafting;
pub mod generation;
pub mod rarity;
pub mod scoring;
pub mod types;

pub use types::{Item, ItemKind, Rarity, StatKind, StatLine};
