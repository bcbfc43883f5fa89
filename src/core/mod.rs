pub mod actions;
pub mod constants;
pub mod game_state;
pub mod tick;
pub mod upgrades;
