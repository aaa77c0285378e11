pub mod core;
pub mod rounds;
pub mod input;
pub mod ui;
pub mod config;
pub mod utils;

pub use crate::core::{engine::RoundEngine, match_state::{MatchState, Phase}, events::GameEvent};
pub use crate::rounds::{Combination, House, HouseSet, MatchDefinition, Round};
pub use crate::ui::GameInterface;
pub use crate::config::Config;

// Re-export commonly used types
pub type Result<T> = anyhow::Result<T>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
