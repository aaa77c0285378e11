pub mod definition;
pub mod loader;

pub use definition::{Combination, House, HouseSet, MatchDefinition, Round, SimultaneousMatch};
pub use loader::{MatchLoader, MatchMetadata, TEMPLATE_MATCH_ID};
