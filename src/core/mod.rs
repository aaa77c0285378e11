pub mod engine;
pub mod match_state;
pub mod player;
pub mod events;

pub use engine::RoundEngine;
pub use match_state::{MatchState, MatchStatistics, Phase, RoundRecord};
pub use player::{MatchOutcome, PlayerId, RoundOutcome, Scores};
pub use events::{
    find_resolution, CompositeEventHandler, EventLogger, GameEvent, GameEventHandler,
    GameEventKind, LoggedEvent, RoundResolution, TracingEventHandler,
};
