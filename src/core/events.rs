use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::core::{MatchOutcome, Phase, RoundOutcome, Scores};
use crate::rounds::Combination;

/// Data produced by the engine for the presentation layer. Events carry no
/// timestamps; whoever records them decides what the clock says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    MatchStarted {
        match_id: String,
        number_of_rounds: usize,
    },
    CombinationSelected {
        round_index: usize,
        combination: Combination,
        description: String,
    },
    CountdownUpdated {
        remaining_seconds: f32,
    },
    RoundResolved(RoundResolution),
    MatchEnded {
        outcome: MatchOutcome,
        scores: Scores,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResolution {
    pub round_index: usize,
    pub outcome: RoundOutcome,
    /// The combination that was being played; the highlight is cleared once
    /// this event is out.
    pub combination: Combination,
    pub scores: Scores,
    pub is_last_round: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    PhaseChanged,
    MatchStarted,
    CombinationSelected,
    CountdownUpdated,
    RoundResolved,
    MatchEnded,
}

impl GameEvent {
    pub fn phase_changed(from: Phase, to: Phase) -> Self {
        Self::PhaseChanged { from, to }
    }

    pub fn combination_selected(round_index: usize, combination: &Combination) -> Self {
        Self::CombinationSelected {
            round_index,
            combination: combination.clone(),
            description: combination.describe(),
        }
    }

    pub fn countdown_updated(remaining_seconds: f32) -> Self {
        Self::CountdownUpdated { remaining_seconds }
    }

    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::PhaseChanged { .. } => GameEventKind::PhaseChanged,
            GameEvent::MatchStarted { .. } => GameEventKind::MatchStarted,
            GameEvent::CombinationSelected { .. } => GameEventKind::CombinationSelected,
            GameEvent::CountdownUpdated { .. } => GameEventKind::CountdownUpdated,
            GameEvent::RoundResolved(_) => GameEventKind::RoundResolved,
            GameEvent::MatchEnded { .. } => GameEventKind::MatchEnded,
        }
    }

    pub fn as_round_resolution(&self) -> Option<&RoundResolution> {
        match self {
            GameEvent::RoundResolved(resolution) => Some(resolution),
            _ => None,
        }
    }
}

/// Finds the round resolution in a batch returned by one engine call, if any.
pub fn find_resolution(events: &[GameEvent]) -> Option<&RoundResolution> {
    events.iter().find_map(GameEvent::as_round_resolution)
}

pub trait GameEventHandler {
    fn handle_event(&mut self, event: &GameEvent);

    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            self.handle_event(event);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub event: GameEvent,
}

pub struct EventLogger {
    events: Vec<LoggedEvent>,
    max_events: usize,
}

impl EventLogger {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    pub fn get_events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn get_events_by_kind(&self, kind: GameEventKind) -> Vec<&LoggedEvent> {
        self.events
            .iter()
            .filter(|logged| logged.event.kind() == kind)
            .collect()
    }

    pub fn get_recent_events(&self, count: usize) -> Vec<&LoggedEvent> {
        self.events
            .iter()
            .rev()
            .take(count)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn export_events(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.events)
    }

    pub fn get_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn get_event_count_by_kind(&self, kind: GameEventKind) -> usize {
        self.events
            .iter()
            .filter(|logged| logged.event.kind() == kind)
            .count()
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl GameEventHandler for EventLogger {
    fn handle_event(&mut self, event: &GameEvent) {
        // Countdown updates arrive every frame and would flush everything else out.
        if event.kind() == GameEventKind::CountdownUpdated {
            return;
        }

        self.events.push(LoggedEvent {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            event: event.clone(),
        });

        if self.events.len() > self.max_events {
            self.events.remove(0);
        }
    }
}

/// Mirrors engine events into the tracing log.
#[derive(Debug, Default)]
pub struct TracingEventHandler;

impl GameEventHandler for TracingEventHandler {
    fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::CountdownUpdated { .. } => {}
            GameEvent::RoundResolved(resolution) => {
                info!(
                    "Round {} resolved: {:?} (score {})",
                    resolution.round_index + 1,
                    resolution.outcome,
                    resolution.scores
                );
            }
            GameEvent::MatchEnded { outcome, scores } => {
                info!("Match ended: {:?} (score {})", outcome, scores);
            }
            other => debug!("Game event: {:?}", other),
        }
    }
}

pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn GameEventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler<H: GameEventHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventHandler for CompositeEventHandler {
    fn handle_event(&mut self, event: &GameEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event);
        }
    }
}
