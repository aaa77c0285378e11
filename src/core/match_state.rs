use serde::{Deserialize, Serialize};
use std::fmt;
use crate::core::{MatchOutcome, PlayerId, RoundOutcome, Scores};
use crate::rounds::Combination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Start,
    WaitingRound,
    Playing,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Start => "Start",
            Phase::WaitingRound => "WaitingRound",
            Phase::Playing => "Playing",
            Phase::GameOver => "GameOver",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_index: usize,
    pub outcome: RoundOutcome,
    pub combination: Combination,
    /// Seconds from the start of the round until it was resolved.
    pub elapsed_seconds: f32,
}

/// Everything the engine mutates during a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: Phase,
    pub current_round_index: usize,
    pub remaining_seconds: f32,
    pub scores: Scores,
    pub active_combination: Option<Combination>,
    pub last_round_outcome: Option<RoundOutcome>,
    pub match_outcome: Option<MatchOutcome>,
    pub round_history: Vec<RoundRecord>,
}

impl MatchState {
    pub fn new(seconds_per_round: f32) -> Self {
        Self {
            phase: Phase::Start,
            current_round_index: 0,
            remaining_seconds: seconds_per_round,
            scores: Scores::default(),
            active_combination: None,
            last_round_outcome: None,
            match_outcome: None,
            round_history: Vec::new(),
        }
    }

    pub fn reset_for_match(&mut self, seconds_per_round: f32) {
        *self = Self {
            phase: self.phase,
            ..Self::new(seconds_per_round)
        };
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn player1_score(&self) -> u32 {
        self.scores.player1
    }

    pub fn player2_score(&self) -> u32 {
        self.scores.player2
    }

    /// Whole seconds left, truncated the way the timer panel shows them.
    pub fn countdown_display(&self) -> u32 {
        self.remaining_seconds.max(0.0) as u32
    }

    pub fn rounds_played(&self) -> usize {
        self.round_history.len()
    }

    pub fn get_statistics(&self) -> MatchStatistics {
        let mut stats = MatchStatistics {
            rounds_played: self.round_history.len(),
            ..MatchStatistics::default()
        };

        for record in &self.round_history {
            match record.outcome {
                RoundOutcome::Won(player) => {
                    match player {
                        PlayerId::One => stats.player1_wins += 1,
                        PlayerId::Two => stats.player2_wins += 1,
                    }

                    let faster = stats
                        .fastest_win
                        .map(|(_, seconds)| record.elapsed_seconds < seconds)
                        .unwrap_or(true);
                    if faster {
                        stats.fastest_win = Some((player, record.elapsed_seconds));
                    }
                }
                RoundOutcome::TimedOut => stats.timeouts += 1,
                RoundOutcome::Tied => stats.ties += 1,
            }
        }

        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub rounds_played: usize,
    pub player1_wins: usize,
    pub player2_wins: usize,
    pub timeouts: usize,
    pub ties: usize,
    pub fastest_win: Option<(PlayerId, f32)>,
}

impl MatchStatistics {
    pub fn get_fastest_win_formatted(&self) -> String {
        match self.fastest_win {
            Some((player, seconds)) => format!("{} in {:.2}s", player, seconds),
            None => "No round was won".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(round_index: usize, outcome: RoundOutcome, elapsed_seconds: f32) -> RoundRecord {
        RoundRecord {
            round_index,
            outcome,
            combination: Combination::new([0]),
            elapsed_seconds,
        }
    }

    #[test]
    fn test_match_state_creation() {
        let state = MatchState::new(10.0);

        assert_eq!(state.phase, Phase::Start);
        assert_eq!(state.current_round_index, 0);
        assert_eq!(state.remaining_seconds, 10.0);
        assert_eq!(state.scores, Scores::default());
        assert!(state.active_combination.is_none());
        assert!(state.round_history.is_empty());
    }

    #[test]
    fn test_reset_keeps_phase() {
        let mut state = MatchState::new(10.0);
        state.phase = Phase::GameOver;
        state.current_round_index = 2;
        state.scores.award(PlayerId::One);
        state.round_history.push(record(0, RoundOutcome::TimedOut, 10.0));

        state.reset_for_match(8.0);

        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.current_round_index, 0);
        assert_eq!(state.remaining_seconds, 8.0);
        assert_eq!(state.scores.total(), 0);
        assert!(state.round_history.is_empty());
    }

    #[test]
    fn test_countdown_display_truncates() {
        let mut state = MatchState::new(10.0);

        state.remaining_seconds = 7.9;
        assert_eq!(state.countdown_display(), 7);

        state.remaining_seconds = 0.4;
        assert_eq!(state.countdown_display(), 0);
    }

    #[test]
    fn test_statistics() {
        let mut state = MatchState::new(10.0);
        state.round_history = vec![
            record(0, RoundOutcome::Won(PlayerId::Two), 4.5),
            record(1, RoundOutcome::TimedOut, 10.0),
            record(2, RoundOutcome::Won(PlayerId::One), 2.25),
            record(3, RoundOutcome::Tied, 3.0),
        ];

        let stats = state.get_statistics();
        assert_eq!(
            stats,
            MatchStatistics {
                rounds_played: 4,
                player1_wins: 1,
                player2_wins: 1,
                timeouts: 1,
                ties: 1,
                fastest_win: Some((PlayerId::One, 2.25)),
            }
        );
        assert_eq!(stats.get_fastest_win_formatted(), "Player 1 in 2.25s");
        assert_eq!(MatchStatistics::default().get_fastest_win_formatted(), "No round was won");
    }
}
