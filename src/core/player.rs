use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    /// Evaluation order. Player 1 is always checked first.
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub const fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    pub const fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// How a single round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won(PlayerId),
    /// Countdown expired before anybody completed the combination.
    TimedOut,
    /// Both players completed the combination on the same frame and the match
    /// is configured to treat that as a draw.
    Tied,
}

impl RoundOutcome {
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            RoundOutcome::Won(player) => Some(player),
            RoundOutcome::TimedOut | RoundOutcome::Tied => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Won(PlayerId),
    Tie,
}

impl MatchOutcome {
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            MatchOutcome::Won(player) => Some(player),
            MatchOutcome::Tie => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub player1: u32,
    pub player2: u32,
}

impl Scores {
    pub fn get(&self, player: PlayerId) -> u32 {
        match player {
            PlayerId::One => self.player1,
            PlayerId::Two => self.player2,
        }
    }

    pub fn award(&mut self, player: PlayerId) {
        match player {
            PlayerId::One => self.player1 += 1,
            PlayerId::Two => self.player2 += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.player1 + self.player2
    }

    /// Strictly higher score wins; equal scores are a tie.
    pub fn leader(&self) -> MatchOutcome {
        if self.player1 > self.player2 {
            MatchOutcome::Won(PlayerId::One)
        } else if self.player2 > self.player1 {
            MatchOutcome::Won(PlayerId::Two)
        } else {
            MatchOutcome::Tie
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.player1, self.player2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_display() {
        assert_eq!(PlayerId::One.to_string(), "Player 1");
        assert_eq!(PlayerId::Two.to_string(), "Player 2");
        assert_eq!(PlayerId::One.opponent(), PlayerId::Two);
    }

    #[test]
    fn test_scores_award_and_leader() {
        let mut scores = Scores::default();
        assert_eq!(scores.leader(), MatchOutcome::Tie);

        scores.award(PlayerId::Two);
        assert_eq!(scores.get(PlayerId::Two), 1);
        assert_eq!(scores.leader(), MatchOutcome::Won(PlayerId::Two));

        scores.award(PlayerId::One);
        scores.award(PlayerId::One);
        assert_eq!(scores.total(), 3);
        assert_eq!(scores.leader(), MatchOutcome::Won(PlayerId::One));
        assert_eq!(scores.to_string(), "2 - 1");

        scores.reset();
        assert_eq!(scores, Scores::default());
    }

    #[test]
    fn test_outcome_winner() {
        assert_eq!(RoundOutcome::Won(PlayerId::Two).winner(), Some(PlayerId::Two));
        assert_eq!(RoundOutcome::TimedOut.winner(), None);
        assert_eq!(RoundOutcome::Tied.winner(), None);
        assert_eq!(MatchOutcome::Tie.winner(), None);
    }
}
