use console::Term;
use std::io::{self, Write};
use tracing::warn;
use crate::core::{
    GameEvent, GameEventHandler, MatchOutcome, MatchStatistics, Phase, PlayerId, RoundOutcome,
    RoundResolution, Scores,
};
use crate::rounds::{Combination, House, MatchDefinition};
use crate::ui::ThemeManager;

/// Countdown values below this are drawn in the warning style.
const LOW_COUNTDOWN_SECONDS: u32 = 3;

/// What the board needs to know about the loaded match.
#[derive(Debug, Clone)]
pub struct BoardLayout {
    pub title: String,
    pub number_of_rounds: usize,
    pub house_count: usize,
    pub player1_keys: Vec<String>,
    pub player2_keys: Vec<String>,
}

impl BoardLayout {
    pub fn from_definition(definition: &MatchDefinition) -> Self {
        Self {
            title: definition.title.clone(),
            number_of_rounds: definition.number_of_rounds,
            house_count: definition.house_count,
            player1_keys: definition.player1_input_map.clone(),
            player2_keys: definition.player2_input_map.clone(),
        }
    }

    /// One label per house: `[1 q|u]`, lit when part of the combination.
    pub fn cells(&self, highlighted: Option<&Combination>) -> Vec<(String, bool)> {
        (0..self.house_count)
            .map(|index| {
                let house = House(index);
                let player1 = self.player1_keys.get(index).map(String::as_str).unwrap_or("?");
                let player2 = self.player2_keys.get(index).map(String::as_str).unwrap_or("?");
                let lit = highlighted.map(|c| c.contains(house)).unwrap_or(false);
                (format!("[{} {}|{}]", house, player1, player2), lit)
            })
            .collect()
    }
}

pub struct Display {
    term: Term,
    theme_manager: ThemeManager,
    text_width: usize,
    player_names: [String; 2],
    board: Option<BoardLayout>,
    scores: Scores,
    last_countdown: Option<u32>,
}

impl Display {
    pub fn new(theme_manager: ThemeManager, text_width: usize) -> io::Result<Self> {
        Ok(Self {
            term: Term::stdout(),
            theme_manager,
            text_width,
            player_names: [PlayerId::One.to_string(), PlayerId::Two.to_string()],
            board: None,
            scores: Scores::default(),
            last_countdown: None,
        })
    }

    pub fn set_player_names<S: Into<String>>(&mut self, player1: S, player2: S) {
        self.player_names = [player1.into(), player2.into()];
    }

    pub fn set_board(&mut self, board: BoardLayout) {
        self.board = Some(board);
        self.scores = Scores::default();
        self.last_countdown = None;
    }

    pub fn player_name(&self, player: PlayerId) -> &str {
        match player {
            PlayerId::One => &self.player_names[0],
            PlayerId::Two => &self.player_names[1],
        }
    }

    pub fn round_message(&self, outcome: RoundOutcome) -> String {
        match outcome {
            RoundOutcome::Won(player) => format!("{} won the round!", self.player_name(player)),
            RoundOutcome::TimedOut | RoundOutcome::Tied => "It's a tie! :(".to_string(),
        }
    }

    pub fn match_message(&self, outcome: MatchOutcome) -> String {
        match outcome {
            MatchOutcome::Won(player) => format!("{} Won!", self.player_name(player)),
            MatchOutcome::Tie => "It's a tie! :(".to_string(),
        }
    }

    pub fn score_line(&self, scores: Scores) -> String {
        format!(
            "{} {}  -  {} {}",
            self.player_names[0], scores.player1, scores.player2, self.player_names[1]
        )
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        self.term.clear_screen()
    }

    pub fn show_title(&self, title: &str) -> io::Result<()> {
        let styled_title = self.theme_manager.apply_style(title, "title");
        self.term.write_line(&styled_title)?;
        self.show_separator()?;
        self.term.write_line("")?;
        Ok(())
    }

    pub fn show_start_panel(&self) -> io::Result<()> {
        self.clear_screen()?;
        let title = self.board
            .as_ref()
            .map(|board| board.title.as_str())
            .unwrap_or("Combo Rush");
        self.show_title(&format!("🏠 {}", title))?;

        let p1 = self.theme_manager.apply_style(&self.player_names[0], "player1");
        let p2 = self.theme_manager.apply_style(&self.player_names[1], "player2");
        self.term.write_line(&format!("{} vs {}", p1, p2))?;
        self.term.write_line("")?;
        self.show_message("Hold every lit house before the timer runs out.", "info")?;
        self.show_message("Press Space to begin, Esc to leave.", "info")?;
        Ok(())
    }

    pub fn show_round_header(&self, round_index: usize) -> io::Result<()> {
        let total = self.board.as_ref().map(|board| board.number_of_rounds).unwrap_or(0);
        self.show_title(&format!("Round {} of {}", round_index + 1, total))?;
        self.show_message(&self.score_line(self.scores), "info")?;
        self.term.write_line("")?;
        Ok(())
    }

    pub fn show_board(&self, highlighted: Option<&Combination>) -> io::Result<()> {
        let Some(board) = self.board.as_ref() else {
            return Ok(());
        };

        let cells = board
            .cells(highlighted)
            .into_iter()
            .map(|(label, lit)| {
                let style = if lit { "house_lit" } else { "house_idle" };
                self.theme_manager.apply_style(&label, style)
            })
            .collect::<Vec<_>>()
            .join(" ");

        self.term.write_line(&cells)?;
        self.term.write_line("")?;
        Ok(())
    }

    pub fn show_countdown(&mut self, remaining_seconds: f32) -> io::Result<()> {
        let whole_seconds = remaining_seconds.max(0.0) as u32;
        if self.last_countdown == Some(whole_seconds) {
            return Ok(());
        }
        self.last_countdown = Some(whole_seconds);

        let style = if whole_seconds < LOW_COUNTDOWN_SECONDS { "countdown_low" } else { "countdown" };
        let text = self.theme_manager.apply_style(&format!("⏱  {}", whole_seconds), style);

        self.term.clear_line()?;
        self.term.write_str(&text)?;
        self.term.flush()
    }

    pub fn show_round_resolution(&self, resolution: &RoundResolution) -> io::Result<()> {
        self.term.write_line("")?;
        self.term.write_line("")?;

        let style = match resolution.outcome {
            RoundOutcome::Won(PlayerId::One) => "player1",
            RoundOutcome::Won(PlayerId::Two) => "player2",
            RoundOutcome::TimedOut | RoundOutcome::Tied => "warning",
        };
        self.show_message(&self.round_message(resolution.outcome), style)?;
        self.show_message(&self.score_line(resolution.scores), "info")?;

        if !resolution.is_last_round {
            self.term.write_line("")?;
            self.show_message("Press Space for the next round.", "info")?;
        }
        Ok(())
    }

    pub fn show_game_over(&self, outcome: MatchOutcome, scores: Scores) -> io::Result<()> {
        self.term.write_line("")?;
        self.show_separator()?;

        let style = match outcome {
            MatchOutcome::Won(PlayerId::One) => "player1",
            MatchOutcome::Won(PlayerId::Two) => "player2",
            MatchOutcome::Tie => "warning",
        };
        self.show_message(&format!("🏆 {}", self.match_message(outcome)), style)?;
        self.show_message(&format!("Final score: {}", self.score_line(scores)), "info")?;
        self.show_separator()?;
        Ok(())
    }

    pub fn show_statistics(&self, stats: &MatchStatistics) -> io::Result<()> {
        self.show_message("📊 Match Statistics", "title")?;
        self.show_message(&format!("Rounds played: {}", stats.rounds_played), "info")?;
        self.show_message(
            &format!("{} rounds won: {}", self.player_names[0], stats.player1_wins),
            "player1",
        )?;
        self.show_message(
            &format!("{} rounds won: {}", self.player_names[1], stats.player2_wins),
            "player2",
        )?;
        self.show_message(&format!("Timeouts: {}  Draws: {}", stats.timeouts, stats.ties), "info")?;

        let fastest = match stats.fastest_win {
            Some((player, seconds)) => format!("{} in {:.2}s", self.player_name(player), seconds),
            None => stats.get_fastest_win_formatted(),
        };
        self.show_message(&format!("Fastest round: {}", fastest), "info")?;
        self.show_separator()?;
        self.show_message("Press Space to return to the start screen, Esc to leave.", "info")?;
        Ok(())
    }

    pub fn show_message(&self, message: &str, style: &str) -> io::Result<()> {
        let styled_message = self.theme_manager.apply_style(message, style);
        self.term.write_line(&styled_message)
    }

    pub fn show_error(&self, error: &str) -> io::Result<()> {
        self.show_message(&format!("❌ {}", error), "error")
    }

    pub fn show_success(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("✅ {}", message), "success")
    }

    pub fn show_warning(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("⚠️ {}", message), "warning")
    }

    pub fn show_separator(&self) -> io::Result<()> {
        let separator = "━".repeat(self.text_width);
        let styled = self.theme_manager.apply_style(&separator, "separator");
        self.term.write_line(&styled)
    }

    pub fn wait_for_enter(&self) -> io::Result<()> {
        let styled_prompt = self.theme_manager.apply_style("Press Enter to continue...", "info");
        print!("{}", styled_prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(())
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        self.theme_manager.set_theme(theme_name)
    }

    pub fn get_available_themes(&self) -> Vec<String> {
        self.theme_manager.list_themes()
    }

    fn render_event(&mut self, event: &GameEvent) -> io::Result<()> {
        match event {
            GameEvent::PhaseChanged { to: Phase::Start, .. } => self.show_start_panel(),
            GameEvent::PhaseChanged { .. } => Ok(()),
            GameEvent::MatchStarted { .. } => {
                self.scores = Scores::default();
                Ok(())
            }
            GameEvent::CombinationSelected { round_index, combination, description } => {
                self.last_countdown = None;
                self.clear_screen()?;
                self.show_round_header(*round_index)?;
                self.show_board(Some(combination))?;
                self.show_message(description, "combination")?;
                self.term.write_line("")
            }
            GameEvent::CountdownUpdated { remaining_seconds } => self.show_countdown(*remaining_seconds),
            GameEvent::RoundResolved(resolution) => {
                self.scores = resolution.scores;
                self.show_round_resolution(resolution)
            }
            GameEvent::MatchEnded { outcome, scores } => self.show_game_over(*outcome, *scores),
        }
    }
}

impl GameEventHandler for Display {
    fn handle_event(&mut self, event: &GameEvent) {
        if let Err(e) = self.render_event(event) {
            warn!("Failed to render {:?}: {}", event.kind(), e);
        }
    }
}
