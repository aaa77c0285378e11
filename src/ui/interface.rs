use console::{Key, Term};
use dialoguer::Select;
use std::thread;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::config::Config;
use crate::core::{
    EventLogger, GameEvent, GameEventHandler, GameEventKind, Phase, PlayerId, RoundEngine,
    TracingEventHandler,
};
use crate::input::KeyLatch;
use crate::rounds::MatchLoader;
use crate::ui::{BoardLayout, Display, ThemeManager};
use crate::utils::{GameError, GameResult};
use tracing::{debug, info, warn, error};

/// Control input decoded from the terminal during a match.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MatchInput {
    Signal,
    Leave,
    Press(String),
}

fn decode_key(key: Key) -> Option<MatchInput> {
    match key {
        Key::Char(' ') => Some(MatchInput::Signal),
        Key::Escape => Some(MatchInput::Leave),
        Key::Char(c) if !c.is_control() => Some(MatchInput::Press(c.to_lowercase().collect())),
        _ => None,
    }
}

pub struct GameInterface {
    match_loader: MatchLoader,
    display: Display,
    event_log: EventLogger,
    tracer: TracingEventHandler,
    config: Config,
}

impl GameInterface {
    pub async fn new(config: Config) -> GameResult<Self> {
        info!("Initializing game interface");

        config.ensure_directories()?;

        let theme_manager = ThemeManager::new();
        let mut display = Display::new(theme_manager, config.ui.text_width)
            .map_err(|e| GameError::configuration(format!("Failed to create display: {}", e)))?;

        if !display.set_theme(&config.ui.theme) {
            warn!("Unknown theme '{}', using default", config.ui.theme);
        }
        display.set_player_names(
            config.players.player1_name.clone(),
            config.players.player2_name.clone(),
        );

        let match_loader = MatchLoader::new(config.get_matches_dir());
        match_loader.ensure_template().await?;

        Ok(Self {
            match_loader,
            display,
            event_log: EventLogger::default(),
            tracer: TracingEventHandler,
            config,
        })
    }

    pub async fn run(&mut self) -> GameResult<()> {
        info!("Starting game interface");

        loop {
            match self.show_main_menu().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("Main menu error: {}", e);
                    self.display.show_error(&format!("An error occurred: {}", e)).ok();
                    self.display.wait_for_enter().ok();
                }
            }
        }

        self.display.show_message("Thanks for playing!", "success").ok();
        Ok(())
    }

    /// Returns `false` once the players choose to exit.
    pub async fn show_main_menu(&mut self) -> GameResult<bool> {
        self.display.clear_screen().ok();
        self.display.show_title(&format!("🏠 Combo Rush v{}", crate::VERSION))?;
        self.display.show_message(
            &format!("Selected match: {}", self.config.game.default_match),
            "info",
        )?;

        let choices = vec![
            "🎮 Start Match",
            "📁 Choose Match",
            "🎨 Change Theme",
            "🚪 Exit",
        ];

        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()
            .map_err(|e| GameError::interface(format!("Menu selection error: {}", e)))?;

        match selection {
            0 => {
                let match_id = self.config.game.default_match.clone();
                self.start_match(&match_id).await?;
            }
            1 => self.choose_match_menu().await?,
            2 => self.change_theme()?,
            _ => return Ok(false),
        }

        Ok(true)
    }

    async fn choose_match_menu(&mut self) -> GameResult<()> {
        let matches = self.match_loader.list_available_matches().await?;

        if matches.is_empty() {
            self.display.show_warning("No matches found! Add match files to the matches directory.")?;
            self.display.wait_for_enter()?;
            return Ok(());
        }

        let mut match_choices: Vec<String> = matches
            .iter()
            .map(|metadata| metadata.display_name())
            .collect();
        match_choices.push("🔙 Back to Main Menu".to_string());

        let selection = Select::new()
            .with_prompt("Choose a match")
            .items(&match_choices)
            .interact()
            .map_err(|e| GameError::interface(format!("Match selection error: {}", e)))?;

        if let Some(selected) = matches.get(selection) {
            self.config.game.default_match = selected.id.clone();
            info!("Selected match: {}", selected.id);
        }

        Ok(())
    }

    fn change_theme(&mut self) -> GameResult<()> {
        let themes = self.display.get_available_themes();

        let selection = Select::new()
            .with_prompt("Choose theme")
            .items(&themes)
            .interact()
            .map_err(|e| GameError::interface(format!("Theme selection error: {}", e)))?;

        let theme = &themes[selection];
        self.display.set_theme(theme);
        self.config.ui.theme = theme.clone();
        Ok(())
    }

    pub async fn start_match(&mut self, match_id: &str) -> GameResult<()> {
        let definition = self.match_loader.load_match(match_id).await?;

        let engine = match self.config.game.seed {
            Some(seed) => {
                debug!("Using fixed seed {}", seed);
                RoundEngine::seeded(definition, seed)?
            }
            None => RoundEngine::new(definition)?,
        };

        self.display.set_board(BoardLayout::from_definition(engine.definition()));
        self.event_log.clear();
        self.display.show_start_panel()?;

        self.match_loop(engine).await?;

        if self.config.logging.export_events {
            self.export_event_log(match_id).await?;
        }
        Ok(())
    }

    /// Runs one engine until the players press Esc. Frames are paced by a
    /// tokio interval; keys come from a reader thread.
    async fn match_loop(&mut self, mut engine: RoundEngine) -> GameResult<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        // The reader stops on its own after forwarding Esc, which is also the
        // only way out of this loop, so it never competes with the menus.
        let reader = thread::spawn(move || {
            let term = Term::stdout();
            loop {
                match term.read_key() {
                    Ok(key) => {
                        let leaving = key == Key::Escape;
                        if tx.send(key).is_err() || leaving {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Keyboard reader stopped: {}", e);
                        break;
                    }
                }
            }
        });

        let mut latch = KeyLatch::new(self.config.hold_window());
        let mut frames = interval(self.config.frame_duration());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        'frames: loop {
            frames.tick().await;
            let now = Instant::now();
            let delta = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;

            let mut keys_closed = false;
            loop {
                match rx.try_recv() {
                    Ok(key) => match decode_key(key) {
                        Some(MatchInput::Leave) => break 'frames,
                        Some(MatchInput::Signal) => {
                            self.send_signal(&mut engine);
                            latch.clear();
                        }
                        Some(MatchInput::Press(input)) => latch.press(input, now.into_std()),
                        None => {}
                    },
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        keys_closed = true;
                        break;
                    }
                }
            }

            let events = engine.tick(delta);
            self.dispatch(&events, &engine);

            if engine.phase() == Phase::Playing {
                let std_now = now.into_std();
                latch.prune(std_now);
                let held = latch.held(std_now);
                let player1 = engine.input_map(PlayerId::One).active_houses(held.iter().copied());
                let player2 = engine.input_map(PlayerId::Two).active_houses(held.iter().copied());

                let events = engine.evaluate_inputs(&player1, &player2);
                self.dispatch(&events, &engine);
            }

            if keys_closed {
                warn!("Keyboard input closed, leaving match");
                break;
            }
        }

        drop(rx);
        if reader.join().is_err() {
            warn!("Keyboard reader thread panicked");
        }

        info!(
            "Left match after {} recorded events",
            self.event_log.get_event_count()
        );
        Ok(())
    }

    /// Space maps to `begin match` in Start and `acknowledge` elsewhere.
    fn send_signal(&mut self, engine: &mut RoundEngine) {
        let result = match engine.phase() {
            Phase::Start => engine.begin_match(),
            Phase::WaitingRound | Phase::GameOver => engine.acknowledge(),
            Phase::Playing => return,
        };

        match result {
            Ok(events) => self.dispatch(&events, engine),
            Err(e) if e.is_recoverable() => debug!("Ignored signal: {}", e),
            Err(e) => {
                error!("Engine error: {}", e);
                self.display.show_error(&e.to_string()).ok();
            }
        }
    }

    fn dispatch(&mut self, events: &[GameEvent], engine: &RoundEngine) {
        if events.is_empty() {
            return;
        }

        self.tracer.handle_events(events);
        self.event_log.handle_events(events);
        self.display.handle_events(events);

        let match_ended = events.iter().any(|event| event.kind() == GameEventKind::MatchEnded);
        if match_ended && self.config.ui.show_statistics {
            if let Err(e) = self.display.show_statistics(&engine.state().get_statistics()) {
                warn!("Failed to show statistics: {}", e);
            }
        }
    }

    async fn export_event_log(&self, match_id: &str) -> GameResult<()> {
        let file_name = format!(
            "{}-{}.json",
            match_id,
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        );
        let path = self.config.get_logs_dir().join(file_name);

        let json = self.event_log.export_events()?;
        tokio::fs::write(&path, json).await?;

        info!("Exported match events to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rounds::{Combination, HouseSet, MatchDefinition, Round};

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key(Key::Char(' ')), Some(MatchInput::Signal));
        assert_eq!(decode_key(Key::Escape), Some(MatchInput::Leave));
        assert_eq!(decode_key(Key::Char('Q')), Some(MatchInput::Press("q".to_string())));
        assert_eq!(decode_key(Key::Enter), None);
        assert_eq!(decode_key(Key::Char('\u{7}')), None);
    }

    #[test]
    fn test_shifted_keys_reach_a_valid_match() {
        let mut definition = MatchDefinition::new("caps", "Caps", 5.0, 2)
            .with_input_maps(["q", "w"], ["o", "p"]);
        definition.add_round(Round::single(Combination::new([0, 1])));
        let mut engine = RoundEngine::seeded(definition, 1).unwrap();
        engine.begin_match().unwrap();

        let pressed: Vec<String> = [Key::Char('Q'), Key::Char('W')]
            .into_iter()
            .filter_map(|key| match decode_key(key) {
                Some(MatchInput::Press(input)) => Some(input),
                _ => None,
            })
            .collect();
        let player1 = engine
            .input_map(PlayerId::One)
            .active_houses(pressed.iter().map(String::as_str));

        let events = engine.evaluate_inputs(&player1, &HouseSet::new());
        assert!(events.iter().any(|event| event.kind() == GameEventKind::RoundResolved));
        assert_eq!(engine.scores().player1, 1);
    }

    #[test]
    fn test_uppercase_bindings_are_rejected_at_load() {
        let mut definition = MatchDefinition::new("caps", "Caps", 5.0, 2)
            .with_input_maps(["Q", "W"], ["o", "p"]);
        definition.add_round(Round::single(Combination::new([0, 1])));

        let error = RoundEngine::seeded(definition, 1).err().unwrap();
        assert!(matches!(error, GameError::InvalidMatch { .. }));
    }
}
