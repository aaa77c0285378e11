use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::utils::{GameError, GameResult};

/// Prefix for environment overrides, e.g. `COMBO_RUSH__GAME__SEED=42`.
pub const ENV_PREFIX: &str = "COMBO_RUSH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub players: PlayersConfig,
    pub ui: UiConfig,
    pub paths: PathConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub default_match: String,
    /// Fixed seed for combination selection. Random when absent.
    pub seed: Option<u64>,
    pub frame_rate: u32,
    pub hold_window_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayersConfig {
    pub player1_name: String,
    pub player2_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: String,
    pub text_width: usize,
    pub show_statistics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub matches_dir: PathBuf,
    pub logs_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Write each finished match's event log as JSON into `paths.logs_dir`.
    pub export_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameConfig {
                default_match: "classic".to_string(),
                seed: None,
                frame_rate: 60,
                hold_window_ms: 550,
            },
            players: PlayersConfig {
                player1_name: "Player 1".to_string(),
                player2_name: "Player 2".to_string(),
            },
            ui: UiConfig {
                theme: "default".to_string(),
                text_width: 60,
                show_statistics: true,
            },
            paths: PathConfig {
                matches_dir: PathBuf::from("./assets/matches"),
                logs_dir: PathBuf::from("./assets/logs"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                export_events: false,
            },
        }
    }
}

impl Config {
    /// Loads the TOML file layered with `COMBO_RUSH__SECTION__KEY` environment
    /// overrides. A missing file is created with the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to_file(path)?;
        }

        let config = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(env_overrides())
            .build()?
            .try_deserialize::<Config>()?;

        Ok(config)
    }

    /// The defaults with `COMBO_RUSH__SECTION__KEY` overrides, for runs
    /// without a config file.
    pub fn from_env() -> GameResult<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(env_overrides())
            .build()?
            .try_deserialize::<Config>()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> GameResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GameResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GameError::configuration(format!("Failed to create config directory: {}", e)))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .map_err(|e| GameError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_content)
            .map_err(|e| GameError::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn get_matches_dir(&self) -> &Path {
        &self.paths.matches_dir
    }

    pub fn get_logs_dir(&self) -> &Path {
        &self.paths.logs_dir
    }

    pub fn ensure_directories(&self) -> GameResult<()> {
        let dirs = [&self.paths.matches_dir, &self.paths.logs_dir];

        for dir in &dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| GameError::configuration(format!("Failed to create directory {:?}: {}", dir, e)))?;
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> GameResult<()> {
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(GameError::configuration("Invalid logging level")),
        }

        if self.paths.matches_dir.as_os_str().is_empty() {
            return Err(GameError::configuration("Matches directory path cannot be empty"));
        }
        if self.game.default_match.trim().is_empty() {
            return Err(GameError::configuration("Default match id cannot be empty"));
        }

        if !(1..=240).contains(&self.game.frame_rate) {
            return Err(GameError::configuration("Frame rate must be between 1 and 240"));
        }
        if self.game.hold_window_ms == 0 {
            return Err(GameError::configuration("Hold window must be greater than 0"));
        }
        if self.ui.text_width < 40 {
            return Err(GameError::configuration("Text width must be at least 40"));
        }
        if self.players.player1_name.trim().is_empty() || self.players.player2_name.trim().is_empty() {
            return Err(GameError::configuration("Player names cannot be empty"));
        }

        Ok(())
    }

    pub fn merge_with_cli(&mut self, cli_config: CliConfig) {
        if let Some(matches_dir) = cli_config.matches_dir {
            self.paths.matches_dir = matches_dir;
        }
        if let Some(match_id) = cli_config.match_id {
            self.game.default_match = match_id;
        }
        if let Some(seed) = cli_config.seed {
            self.game.seed = Some(seed);
        }
        if let Some(log_level) = cli_config.log_level {
            self.logging.level = log_level;
        }
        if cli_config.debug {
            self.logging.level = "debug".to_string();
        }
        if let Some(theme) = cli_config.theme {
            self.ui.theme = theme;
        }
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.game.frame_rate.max(1)))
    }

    pub fn hold_window(&self) -> Duration {
        Duration::from_millis(self.game.hold_window_ms)
    }
}

fn env_overrides() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

// Configuration that can be overridden by CLI arguments
#[derive(Debug, Default)]
pub struct CliConfig {
    pub matches_dir: Option<PathBuf>,
    pub match_id: Option<String>,
    pub seed: Option<u64>,
    pub log_level: Option<String>,
    pub debug: bool,
    pub theme: Option<String>,
}
