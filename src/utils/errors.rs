use thiserror::Error;
use crate::core::Phase;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid match definition: {message}")]
    InvalidMatch { message: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("Cannot {operation} while in {phase} phase")]
    InvalidPhase { operation: &'static str, phase: Phase },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Interface error: {message}")]
    Interface { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl GameError {
    pub fn invalid_match<S: Into<String>>(message: S) -> Self {
        Self::InvalidMatch {
            message: message.into(),
        }
    }

    pub fn match_not_found<S: Into<String>>(match_id: S) -> Self {
        Self::MatchNotFound {
            match_id: match_id.into(),
        }
    }

    pub fn invalid_phase(operation: &'static str, phase: Phase) -> Self {
        Self::InvalidPhase { operation, phase }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn interface<S: Into<String>>(message: S) -> Self {
        Self::Interface {
            message: message.into(),
        }
    }

    /// Misuse of the engine's control signals. The engine state is untouched
    /// when this is returned, so callers may log it and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidPhase { .. })
    }
}
