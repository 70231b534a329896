/// Error types for the bingo-arena library
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for arena operations
pub type Result<T> = std::result::Result<T, BingoError>;

/// Errors that can occur while creating, joining or playing a round
#[derive(Debug, Error)]
pub enum BingoError {
    /// A round file already exists at the requested path
    #[error("Round already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// No round file at the requested path
    #[error("Round not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The round has already ended
    #[error("Round already finished")]
    Finished,

    /// The round roster reached its capacity
    #[error("Round is full ({max_players} players)")]
    Full {
        /// Capacity fixed at creation
        max_players: usize,
    },

    /// Another player already uses this name in the round
    #[error("Player name already taken: {0}")]
    NameTaken(String),

    /// Channel queue is saturated
    #[error("Channel busy: {0}")]
    Busy(String),

    /// No message arrived within the wait window
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid player name provided
    #[error("Invalid player name: {0}")]
    InvalidPlayerName(String),

    /// Invalid round or arena configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Round file content could not be parsed
    #[error("Invalid round file: {0}")]
    InvalidRoundFile(String),

    /// Invalid lifecycle transition attempted
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition {
        /// Current phase
        from: String,
        /// Attempted target phase
        to: String,
    },

    /// A win or abort was already recorded for this round
    #[error("Round outcome already reported")]
    AlreadyReported,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BingoError {
    /// True for the expected "nothing arrived yet" outcome of a receive
    pub fn is_timeout(&self) -> bool {
        matches!(self, BingoError::Timeout(_))
    }

    /// True for access-control rejections a front-end may answer by asking for
    /// different input (another name, another round file)
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            BingoError::NotFound(_)
                | BingoError::Finished
                | BingoError::Full { .. }
                | BingoError::NameTaken(_)
        )
    }
}
