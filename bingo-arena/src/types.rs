/// Core types for the bingo-arena library
use crate::error::{BingoError, Result};
use crate::name_generator::NameGenerator;

/// Longest accepted player name, in characters
const MAX_PLAYER_NAME_LEN: usize = 64;

/// Player identity within one round
///
/// PlayerName doubles as the suffix of the player's channel name and as a
/// line of the round file, so it must be:
/// - Non-empty, at most 64 characters
/// - Free of whitespace and control characters
/// - Free of path separators: / \
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerName(String);

impl PlayerName {
    /// Validate and wrap a player name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(PlayerName(name))
    }

    /// Generate a pronounceable random name with a seat number
    pub fn generate() -> Self {
        Self::generate_avoiding(&[])
    }

    /// Generate a name that is not on `taken`
    pub fn generate_avoiding(taken: &[PlayerName]) -> Self {
        NameGenerator::new().player_name(taken)
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(BingoError::InvalidPlayerName(
                "Player name cannot be empty".to_string(),
            ));
        }

        if s.chars().count() > MAX_PLAYER_NAME_LEN {
            return Err(BingoError::InvalidPlayerName(format!(
                "Player name '{}' is longer than {} characters",
                s, MAX_PLAYER_NAME_LEN
            )));
        }

        for ch in s.chars() {
            if ch.is_whitespace() || ch.is_control() || matches!(ch, '/' | '\\') {
                return Err(BingoError::InvalidPlayerName(format!(
                    "Player name '{}' contains invalid character {:?}",
                    s, ch
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for PlayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PlayerName {
    type Error = BingoError;

    fn try_from(name: String) -> Result<Self> {
        PlayerName::new(name)
    }
}

impl TryFrom<&str> for PlayerName {
    type Error = BingoError;

    fn try_from(name: &str) -> Result<Self> {
        PlayerName::new(name)
    }
}

/// Lifecycle phase of a round as seen by one process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Creator is persisting the round record
    Creating,
    /// Creator waits on the rendezvous channel for a second player
    WaitingForQuorum,
    /// Joiner is validating access and announcing itself
    JoiningAttempt,
    /// Game in progress
    Active,
    /// Round won or aborted (terminal)
    Finished,
}

impl RoundPhase {
    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(self, next: RoundPhase) -> bool {
        use RoundPhase::*;
        matches!(
            (self, next),
            (Creating, WaitingForQuorum)
                | (WaitingForQuorum, Active)
                | (JoiningAttempt, Active)
                | (Active, Finished)
        )
    }

    /// Return `next` if the transition is legal
    pub fn transition(self, next: RoundPhase) -> Result<RoundPhase> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BingoError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundPhase::Creating => write!(f, "Creating"),
            RoundPhase::WaitingForQuorum => write!(f, "Waiting for players"),
            RoundPhase::JoiningAttempt => write!(f, "Joining"),
            RoundPhase::Active => write!(f, "Active"),
            RoundPhase::Finished => write!(f, "Finished"),
        }
    }
}

/// Game progress observed by the background listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// A new player appeared in the local roster
    PlayerJoined(PlayerName),
    /// Someone won the round
    Won {
        /// Winner, when the notice named one
        winner: Option<PlayerName>,
    },
    /// The round was aborted
    Aborted,
}

impl std::fmt::Display for RoundEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundEvent::PlayerJoined(name) => write!(f, "{} joined the round", name),
            RoundEvent::Won { winner: Some(name) } => write!(f, "{} won!", name),
            RoundEvent::Won { winner: None } => write!(f, "The round was won"),
            RoundEvent::Aborted => write!(f, "The round was aborted"),
        }
    }
}
