//! Round record and its line-oriented text format
//!
//! ```text
//! Max: 4
//! Height: 5
//! Width: 5
//! Wordfile: words.txt
//! player:ann
//! player:bob
//! finished
//! Game aborted
//! ```

use crate::config::RoundConfig;
use crate::error::{BingoError, Result};
use crate::types::PlayerName;

pub(crate) const PLAYER_PREFIX: &str = "player:";
pub(crate) const FINISHED_LINE: &str = "finished";
pub(crate) const ABORTED_LINE: &str = "Game aborted";

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// A player completed a line
    Won,
    /// A player left before anyone won
    Aborted,
}

/// Persisted state of one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    /// Parameters fixed at creation
    pub config: RoundConfig,

    /// Roster in join order
    pub players: Vec<PlayerName>,

    /// Set once when the round ends, never cleared
    pub finished: bool,

    /// The round ended by abort rather than by a win
    pub aborted: bool,
}

impl RoundRecord {
    /// Fresh record with an empty roster
    pub fn new(config: RoundConfig) -> Self {
        Self {
            config,
            players: Vec::new(),
            finished: false,
            aborted: false,
        }
    }

    /// Whether the roster reached capacity
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.config.max_players
    }

    /// Whether a player with this name is on the roster
    pub fn contains(&self, player: &PlayerName) -> bool {
        self.players.contains(player)
    }

    /// Reject a join that would end a finished round, exceed capacity or
    /// duplicate a name
    pub fn check_join(&self, player: &PlayerName) -> Result<()> {
        if self.finished {
            return Err(BingoError::Finished);
        }
        if self.is_full() {
            return Err(BingoError::Full {
                max_players: self.config.max_players,
            });
        }
        if self.contains(player) {
            return Err(BingoError::NameTaken(player.to_string()));
        }
        Ok(())
    }

    /// Text appended to the file when a player joins
    pub(crate) fn player_line(player: &PlayerName) -> String {
        format!("{}{}\n", PLAYER_PREFIX, player)
    }

    /// Text appended to the file when the round ends
    pub(crate) fn finish_lines(reason: FinishReason) -> String {
        match reason {
            FinishReason::Won => format!("{}\n", FINISHED_LINE),
            FinishReason::Aborted => format!("{}\n{}\n", FINISHED_LINE, ABORTED_LINE),
        }
    }

    /// Parse the text format
    pub fn parse(text: &str) -> Result<Self> {
        let mut max_players = None;
        let mut height = None;
        let mut width = None;
        let mut word_source = None;
        let mut players = Vec::new();
        let mut finished = false;
        let mut aborted = false;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix(PLAYER_PREFIX) {
                let player = PlayerName::new(name.trim()).map_err(|e| {
                    BingoError::InvalidRoundFile(format!("line {}: {}", number + 1, e))
                })?;
                players.push(player);
                continue;
            }

            if line == FINISHED_LINE {
                finished = true;
                continue;
            }
            if line == ABORTED_LINE {
                aborted = true;
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(BingoError::InvalidRoundFile(format!(
                    "line {}: unexpected '{}'",
                    number + 1,
                    line
                )));
            };
            let value = value.trim();
            match key.trim() {
                "Max" => max_players = Some(parse_number(value, "Max", number)?),
                "Height" => height = Some(parse_number(value, "Height", number)?),
                "Width" => width = Some(parse_number(value, "Width", number)?),
                "Wordfile" => word_source = Some(value.to_string()),
                other => {
                    return Err(BingoError::InvalidRoundFile(format!(
                        "line {}: unknown field '{}'",
                        number + 1,
                        other
                    )))
                }
            }
        }

        let missing = |field: &str| BingoError::InvalidRoundFile(format!("missing '{}' field", field));
        let config = RoundConfig {
            max_players: max_players.ok_or_else(|| missing("Max"))?,
            board_height: height.ok_or_else(|| missing("Height"))?,
            board_width: width.ok_or_else(|| missing("Width"))?,
            word_source: word_source.ok_or_else(|| missing("Wordfile"))?,
        };
        config
            .validate()
            .map_err(|e| BingoError::InvalidRoundFile(e.to_string()))?;

        Ok(Self {
            config,
            players,
            finished,
            aborted: finished && aborted,
        })
    }
}

fn parse_number(value: &str, field: &str, number: usize) -> Result<usize> {
    value.parse().map_err(|_| {
        BingoError::InvalidRoundFile(format!(
            "line {}: '{}' is not a valid {} value",
            number + 1,
            value,
            field
        ))
    })
}

impl std::fmt::Display for RoundRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Max: {}", self.config.max_players)?;
        writeln!(f, "Height: {}", self.config.board_height)?;
        writeln!(f, "Width: {}", self.config.board_width)?;
        writeln!(f, "Wordfile: {}", self.config.word_source)?;
        for player in &self.players {
            write!(f, "{}", Self::player_line(player))?;
        }
        if self.finished {
            let reason = if self.aborted {
                FinishReason::Aborted
            } else {
                FinishReason::Won
            };
            write!(f, "{}", Self::finish_lines(reason))?;
        }
        Ok(())
    }
}
