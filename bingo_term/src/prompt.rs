//! Asking again after a refused create or join

use bingo_arena::BingoError;
use console::Term;

/// Input to ask for after a refusal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    /// Another player name
    PlayerName,
    /// Another round file
    RoundFile,
}

impl Retry {
    /// What to ask for after `err`, or None when the error is final
    pub fn for_error(err: &BingoError) -> Option<Self> {
        match err {
            BingoError::NameTaken(_) | BingoError::InvalidPlayerName(_) => Some(Retry::PlayerName),
            BingoError::AlreadyExists(_) => Some(Retry::RoundFile),
            e if e.is_access_denied() => Some(Retry::RoundFile),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Retry::PlayerName => "Player name (empty for a random one): ",
            Retry::RoundFile => "Round file (empty to give up): ",
        }
    }

    /// Print the label and read one trimmed line; None for an empty answer
    pub fn ask(&self, term: &Term) -> std::io::Result<Option<String>> {
        term.write_str(self.label())?;
        let line = term.read_line()?;
        let line = line.trim();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_name_refusals_ask_for_a_name() {
        assert_eq!(
            Retry::for_error(&BingoError::NameTaken("ann".to_string())),
            Some(Retry::PlayerName)
        );
        assert_eq!(
            Retry::for_error(&BingoError::InvalidPlayerName("a b".to_string())),
            Some(Retry::PlayerName)
        );
    }

    #[test]
    fn test_round_refusals_ask_for_a_round_file() {
        for err in [
            BingoError::NotFound(PathBuf::from("friday.round")),
            BingoError::Full { max_players: 2 },
            BingoError::Finished,
            BingoError::AlreadyExists(PathBuf::from("friday.round")),
        ] {
            assert_eq!(Retry::for_error(&err), Some(Retry::RoundFile), "{}", err);
        }
    }

    #[test]
    fn test_other_errors_are_final() {
        assert_eq!(Retry::for_error(&BingoError::Busy("mq_ann".to_string())), None);
        assert_eq!(
            Retry::for_error(&BingoError::InvalidRoundFile("line 1".to_string())),
            None
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Retry::for_error(&BingoError::Io(io)), None);
    }
}
