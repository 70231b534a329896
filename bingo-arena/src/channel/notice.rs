//! Text notices exchanged over channels
//!
//! Wire format is plain text, matched by case-sensitive substring:
//! `start`, `<name> won`, `aborted`, `player joined: <name>`.

use crate::types::PlayerName;

const JOINED_MARKER: &str = "player joined: ";
const WON_MARKER: &str = "won";
const ABORTED_MARKER: &str = "aborted";
const START_MARKER: &str = "start";

/// One message of the round protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Quorum reached, sent on the rendezvous channel
    Start,
    /// A player was added to the round
    PlayerJoined(PlayerName),
    /// The round was won
    Won {
        /// Winner, if the notice names one
        winner: Option<PlayerName>,
    },
    /// The round was aborted
    Aborted,
}

impl Notice {
    /// Classify a received text
    ///
    /// The join marker is checked first, then a trailing " won", so that a
    /// player called "wonko" or "aborted_ann" is never taken for another
    /// notice. Returns None for text carrying no known marker.
    pub fn parse(text: &str) -> Option<Notice> {
        let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');

        if let Some(idx) = text.find(JOINED_MARKER) {
            let name = text[idx + JOINED_MARKER.len()..].trim();
            return PlayerName::new(name).ok().map(Notice::PlayerJoined);
        }

        // A win notice is "<name> won"; the winner's name may itself contain
        // "aborted" or "start"
        if let Some(winner) = text.strip_suffix(WON_MARKER) {
            if winner.is_empty() || winner.ends_with(' ') {
                let winner = PlayerName::new(winner.trim()).ok();
                return Some(Notice::Won { winner });
            }
        }

        if text.contains(ABORTED_MARKER) {
            return Some(Notice::Aborted);
        }

        if let Some(idx) = text.rfind(WON_MARKER) {
            let winner = PlayerName::new(text[..idx].trim()).ok();
            return Some(Notice::Won { winner });
        }

        if text.contains(START_MARKER) {
            return Some(Notice::Start);
        }

        None
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Start => write!(f, "{}", START_MARKER),
            Notice::PlayerJoined(name) => write!(f, "{}{}", JOINED_MARKER, name),
            Notice::Won { winner: Some(name) } => write!(f, "{} {}", name, WON_MARKER),
            Notice::Won { winner: None } => write!(f, "{}", WON_MARKER),
            Notice::Aborted => write!(f, "{}", ABORTED_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PlayerName {
        PlayerName::new(s).unwrap()
    }

    #[test]
    fn test_wire_text() {
        assert_eq!(Notice::Start.to_string(), "start");
        assert_eq!(Notice::Aborted.to_string(), "aborted");
        assert_eq!(
            Notice::Won { winner: Some(name("bob")) }.to_string(),
            "bob won"
        );
        assert_eq!(
            Notice::PlayerJoined(name("cid")).to_string(),
            "player joined: cid"
        );
    }

    #[test]
    fn test_parse_known_notices() {
        assert_eq!(Notice::parse("start"), Some(Notice::Start));
        assert_eq!(Notice::parse("aborted\n"), Some(Notice::Aborted));
        assert_eq!(
            Notice::parse("bob won"),
            Some(Notice::Won { winner: Some(name("bob")) })
        );
        assert_eq!(Notice::parse("won"), Some(Notice::Won { winner: None }));
        assert_eq!(
            Notice::parse("player joined: cid"),
            Some(Notice::PlayerJoined(name("cid")))
        );
    }

    #[test]
    fn test_parse_is_substring_based() {
        assert_eq!(Notice::parse("Game aborted"), Some(Notice::Aborted));
        assert_eq!(
            Notice::parse("\0\0player joined: cid\0"),
            Some(Notice::PlayerJoined(name("cid")))
        );
        assert_eq!(Notice::parse("hello"), None);
        assert_eq!(Notice::parse("player joined: "), None);
    }

    #[test]
    fn test_names_containing_markers() {
        assert_eq!(
            Notice::parse("player joined: wonko"),
            Some(Notice::PlayerJoined(name("wonko")))
        );
        assert_eq!(
            Notice::parse("wonko won"),
            Some(Notice::Won { winner: Some(name("wonko")) })
        );
        assert_eq!(
            Notice::parse("player joined: startrek"),
            Some(Notice::PlayerJoined(name("startrek")))
        );
    }

    #[test]
    fn test_win_of_player_named_like_abort() {
        let notice = Notice::Won {
            winner: Some(name("aborted_ann")),
        };
        assert_eq!(Notice::parse(&notice.to_string()), Some(notice));
        assert_eq!(
            Notice::parse("startaborted won\n"),
            Some(Notice::Won { winner: Some(name("startaborted")) })
        );
        assert_eq!(
            Notice::parse("player joined: aborted_ann"),
            Some(Notice::PlayerJoined(name("aborted_ann")))
        );
        assert_eq!(Notice::parse("aborted"), Some(Notice::Aborted));
    }
}
