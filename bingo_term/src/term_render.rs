use bingo_arena::{Board, GameSnapshot, PlayerName};
use console::Style;

use crate::card::Card;

/// How a cell is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLook {
    Open,
    Marked,
    Joker,
}

pub trait TermStyle {
    /// Draw `word`, already padded to the column width
    fn cell(&self, word: &str, look: CellLook, focused: bool) -> String;
    fn border(&self, text: &str) -> String;
    fn banner(&self, text: &str) -> String;
}

pub struct PlainTermStyle;

impl TermStyle for PlainTermStyle {
    fn cell(&self, word: &str, look: CellLook, focused: bool) -> String {
        let (open, close) = if focused { ('>', '<') } else { (' ', ' ') };
        let mark = match look {
            CellLook::Open => ' ',
            CellLook::Marked => 'x',
            CellLook::Joker => '*',
        };
        format!("{}{}{}{}", open, mark, word, close)
    }

    fn border(&self, text: &str) -> String {
        text.to_string()
    }

    fn banner(&self, text: &str) -> String {
        text.to_string()
    }
}

pub struct AnsiTermStyle;

impl TermStyle for AnsiTermStyle {
    fn cell(&self, word: &str, look: CellLook, focused: bool) -> String {
        let style = match look {
            CellLook::Open => Style::new(),
            CellLook::Marked => Style::new().green().bold(),
            CellLook::Joker => Style::new().yellow().bold(),
        };
        let style = if focused { style.reverse() } else { style };
        format!(" {} ", style.apply_to(word))
    }

    fn border(&self, text: &str) -> String {
        Style::new().dim().apply_to(text).to_string()
    }

    fn banner(&self, text: &str) -> String {
        Style::new().cyan().bold().apply_to(text).to_string()
    }
}

/// Everything one frame shows
pub struct Frame<'a> {
    pub card: &'a Card,
    pub board: &'a Board,
    pub cursor: (usize, usize),
    pub player: &'a PlayerName,
    pub snapshot: &'a GameSnapshot,
    pub banners: &'a [String],
}

impl Frame<'_> {
    pub fn render(&self, style: &impl TermStyle) -> Vec<String> {
        let width = self.card.cell_width();
        let rule = style.border(&format!(
            "+{}+",
            vec!["-".repeat(width + 2); self.card.width()].join("+")
        ));

        let mut lines = vec![rule.clone()];
        for row in 0..self.card.height() {
            let mut line = style.border("|");
            for col in 0..self.card.width() {
                let look = if self.board.joker() == Some((row, col)) {
                    CellLook::Joker
                } else if self.board.is_marked(row, col) {
                    CellLook::Marked
                } else {
                    CellLook::Open
                };
                let word = format!("{:<width$}", self.card.word(row, col), width = width);
                line.push_str(&style.cell(&word, look, self.cursor == (row, col)));
                line.push_str(&style.border("|"));
            }
            lines.push(line);
            lines.push(rule.clone());
        }

        lines.push(String::new());
        let players: Vec<String> = self
            .snapshot
            .roster
            .iter()
            .map(|p| {
                if p == self.player {
                    format!("{} (you)", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        lines.push(format!("Players: {}", players.join(", ")));

        for banner in self.banners {
            lines.push(style.banner(banner));
        }

        lines.push(String::new());
        lines.push(status_line(self.snapshot, self.player));
        lines
    }
}

pub fn status_line(snapshot: &GameSnapshot, player: &PlayerName) -> String {
    if snapshot.aborted {
        return "Game aborted".to_string();
    }
    if snapshot.won {
        return match &snapshot.winner {
            Some(winner) if winner == player => "BINGO! You won!".to_string(),
            Some(winner) => format!("{} won the round", winner),
            None => "The round was won".to_string(),
        };
    }
    "Arrows: move  Space/Enter: mark  q: abort".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn name(s: &str) -> PlayerName {
        PlayerName::new(s).unwrap()
    }

    #[test]
    fn test_plain_frame() {
        let words: Vec<String> = ["ab", "cd", "ef", "gh"].iter().map(|w| w.to_string()).collect();
        let card = Card::generate(&words, 2, 2, &mut StdRng::seed_from_u64(1)).unwrap();
        let mut board = card.board();
        board.mark(0, 1);

        let ann = name("ann");
        let snapshot = GameSnapshot {
            roster: vec![ann.clone(), name("bob")],
            ..GameSnapshot::default()
        };
        let banners = vec!["bob joined the round".to_string()];
        let frame = Frame {
            card: &card,
            board: &board,
            cursor: (0, 0),
            player: &ann,
            snapshot: &snapshot,
            banners: &banners,
        };

        let lines = frame.render(&PlainTermStyle);
        assert_eq!(lines[0], "+----+----+");
        assert!(lines[1].starts_with("|> "));
        assert!(lines[1].contains(&format!(" x{} ", card.word(0, 1))));
        assert!(lines.contains(&"Players: ann (you), bob".to_string()));
        assert!(lines.contains(&"bob joined the round".to_string()));
    }

    #[test]
    fn test_status_line() {
        let ann = name("ann");
        let mut snapshot = GameSnapshot::default();
        assert!(status_line(&snapshot, &ann).contains("q: abort"));

        snapshot.won = true;
        snapshot.winner = Some(ann.clone());
        assert_eq!(status_line(&snapshot, &ann), "BINGO! You won!");

        snapshot.winner = Some(name("bob"));
        assert_eq!(status_line(&snapshot, &ann), "bob won the round");

        let aborted = GameSnapshot {
            aborted: true,
            ..GameSnapshot::default()
        };
        assert_eq!(status_line(&aborted, &ann), "Game aborted");
    }
}
