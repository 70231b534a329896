//! Bingo card generation from a word list

use std::path::Path;

use anyhow::{bail, Context};
use bingo_arena::Board;
use rand::seq::SliceRandom;
use rand::Rng;

/// Label of the free centre cell
pub const JOKER: &str = "JOKER";

/// Words of one player's card, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    height: usize,
    width: usize,
    words: Vec<String>,
}

/// Read one word per line, skipping blank lines
pub fn load_words(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read word file {}", path.display()))?;
    Ok(parse_words(&text))
}

fn parse_words(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl Card {
    /// Shuffle `words` and lay out a `height` x `width` card. Odd square
    /// cards get a Joker in the centre, which needs one word less.
    pub fn generate(
        words: &[String],
        height: usize,
        width: usize,
        rng: &mut impl Rng,
    ) -> anyhow::Result<Self> {
        let joker = Board::joker_cell(height, width);
        let needed = height * width - usize::from(joker.is_some());
        if words.len() < needed {
            bail!(
                "Not enough words for a {}x{} card: need {}, got {}",
                height,
                width,
                needed,
                words.len()
            );
        }

        let mut pool: Vec<String> = words.to_vec();
        pool.shuffle(rng);
        pool.truncate(needed);

        if let Some((row, col)) = joker {
            pool.insert(row * width + col, JOKER.to_string());
        }

        Ok(Self {
            height,
            width,
            words: pool,
        })
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Word at a cell
    pub fn word(&self, row: usize, col: usize) -> &str {
        &self.words[row * self.width + col]
    }

    /// Longest word, for column sizing
    pub fn cell_width(&self) -> usize {
        self.words.iter().map(|w| w.chars().count()).max().unwrap_or(0)
    }

    /// Fresh board matching this card, Joker pre-marked
    pub fn board(&self) -> Board {
        Board::with_joker(self.height, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word{}", i)).collect()
    }

    #[test]
    fn test_parse_words_skips_blank_lines() {
        let parsed = parse_words("Synergy\n\n  Agile  \r\nBlockchain\n");
        assert_eq!(parsed, vec!["Synergy", "Agile", "Blockchain"]);
    }

    #[test]
    fn test_generate_square_card_with_joker() {
        let mut rng = StdRng::seed_from_u64(7);
        let card = Card::generate(&words(24), 5, 5, &mut rng).unwrap();
        assert_eq!(card.word(2, 2), JOKER);

        let mut seen: Vec<&str> = (0..5)
            .flat_map(|r| (0..5).map(move |c| (r, c)))
            .filter(|&(r, c)| (r, c) != (2, 2))
            .map(|(r, c)| card.word(r, c))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 24);

        let board = card.board();
        assert!(board.is_marked(2, 2));
    }

    #[test]
    fn test_generate_even_card_without_joker() {
        let mut rng = StdRng::seed_from_u64(7);
        let card = Card::generate(&words(20), 4, 4, &mut rng).unwrap();
        assert!((0..4).all(|r| (0..4).all(|c| card.word(r, c) != JOKER)));
        assert_eq!(card.board().marked_count(), 0);
    }

    #[test]
    fn test_not_enough_words() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(Card::generate(&words(8), 3, 4, &mut rng).is_err());
        assert!(Card::generate(&words(8), 3, 3, &mut rng).is_ok());
    }

    #[test]
    fn test_load_words_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_words(&dir.path().join("none.txt")).is_err());

        let path = dir.path().join("words.txt");
        std::fs::write(&path, "a\nb\n").unwrap();
        assert_eq!(load_words(&path).unwrap(), vec!["a", "b"]);
    }
}
