//! Player names for processes that join without choosing one

use markov_namegen::{CharacterChainGenerator, RandomTextGenerator};

use crate::types::PlayerName;

/// Seats at the table; the numeric part of a generated name stays below this
const SEATS: u16 = 1000;

const MIN_BASE_LEN: usize = 3;
const MAX_BASE_LEN: usize = 10;

/// Names that read well on a bingo scoreboard
const SCOREBOARD: &[&str] = &[
    "Anna", "Bruno", "Clara", "Dennis", "Emma", "Felix", "Greta", "Hannes",
    "Ida", "Jonas", "Karla", "Lukas", "Mila", "Niklas", "Olga", "Paul",
    "Rosa", "Simon", "Tilda", "Ulrich", "Vera", "Wanda", "Yara", "Zeno",
    "Bingo", "Lotto", "Joker", "Domino", "Polka", "Tango", "Rumba", "Salsa",
];

/// Markov chain trained on scoreboard names
pub struct NameGenerator {
    chain: CharacterChainGenerator,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator {
    pub fn new() -> Self {
        let chain = CharacterChainGenerator::builder()
            .with_order(2)
            .with_prior(0.01)
            .train(SCOREBOARD.iter().copied())
            .build();
        Self { chain }
    }

    /// Capitalised alphanumeric name of 3 to 10 characters, e.g. "Karlo"
    pub fn base_name(&mut self) -> String {
        loop {
            let raw = self.chain.generate_one();
            let len = raw.chars().count();
            if !(MIN_BASE_LEN..=MAX_BASE_LEN).contains(&len)
                || !raw.chars().all(|c| c.is_ascii_alphanumeric())
            {
                continue;
            }
            let mut chars = raw.chars();
            if let Some(first) = chars.next() {
                return first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase();
            }
        }
    }

    /// Name like "Karlo-042" that is not on `taken`
    pub fn player_name(&mut self, taken: &[PlayerName]) -> PlayerName {
        loop {
            let seat = rand::random::<u16>() % SEATS;
            let candidate = format!("{}-{:03}", self.base_name(), seat);
            match PlayerName::new(candidate) {
                Ok(name) if !taken.contains(&name) => return name,
                _ => continue,
            }
        }
    }
}
