/// Per-process view of round progress shared by the listener and the game loop
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::PlayerName;

/// Point-in-time copy of the local game state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Local roster mirror in join order
    pub roster: Vec<PlayerName>,
    /// Someone won the round
    pub won: bool,
    /// The round was aborted
    pub aborted: bool,
    /// Winner, when known
    pub winner: Option<PlayerName>,
}

impl GameSnapshot {
    /// Whether the round reached a terminal outcome
    pub fn is_finished(&self) -> bool {
        self.won || self.aborted
    }
}

/// Shared, lock-protected local game state
///
/// Clones share the same state. `won` and `aborted` only ever go from false
/// to true, and at most one of them is set: the first terminal transition
/// taken under the lock decides the outcome, later ones are refused.
#[derive(Debug, Clone, Default)]
pub struct LocalGameState {
    inner: Arc<Mutex<GameSnapshot>>,
}

impl LocalGameState {
    /// State seeded with a roster, duplicates dropped
    pub fn new(roster: impl IntoIterator<Item = PlayerName>) -> Self {
        let mut unique: Vec<PlayerName> = Vec::new();
        for player in roster {
            if !unique.contains(&player) {
                unique.push(player);
            }
        }
        Self {
            inner: Arc::new(Mutex::new(GameSnapshot {
                roster: unique,
                ..GameSnapshot::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameSnapshot> {
        // The guarded data stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the whole state taken under one lock
    pub fn snapshot(&self) -> GameSnapshot {
        self.lock().clone()
    }

    /// Local roster mirror
    pub fn roster(&self) -> Vec<PlayerName> {
        self.lock().roster.clone()
    }

    /// Whether the round was won
    pub fn won(&self) -> bool {
        self.lock().won
    }

    /// Whether the round was aborted
    pub fn aborted(&self) -> bool {
        self.lock().aborted
    }

    /// Winner, when known
    pub fn winner(&self) -> Option<PlayerName> {
        self.lock().winner.clone()
    }

    /// Whether the round reached a terminal outcome
    pub fn is_finished(&self) -> bool {
        self.lock().is_finished()
    }

    /// Append a player unless already present.
    ///
    /// Returns the roster as it was before the append when the player is new,
    /// None when it was already known.
    pub fn add_player(&self, player: &PlayerName) -> Option<Vec<PlayerName>> {
        let mut state = self.lock();
        if state.roster.contains(player) {
            return None;
        }
        let before = state.roster.clone();
        state.roster.push(player.clone());
        Some(before)
    }

    /// Record a win. Returns false when the round already ended.
    pub fn set_won(&self, winner: Option<PlayerName>) -> bool {
        let mut state = self.lock();
        if state.is_finished() {
            return false;
        }
        state.won = true;
        state.winner = winner;
        true
    }

    /// Record an abort. Returns false when the round already ended.
    pub fn set_aborted(&self) -> bool {
        let mut state = self.lock();
        if state.is_finished() {
            return false;
        }
        state.aborted = true;
        true
    }
}
