use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::RoundConfig;
use crate::error::{BingoError, Result};
use crate::store::record::{FinishReason, RoundRecord};
use crate::store::RoundStore;
use crate::types::PlayerName;

/// In-process round store, for tests and single-process demos
///
/// Unlike the file store, every operation runs under one mutex, so joins
/// never race.
#[derive(Debug, Default)]
pub struct MemoryRoundStore {
    rounds: Mutex<HashMap<PathBuf, RoundRecord>>,
}

impl MemoryRoundStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn with_rounds<T>(&self, f: impl FnOnce(&mut HashMap<PathBuf, RoundRecord>) -> T) -> T {
        let mut rounds = self.rounds.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rounds)
    }
}

impl RoundStore for MemoryRoundStore {
    fn create(&self, path: &Path, config: &RoundConfig) -> Result<RoundRecord> {
        config.validate()?;
        self.with_rounds(|rounds| {
            if rounds.contains_key(path) {
                return Err(BingoError::AlreadyExists(path.to_path_buf()));
            }
            let record = RoundRecord::new(config.clone());
            rounds.insert(path.to_path_buf(), record.clone());
            Ok(record)
        })
    }

    fn read(&self, path: &Path) -> Result<RoundRecord> {
        self.with_rounds(|rounds| {
            rounds
                .get(path)
                .cloned()
                .ok_or_else(|| BingoError::NotFound(path.to_path_buf()))
        })
    }

    fn try_join(&self, path: &Path, player: &PlayerName) -> Result<()> {
        self.with_rounds(|rounds| {
            let record = rounds
                .get_mut(path)
                .ok_or_else(|| BingoError::NotFound(path.to_path_buf()))?;
            record.check_join(player)?;
            record.players.push(player.clone());
            Ok(())
        })
    }

    fn mark_finished(&self, path: &Path, reason: FinishReason) -> Result<bool> {
        self.with_rounds(|rounds| {
            let record = rounds
                .get_mut(path)
                .ok_or_else(|| BingoError::NotFound(path.to_path_buf()))?;
            if record.finished {
                return Ok(false);
            }
            record.finished = true;
            record.aborted = reason == FinishReason::Aborted;
            Ok(true)
        })
    }
}
