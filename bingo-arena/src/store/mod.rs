//! Durable round records: who is in the game and whether it is over
//!
//! Every operation is a read-modify-write of the backing record without a
//! cross-process lock. Two joins racing on a shared filesystem can both pass
//! the capacity and name checks against the same roster and both append, so
//! a roster may transiently exceed `max_players` or hold a duplicate name.
//! Callers must tolerate such rosters.

mod file_store;
mod memory_store;
mod record;

use std::path::Path;

use crate::config::RoundConfig;
use crate::error::Result;
use crate::types::PlayerName;

pub use file_store::FileRoundStore;
pub use memory_store::MemoryRoundStore;
pub use record::{FinishReason, RoundRecord};

/// Storage interface for round records
///
/// Rounds are addressed by path. The file-backed store uses it as a file
/// name; other stores may treat it as an opaque key.
pub trait RoundStore: Send + Sync + std::fmt::Debug {
    /// Persist a new round with an empty roster.
    /// Fails with `AlreadyExists` without touching an existing round.
    fn create(&self, path: &Path, config: &RoundConfig) -> Result<RoundRecord>;

    /// Read the whole record. Fails with `NotFound` for an unknown round.
    fn read(&self, path: &Path) -> Result<RoundRecord>;

    /// Append `player` to the roster unless the round is missing, finished,
    /// full, or already has a player with that name
    fn try_join(&self, path: &Path, player: &PlayerName) -> Result<()>;

    /// Mark the round finished. Returns true if this call ended the round,
    /// false if it was already finished (no-op).
    fn mark_finished(&self, path: &Path, reason: FinishReason) -> Result<bool>;

    /// The checks of `try_join` without modifying the record
    fn check_access(&self, path: &Path, player: &PlayerName) -> Result<()> {
        self.read(path)?.check_join(player)
    }

    /// Roster in join order
    fn read_roster(&self, path: &Path) -> Result<Vec<PlayerName>> {
        Ok(self.read(path)?.players)
    }

    /// Parameters fixed at creation
    fn read_config(&self, path: &Path) -> Result<RoundConfig> {
        Ok(self.read(path)?.config)
    }
}
