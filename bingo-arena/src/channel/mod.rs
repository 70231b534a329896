//! Named process-visible message channels

mod notice;
mod spool;
mod stats;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ArenaConfig;
use crate::error::{BingoError, Result};
use crate::types::PlayerName;

pub use notice::Notice;
pub use spool::Channel;
pub use stats::{ChannelStats, StatsTracker};

/// Prefix of every per-player channel name
pub const PLAYER_CHANNEL_PREFIX: &str = "mq_";

/// Channel name, also the spool directory name inside a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName(String);

impl ChannelName {
    /// Validate and wrap a channel name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim_start_matches('/');
        if trimmed.is_empty() || trimmed == "." || trimmed == ".." || trimmed.starts_with('.') {
            return Err(BingoError::InvalidConfig(format!(
                "invalid channel name '{}'",
                name
            )));
        }
        if trimmed.chars().any(|c| matches!(c, '/' | '\\') || c.is_control()) {
            return Err(BingoError::InvalidConfig(format!(
                "channel name '{}' contains a path separator or control character",
                name
            )));
        }
        Ok(ChannelName(trimmed.to_string()))
    }

    /// Channel owned by `player`: `mq_<player>`
    pub fn for_player(player: &PlayerName) -> Self {
        ChannelName(format!("{}{}", PLAYER_CHANNEL_PREFIX, player))
    }

    /// Get the string representation, without the leading slash
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.0)
    }
}

/// Directory in which channel names resolve
///
/// All channels opened through one namespace (and its clones) share the
/// same traffic counters.
#[derive(Debug, Clone)]
pub struct ChannelNamespace {
    root: PathBuf,
    capacity: usize,
    poll_interval: Duration,
    stats: StatsTracker,
}

impl ChannelNamespace {
    /// Namespace rooted at `root` with default capacity and polling
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let defaults = ArenaConfig::default();
        Self {
            root: root.into(),
            capacity: defaults.channel_capacity,
            poll_interval: defaults.poll_interval(),
            stats: StatsTracker::new(),
        }
    }

    /// Namespace for the channels of the round stored at `round_path`
    pub fn for_round(config: &ArenaConfig, round_path: &Path) -> Self {
        Self {
            root: config.channel_dir_for(round_path),
            capacity: config.channel_capacity,
            poll_interval: config.poll_interval(),
            stats: StatsTracker::new(),
        }
    }

    /// Set the per-channel queue capacity (at least 1)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the polling interval of blocking receives
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle to a channel without touching the filesystem
    pub fn channel(&self, name: &ChannelName) -> Channel {
        Channel::new(
            name.clone(),
            self.root.join(name.as_str()),
            self.capacity,
            self.poll_interval,
            self.stats.clone(),
        )
    }

    /// Open a channel, creating it if needed. Opening the same name twice
    /// yields handles to the same conduit.
    pub async fn open(&self, name: &ChannelName) -> Result<Channel> {
        let channel = self.channel(name);
        channel.ensure().await?;
        Ok(channel)
    }

    /// Open the channel owned by `player`
    pub async fn open_player(&self, player: &PlayerName) -> Result<Channel> {
        self.open(&ChannelName::for_player(player)).await
    }

    /// Traffic of every channel handed out by this namespace
    pub fn stats(&self) -> ChannelStats {
        self.stats.get_stats()
    }
}
