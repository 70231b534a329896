//! Configuration for rounds and for the local arena

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BingoError, Result};

/// Round parameters fixed at creation and persisted in the round record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundConfig {
    /// Roster capacity (at least 2)
    pub max_players: usize,

    /// Number of board rows
    pub board_height: usize,

    /// Number of board columns
    pub board_width: usize,

    /// Handle to the word list, opaque to the coordination layer
    pub word_source: String,
}

impl RoundConfig {
    /// Create a round configuration
    pub fn new(
        max_players: usize,
        board_height: usize,
        board_width: usize,
        word_source: impl Into<String>,
    ) -> Self {
        Self {
            max_players,
            board_height,
            board_width,
            word_source: word_source.into(),
        }
    }

    /// Check the value ranges accepted by the round store
    pub fn validate(&self) -> Result<()> {
        if self.max_players < 2 {
            return Err(BingoError::InvalidConfig(format!(
                "max players must be at least 2, got {}",
                self.max_players
            )));
        }
        if self.board_height == 0 || self.board_width == 0 {
            return Err(BingoError::InvalidConfig(format!(
                "board must be at least 1x1, got {}x{}",
                self.board_height, self.board_width
            )));
        }
        if self.word_source.contains('\n') {
            return Err(BingoError::InvalidConfig(
                "word source must fit on one line".to_string(),
            ));
        }
        Ok(())
    }
}

/// Local settings for channels and polling
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Directory holding every channel spool
    pub channel_root: PathBuf,

    /// Place channels under a subdirectory named after the round file,
    /// so equal player names in unrelated rounds never share a channel
    pub scope_channels_by_round: bool,

    /// Name of the channel used to signal quorum
    pub rendezvous_name: String,

    /// Maximum number of queued messages per channel
    pub channel_capacity: usize,

    /// Spool polling granularity (in milliseconds)
    pub poll_interval_ms: u64,

    /// Notifier receive timeout (in milliseconds)
    pub receive_timeout_ms: u64,

    /// Notifier backoff after a failed receive (in milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            channel_root: std::env::temp_dir().join("bingo-mq"),
            scope_channels_by_round: true,
            rendezvous_name: "mq_bingo_rendezvous".to_string(),
            channel_capacity: 10,
            poll_interval_ms: 20,
            receive_timeout_ms: 250,
            retry_backoff_ms: 500,
        }
    }
}

impl ArenaConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channel root directory
    pub fn with_channel_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.channel_root = root.into();
        self
    }

    /// Set whether channels are scoped by round
    pub fn with_scope_channels_by_round(mut self, scoped: bool) -> Self {
        self.scope_channels_by_round = scoped;
        self
    }

    /// Set the per-channel queue capacity (at least 1)
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Set the spool polling interval in milliseconds
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms.max(1);
        self
    }

    /// Set the Notifier receive timeout in milliseconds
    pub fn with_receive_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.receive_timeout_ms = timeout_ms;
        self
    }

    /// Set the Notifier retry backoff in milliseconds
    pub fn with_retry_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.retry_backoff_ms = backoff_ms;
        self
    }

    /// Directory the channels of the given round live in
    ///
    /// The scope is the round file's stem plus a digest of its resolved
    /// location, e.g. `friday-3f2a9c1e`, so `/a/friday.round` and
    /// `/b/friday.round` never share channels.
    pub fn channel_dir_for(&self, round_path: &Path) -> PathBuf {
        if !self.scope_channels_by_round {
            return self.channel_root.clone();
        }
        let stem = round_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "round".to_string());
        let location = resolved_location(round_path);
        let digest = uuid::Uuid::new_v5(
            &uuid::Uuid::NAMESPACE_URL,
            location.to_string_lossy().as_bytes(),
        )
        .simple()
        .to_string();
        self.channel_root.join(format!("{}-{}", stem, &digest[..8]))
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub(crate) fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub(crate) fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Absolute location of a round file that may not exist yet: the resolved
/// parent directory joined with the file name
fn resolved_location(round_path: &Path) -> PathBuf {
    let parent = match round_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = parent
        .canonicalize()
        .or_else(|_| std::path::absolute(parent))
        .unwrap_or_else(|_| parent.to_path_buf());
    match round_path.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_config_validation() {
        assert!(RoundConfig::new(2, 5, 5, "words.txt").validate().is_ok());
        assert!(RoundConfig::new(1, 5, 5, "words.txt").validate().is_err());
        assert!(RoundConfig::new(4, 0, 5, "words.txt").validate().is_err());
        assert!(RoundConfig::new(4, 3, 0, "words.txt").validate().is_err());
        assert!(RoundConfig::new(4, 3, 3, "a\nb").validate().is_err());
    }

    #[test]
    fn test_channel_dir_scoping() {
        let config = ArenaConfig::new().with_channel_root("/tmp/mq");
        let friday = config.channel_dir_for(Path::new("/games/friday.round"));
        assert_eq!(friday.parent(), Some(Path::new("/tmp/mq")));
        let scope = friday.file_name().unwrap().to_string_lossy().into_owned();
        assert!(scope.starts_with("friday-"));
        assert_eq!(scope.len(), "friday-".len() + 8);
        assert_eq!(friday, config.channel_dir_for(Path::new("/games/friday.round")));

        let unscoped = config.with_scope_channels_by_round(false);
        assert_eq!(
            unscoped.channel_dir_for(Path::new("/games/friday.round")),
            PathBuf::from("/tmp/mq")
        );
    }

    #[test]
    fn test_same_file_name_in_other_directory_gets_own_scope() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let config = ArenaConfig::new().with_channel_root(dir.path().join("mq"));

        let a = config.channel_dir_for(&dir.path().join("a").join("friday.round"));
        let b = config.channel_dir_for(&dir.path().join("b").join("friday.round"));
        assert_ne!(a, b);

        // Spelling of the path does not matter once resolved
        let dotted = dir.path().join("b").join("..").join("a").join("friday.round");
        assert_eq!(config.channel_dir_for(&dotted), a);
    }

    #[test]
    fn test_builder_clamps() {
        let config = ArenaConfig::new()
            .with_channel_capacity(0)
            .with_poll_interval_ms(0);
        assert_eq!(config.channel_capacity, 1);
        assert_eq!(config.poll_interval_ms, 1);
    }
}
