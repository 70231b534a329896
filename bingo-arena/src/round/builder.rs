use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ArenaConfig, RoundConfig};
use crate::error::Result;
use crate::round::coordinator::Coordinator;
use crate::store::{FileRoundStore, RoundStore};
use crate::types::PlayerName;

/// Entry point for creating and joining rounds from this process
///
/// # Example
/// ```no_run
/// use bingo_arena::{Arena, ArenaConfig, RoundConfig};
///
/// # async fn example() -> bingo_arena::Result<()> {
/// let arena = Arena::new(ArenaConfig::default());
///
/// // Blocks until a second player joins
/// let round = arena
///     .create_round("friday.round", RoundConfig::new(4, 5, 5, "buzzwords.txt"))
///     .player("ann")?
///     .await?;
///
/// println!("Playing with {:?}", round.roster());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    store: Arc<dyn RoundStore>,
}

impl Arena {
    /// Arena backed by round files
    pub fn new(config: ArenaConfig) -> Self {
        Self::with_store(config, Arc::new(FileRoundStore::new()))
    }

    /// Arena backed by a custom round store
    pub fn with_store(config: ArenaConfig, store: Arc<dyn RoundStore>) -> Self {
        Self { config, store }
    }

    /// Local settings
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Round store in use
    pub fn store(&self) -> &Arc<dyn RoundStore> {
        &self.store
    }

    /// Start building a new round stored at `path`
    pub fn create_round(&self, path: impl Into<PathBuf>, round: RoundConfig) -> RoundBuilder {
        RoundBuilder::new(self.clone(), path.into(), Intent::Create(round))
    }

    /// Start building a join of the round stored at `path`
    pub fn join_round(&self, path: impl Into<PathBuf>) -> RoundBuilder {
        RoundBuilder::new(self.clone(), path.into(), Intent::Join)
    }
}

#[derive(Debug, Clone)]
enum Intent {
    Create(RoundConfig),
    Join,
}

/// Builder for entering a round, resolved with `.await`
#[must_use = "RoundBuilder does nothing unless you `.await` it"]
#[derive(Debug)]
pub struct RoundBuilder {
    arena: Arena,
    path: PathBuf,
    intent: Intent,
    player: Option<PlayerName>,
}

impl RoundBuilder {
    fn new(arena: Arena, path: PathBuf, intent: Intent) -> Self {
        Self {
            arena,
            path,
            intent,
            player: None,
        }
    }

    /// Set the player name (a random one not yet on the roster is
    /// generated otherwise)
    pub fn player(mut self, name: impl Into<String>) -> Result<Self> {
        self.player = Some(PlayerName::new(name)?);
        Ok(self)
    }

    /// Set an already validated player name
    pub fn player_name(mut self, name: PlayerName) -> Self {
        self.player = Some(name);
        self
    }
}

impl std::future::IntoFuture for RoundBuilder {
    type Output = Result<Coordinator>;
    type IntoFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let Arena { config, store } = self.arena;
            let player = match (self.player, &self.intent) {
                (Some(player), _) => player,
                (None, Intent::Create(_)) => PlayerName::generate(),
                // Avoid a NameTaken refusal for a name nobody chose
                (None, Intent::Join) => {
                    let taken = store.read_roster(&self.path).unwrap_or_default();
                    PlayerName::generate_avoiding(&taken)
                }
            };
            match self.intent {
                Intent::Create(round) => {
                    Coordinator::create(&config, store, self.path, round, player).await
                }
                Intent::Join => Coordinator::join(&config, store, self.path, player).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BingoError;
    use crate::store::MemoryRoundStore;
    use std::path::Path;

    #[test]
    fn test_builder_rejects_invalid_name() {
        let arena = Arena::new(ArenaConfig::default());
        let result = arena.join_round("round").player("has space");
        assert!(matches!(result, Err(BingoError::InvalidPlayerName(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_join_missing_round() {
        let dir = tempfile::tempdir().unwrap();
        let arena = Arena::new(ArenaConfig::new().with_channel_root(dir.path()));

        let result = arena
            .join_round(dir.path().join("missing.round"))
            .player("ann")
            .unwrap()
            .await;
        assert!(matches!(result, Err(BingoError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_create_existing_round_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryRoundStore::new());
        store
            .create(Path::new("taken"), &RoundConfig::new(2, 5, 5, "w"))
            .unwrap();
        let arena = Arena::with_store(ArenaConfig::new().with_channel_root(dir.path()), store);

        let result = arena
            .create_round("taken", RoundConfig::new(2, 5, 5, "w"))
            .await;
        assert!(matches!(result, Err(BingoError::AlreadyExists(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_join_without_name_generates_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryRoundStore::new());
        let path = Path::new("open");
        store.create(path, &RoundConfig::new(3, 3, 3, "w")).unwrap();
        let ann = PlayerName::new("ann").unwrap();
        store.try_join(path, &ann).unwrap();
        let arena = Arena::with_store(ArenaConfig::new().with_channel_root(dir.path()), store);

        let round = arena.join_round(path).await.unwrap();
        assert_ne!(round.player(), &ann);
        assert_eq!(round.roster(), vec![ann, round.player().clone()]);
        round.shutdown().await.unwrap();
    }
}
