//! Coordinator of one process's participation in a round
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::channel::{Channel, ChannelName, ChannelNamespace, ChannelStats, Notice};
use crate::config::{ArenaConfig, RoundConfig};
use crate::error::{BingoError, Result};
use crate::round::broadcast_text;
use crate::round::notifier::{Listener, Notifier};
use crate::round::state::{GameSnapshot, LocalGameState};
use crate::store::{FinishReason, RoundRecord, RoundStore};
use crate::types::{PlayerName, RoundEvent, RoundPhase};

/// An active round, as seen by one player
///
/// Obtained from the create or join builders of [`crate::Arena`]. While the
/// coordinator lives, a background notifier drains the player's channel and
/// keeps the local roster and the won/aborted flags up to date. The
/// foreground game loop reads those through the accessors and ends the round
/// with [`Coordinator::report_win`] or [`Coordinator::report_abort`].
pub struct Coordinator {
    /// Local player
    player: PlayerName,

    /// Address of the round record
    round_path: PathBuf,

    /// Parameters fixed at creation
    round: RoundConfig,

    /// Round record storage
    store: Arc<dyn RoundStore>,

    /// Namespace of this round's channels
    namespace: ChannelNamespace,

    /// This player's channel
    channel: Channel,

    /// State shared with the notifier
    state: LocalGameState,

    /// Background listener, aborted on drop
    notifier: Notifier,

    /// Progress observed by the notifier
    events_rx: flume::Receiver<RoundEvent>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("player", &self.player)
            .field("round_path", &self.round_path)
            .field("phase", &self.phase())
            .field("state", &self.state.snapshot())
            .finish()
    }
}

impl Coordinator {
    /// Create path: persist the round, register the creator, then block
    /// until a second player signals on the rendezvous channel
    pub(crate) async fn create(
        config: &ArenaConfig,
        store: Arc<dyn RoundStore>,
        round_path: PathBuf,
        round: RoundConfig,
        player: PlayerName,
    ) -> Result<Self> {
        let phase = RoundPhase::Creating;
        tracing::info!("Creating round {} as '{}'", round_path.display(), player);

        // Refuse before touching the channels of a round that already exists
        match store.read(&round_path) {
            Err(BingoError::NotFound(_)) => {}
            Err(BingoError::Io(e)) => return Err(BingoError::Io(e)),
            _ => return Err(BingoError::AlreadyExists(round_path)),
        }

        // Channels are reset before the round becomes visible, so no joiner
        // can have signalled yet
        let namespace = ChannelNamespace::for_round(config, &round_path);
        let channel = namespace.open_player(&player).await?;
        channel.purge().await?;
        let rendezvous = namespace
            .open(&ChannelName::new(config.rendezvous_name.clone())?)
            .await?;
        rendezvous.purge().await?;

        store.create(&round_path, &round)?;
        store.try_join(&round_path, &player)?;

        let phase = phase.transition(RoundPhase::WaitingForQuorum)?;
        tracing::info!("Round {}: {}", round_path.display(), phase);

        wait_for_start(&rendezvous, config.receive_timeout()).await?;
        if let Err(e) = rendezvous.destroy().await {
            tracing::warn!("Failed to remove {}: {}", rendezvous.name(), e);
        }

        phase.transition(RoundPhase::Active)?;
        let record = store.read(&round_path)?;
        tracing::info!(
            "Quorum reached in round {} ({} players)",
            round_path.display(),
            record.players.len()
        );

        Ok(Self::activate(config, store, round_path, record, player, namespace, channel))
    }

    /// Join path: validate access, register, wake the creator and announce
    /// the new player to everyone already on the roster
    ///
    /// Every channel is prepared before the roster append, so an unusable
    /// channel root refuses the join without taking a seat. A failure after
    /// the append leaves the seat taken (the roster is append-only) but
    /// removes the player's channel.
    pub(crate) async fn join(
        config: &ArenaConfig,
        store: Arc<dyn RoundStore>,
        round_path: PathBuf,
        player: PlayerName,
    ) -> Result<Self> {
        let phase = RoundPhase::JoiningAttempt;
        tracing::info!("Joining round {} as '{}'", round_path.display(), player);

        // Validate before purging so a rejected name never touches the
        // channel of the player that owns it
        store.check_access(&round_path, &player)?;

        let namespace = ChannelNamespace::for_round(config, &round_path);
        let channel = namespace.open_player(&player).await?;
        channel.purge().await?;
        let rendezvous = namespace
            .open(&ChannelName::new(config.rendezvous_name.clone())?)
            .await?;

        if let Err(e) = store.try_join(&round_path, &player) {
            // A name taken in the meantime means the channel is someone else's
            if !matches!(e, BingoError::NameTaken(_)) {
                discard_channel(&channel).await;
            }
            return Err(e);
        }

        let record = match announce(&store, &round_path, &player, &namespace, &rendezvous).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "Join of '{}' failed after registering; the seat in round {} stays taken: {}",
                    player,
                    round_path.display(),
                    e
                );
                discard_channel(&channel).await;
                return Err(e);
            }
        };

        phase.transition(RoundPhase::Active)?;
        tracing::info!(
            "Joined round {} ({} players)",
            round_path.display(),
            record.players.len()
        );

        Ok(Self::activate(config, store, round_path, record, player, namespace, channel))
    }

    fn activate(
        config: &ArenaConfig,
        store: Arc<dyn RoundStore>,
        round_path: PathBuf,
        record: RoundRecord,
        player: PlayerName,
        namespace: ChannelNamespace,
        channel: Channel,
    ) -> Self {
        let state = LocalGameState::new(record.players.iter().cloned());
        let (events_tx, events_rx) = flume::unbounded();

        let notifier = Notifier::spawn(Listener {
            player: player.clone(),
            channel: channel.clone(),
            namespace: namespace.clone(),
            state: state.clone(),
            events_tx,
            receive_timeout: config.receive_timeout(),
            retry_backoff: config.retry_backoff(),
        });

        Self {
            player,
            round_path,
            round: record.config,
            store,
            namespace,
            channel,
            state,
            notifier,
            events_rx,
        }
    }

    /// Local player
    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    /// Address of the round record
    pub fn round_path(&self) -> &Path {
        &self.round_path
    }

    /// Parameters fixed at creation
    pub fn round_config(&self) -> &RoundConfig {
        &self.round
    }

    /// `Active` until the round is won or aborted, then `Finished`
    pub fn phase(&self) -> RoundPhase {
        if self.state.is_finished() {
            RoundPhase::Finished
        } else {
            RoundPhase::Active
        }
    }

    /// Local roster mirror
    pub fn roster(&self) -> Vec<PlayerName> {
        self.state.roster()
    }

    /// Whether the round was won
    pub fn won(&self) -> bool {
        self.state.won()
    }

    /// Whether the round was aborted
    pub fn aborted(&self) -> bool {
        self.state.aborted()
    }

    /// Winner, when known
    pub fn winner(&self) -> Option<PlayerName> {
        self.state.winner()
    }

    /// Roster and flags read under one lock
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    /// Shared state handle, for readers on other threads
    pub fn state(&self) -> LocalGameState {
        self.state.clone()
    }

    /// Receiver of join/win/abort events observed by the notifier
    pub fn events(&self) -> flume::Receiver<RoundEvent> {
        self.events_rx.clone()
    }

    /// Events received since the last call
    pub fn drain_events(&self) -> Vec<RoundEvent> {
        self.events_rx.try_iter().collect()
    }

    /// Whether the background listener is still running
    pub fn is_listening(&self) -> bool {
        !self.notifier.is_finished()
    }

    /// Channel traffic of this round
    pub fn stats(&self) -> ChannelStats {
        self.namespace.stats()
    }

    /// Declare the local player the winner
    ///
    /// Refused with `AlreadyReported` once the round is won or aborted.
    /// Otherwise tells every known peer and marks the round file finished.
    pub async fn report_win(&self) -> Result<()> {
        if !self.state.set_won(Some(self.player.clone())) {
            return Err(BingoError::AlreadyReported);
        }
        tracing::info!("'{}' won round {}", self.player, self.round_path.display());

        let notice = Notice::Won {
            winner: Some(self.player.clone()),
        };
        self.finish(notice, FinishReason::Won).await
    }

    /// Abort the round for everyone
    ///
    /// Refused with `AlreadyReported` once the round is won or aborted.
    pub async fn report_abort(&self) -> Result<()> {
        if !self.state.set_aborted() {
            return Err(BingoError::AlreadyReported);
        }
        tracing::info!("'{}' aborted round {}", self.player, self.round_path.display());

        self.finish(Notice::Aborted, FinishReason::Aborted).await
    }

    async fn finish(&self, notice: Notice, reason: FinishReason) -> Result<()> {
        let peers = self.peers();
        broadcast_text(&self.namespace, &peers, &notice.to_string()).await;

        if !self.store.mark_finished(&self.round_path, reason)? {
            tracing::debug!("Round {} was already marked finished", self.round_path.display());
        }
        Ok(())
    }

    /// Every player other than the local one, from the local mirror and the
    /// round record, so terminal notices also reach players gossip missed
    fn peers(&self) -> Vec<PlayerName> {
        let mut peers = self.state.roster();
        match self.store.read_roster(&self.round_path) {
            Ok(stored) => {
                for player in stored {
                    if !peers.contains(&player) {
                        peers.push(player);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Falling back to local roster: {}", e);
            }
        }
        peers.retain(|p| *p != self.player);
        peers
    }

    /// Stop listening and remove the local player's channel
    pub async fn shutdown(self) -> Result<()> {
        self.notifier.stop();
        self.channel.destroy().await
    }
}

/// Read the roster, wake the creator and tell earlier players about `player`
async fn announce(
    store: &Arc<dyn RoundStore>,
    round_path: &Path,
    player: &PlayerName,
    namespace: &ChannelNamespace,
    rendezvous: &Channel,
) -> Result<RoundRecord> {
    let record = store.read(round_path)?;

    match rendezvous.send(&Notice::Start.to_string()).await {
        Ok(()) => {}
        // Creator already woke up; the queue holds earlier start signals
        Err(BingoError::Busy(_)) => {
            tracing::debug!("{} already signalled", rendezvous.name());
        }
        Err(e) => return Err(e),
    }

    let peers: Vec<PlayerName> = record
        .players
        .iter()
        .filter(|p| *p != player)
        .cloned()
        .collect();
    let announcement = Notice::PlayerJoined(player.clone()).to_string();
    let failed = broadcast_text(namespace, &peers, &announcement).await;
    // A saturated peer queue means that peer stopped listening; an I/O
    // failure means the channel root itself is unusable
    if let Some((_, e)) = failed
        .into_iter()
        .find(|(_, e)| matches!(e, BingoError::Io(_)))
    {
        return Err(e);
    }
    Ok(record)
}

async fn discard_channel(channel: &Channel) {
    if let Err(e) = channel.destroy().await {
        tracing::warn!("Failed to remove {}: {}", channel.name(), e);
    }
}

/// Block until a start notice arrives on the rendezvous channel
///
/// No overall timeout: a round nobody joins never starts.
async fn wait_for_start(rendezvous: &Channel, poll: Duration) -> Result<()> {
    loop {
        match rendezvous.receive(poll).await {
            Ok(text) if Notice::parse(&text) == Some(Notice::Start) => return Ok(()),
            Ok(text) => {
                tracing::debug!("Ignoring '{}' on {}", text, rendezvous.name());
            }
            Err(e) if e.is_timeout() => {}
            Err(e) => return Err(e),
        }
    }
}
