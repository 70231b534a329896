/// Background listener reconciling channel notices with local state
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::channel::{Channel, ChannelNamespace, Notice};
use crate::round::{broadcast_text, state::LocalGameState};
use crate::types::{PlayerName, RoundEvent};

/// Everything the listener loop needs, moved into its task
pub(crate) struct Listener {
    /// Owner of the drained channel
    pub(crate) player: PlayerName,
    /// This process's channel
    pub(crate) channel: Channel,
    /// Namespace used to reach peer channels
    pub(crate) namespace: ChannelNamespace,
    /// Shared local state
    pub(crate) state: LocalGameState,
    /// Observed progress for the foreground
    pub(crate) events_tx: flume::Sender<RoundEvent>,
    /// Receive timeout of one poll
    pub(crate) receive_timeout: Duration,
    /// Pause after a failed receive
    pub(crate) retry_backoff: Duration,
}

impl Listener {
    /// Drain the channel until the round is won or aborted
    ///
    /// Timeouts are the normal idle outcome. Any other receive failure is
    /// logged and retried after the backoff; it never ends the loop.
    pub(crate) async fn run(self) {
        tracing::debug!("Notifier for '{}' listening on {}", self.player, self.channel.name());

        while !self.state.is_finished() {
            match self.channel.receive(self.receive_timeout).await {
                Ok(text) => self.handle(&text).await,
                Err(e) if e.is_timeout() => {}
                Err(e) => {
                    tracing::warn!(
                        "Notifier for '{}' failed to receive on {}: {}",
                        self.player,
                        self.channel.name(),
                        e
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
            }
        }

        tracing::debug!("Notifier for '{}' stopped", self.player);
    }

    /// Apply one received notice to local state
    pub(crate) async fn handle(&self, text: &str) {
        match Notice::parse(text) {
            Some(Notice::PlayerJoined(joined)) => {
                let Some(before) = self.state.add_player(&joined) else {
                    tracing::debug!("'{}' already on the roster of '{}'", joined, self.player);
                    return;
                };
                tracing::info!("Player '{}' joined", joined);
                self.emit(RoundEvent::PlayerJoined(joined.clone()));

                // Peers known before this update may not know the new player
                let peers: Vec<PlayerName> = before
                    .into_iter()
                    .filter(|p| *p != self.player && *p != joined)
                    .collect();
                // Failures are logged per peer; forwarding is best effort
                broadcast_text(&self.namespace, &peers, text).await;
            }
            Some(Notice::Won { winner }) => {
                if self.state.set_won(winner.clone()) {
                    match &winner {
                        Some(name) => tracing::info!("Round won by '{}'", name),
                        None => tracing::info!("Round won"),
                    }
                    self.emit(RoundEvent::Won { winner });
                }
            }
            Some(Notice::Aborted) => {
                if self.state.set_aborted() {
                    tracing::info!("Round aborted");
                    self.emit(RoundEvent::Aborted);
                }
            }
            Some(Notice::Start) => {
                tracing::debug!("Ignoring start notice on {}", self.channel.name());
            }
            None => {
                tracing::warn!("Unrecognised notice on {}: '{}'", self.channel.name(), text);
            }
        }
    }

    fn emit(&self, event: RoundEvent) {
        // Nobody listening is fine
        let _ = self.events_tx.send(event);
    }
}

/// Handle to the running listener task
///
/// The task is aborted when the handle is dropped.
#[derive(Debug)]
pub struct Notifier {
    handle: JoinHandle<()>,
}

impl Notifier {
    pub(crate) fn spawn(listener: Listener) -> Self {
        Self {
            handle: tokio::spawn(listener.run()),
        }
    }

    /// Whether the loop exited (round won or aborted, or stopped)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the loop without waiting
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PlayerName {
        PlayerName::new(s).unwrap()
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        namespace: ChannelNamespace,
        listener: Listener,
        events_rx: flume::Receiver<RoundEvent>,
    }

    async fn fixture(player: &str, roster: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let namespace = ChannelNamespace::new(dir.path()).with_poll_interval(Duration::from_millis(5));
        let player = name(player);
        let channel = namespace.open_player(&player).await.unwrap();
        let (events_tx, events_rx) = flume::unbounded();
        let listener = Listener {
            player,
            channel,
            namespace: namespace.clone(),
            state: LocalGameState::new(roster.iter().map(|p| name(p))),
            events_tx,
            receive_timeout: Duration::from_millis(20),
            retry_backoff: Duration::from_millis(20),
        };
        Fixture {
            _dir: dir,
            namespace,
            listener,
            events_rx,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_duplicate_join_yields_one_entry() {
        let fx = fixture("ann", &["ann"]).await;

        fx.listener.handle("player joined: bob").await;
        fx.listener.handle("player joined: bob").await;

        assert_eq!(fx.listener.state.roster(), vec![name("ann"), name("bob")]);
        let events: Vec<RoundEvent> = fx.events_rx.try_iter().collect();
        assert_eq!(events, vec![RoundEvent::PlayerJoined(name("bob"))]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_join_is_forwarded_to_earlier_peers_only() {
        let fx = fixture("ann", &["ann", "bob"]).await;
        let bob = fx.namespace.open_player(&name("bob")).await.unwrap();
        let cid = fx.namespace.open_player(&name("cid")).await.unwrap();

        fx.listener.handle("player joined: cid").await;

        let forwarded = bob.receive(Duration::from_millis(100)).await.unwrap();
        assert_eq!(forwarded, "player joined: cid");
        assert!(cid.is_empty().await.unwrap());
        assert!(fx.listener.channel.is_empty().await.unwrap());

        // Second delivery of the same notice is not forwarded again
        fx.listener.handle("player joined: cid").await;
        assert!(bob.is_empty().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_flags_are_monotonic() {
        let fx = fixture("ann", &["ann", "bob"]).await;

        fx.listener.handle("bob won").await;
        for text in ["aborted", "ann won", "player joined: cid", "start", "garbage"] {
            fx.listener.handle(text).await;
        }

        let snapshot = fx.listener.state.snapshot();
        assert!(snapshot.won);
        assert!(!snapshot.aborted);
        assert_eq!(snapshot.winner, Some(name("bob")));

        let events: Vec<RoundEvent> = fx.events_rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                RoundEvent::Won { winner: Some(name("bob")) },
                RoundEvent::PlayerJoined(name("cid")),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_loop_exits_on_abort() {
        let fx = fixture("ann", &["ann", "bob"]).await;
        let state = fx.listener.state.clone();
        let inbox = fx.listener.channel.clone();

        let notifier = Notifier::spawn(fx.listener);
        inbox.send("player joined: cid").await.unwrap();
        inbox.send("aborted").await.unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !notifier.is_finished() && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(notifier.is_finished());
        assert!(state.aborted());
        assert_eq!(state.roster(), vec![name("ann"), name("bob"), name("cid")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_loop_survives_destroyed_channel() {
        let fx = fixture("ann", &["ann"]).await;
        let state = fx.listener.state.clone();
        let inbox = fx.listener.channel.clone();

        let notifier = Notifier::spawn(fx.listener);
        inbox.destroy().await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!notifier.is_finished());

        // Sending recreates the channel and the loop picks up again
        inbox.send("ann won").await.unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !state.won() && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(state.won());
        notifier.stop();
    }
}
