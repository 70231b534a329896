//! Round lifecycle: create/join handshake, background listener, win and abort

pub(crate) mod builder;
pub(crate) mod coordinator;
pub(crate) mod notifier;
pub(crate) mod state;

use crate::channel::{ChannelName, ChannelNamespace};
use crate::error::BingoError;
use crate::types::PlayerName;

/// Send `text` to the channel of every listed peer concurrently
///
/// Failed sends are logged and returned; they never abort the others.
pub(crate) async fn broadcast_text(
    namespace: &ChannelNamespace,
    peers: &[PlayerName],
    text: &str,
) -> Vec<(PlayerName, BingoError)> {
    let sends = peers.iter().map(|peer| async move {
        let channel = namespace.channel(&ChannelName::for_player(peer));
        (peer, channel.send(text).await)
    });

    futures::future::join_all(sends)
        .await
        .into_iter()
        .filter_map(|(peer, result)| match result {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Failed to send '{}' to {}: {}", text, peer, e);
                Some((peer.clone(), e))
            }
        })
        .collect()
}
