//! Spool-directory mailbox shared between processes
//!
//! Each queued message is one file `<stamp>-<pid>.msg` inside the channel
//! directory. Writers create a hidden temp file and rename it into place, so
//! readers never observe a partial message. Readers claim the oldest message
//! by renaming it to a hidden name before reading, so one message is handed
//! to at most one reader.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

use crate::channel::stats::StatsTracker;
use crate::channel::ChannelName;
use crate::error::{BingoError, Result};

const MESSAGE_EXT: &str = "msg";

/// Last stamp handed out by this process; keeps per-sender order strict even
/// when the wall clock stalls or steps back
static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

fn next_stamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut prev = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_STAMP.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

fn hidden_file_name(kind: &str) -> String {
    let id = bs58::encode(uuid::Uuid::new_v4().as_bytes()).into_string();
    format!(".{}.{}", id, kind)
}

/// Handle to a named channel
///
/// Handles are cheap to clone. All handles with the same name address the
/// same spool directory; destroying through one handle invalidates the others.
#[derive(Debug, Clone)]
pub struct Channel {
    name: ChannelName,
    dir: PathBuf,
    capacity: usize,
    poll_interval: Duration,
    stats: StatsTracker,
}

impl Channel {
    pub(crate) fn new(
        name: ChannelName,
        dir: PathBuf,
        capacity: usize,
        poll_interval: Duration,
        stats: StatsTracker,
    ) -> Self {
        Self {
            name,
            dir,
            capacity,
            poll_interval,
            stats,
        }
    }

    /// Channel name
    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    /// Spool directory of this channel
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Create the spool directory if it does not exist yet
    pub async fn ensure(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Queued message files, oldest first
    async fn pending(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut messages = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !file_name.starts_with('.') && file_name.ends_with(MESSAGE_EXT) {
                messages.push(entry.path());
            }
        }
        messages.sort();
        Ok(messages)
    }

    /// Number of messages waiting for a reader
    pub async fn len(&self) -> Result<usize> {
        Ok(self.pending().await?.len())
    }

    /// True when no message is waiting
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Queue a message without waiting for a reader
    ///
    /// The channel is created if needed, so messages sent before the reader
    /// opens it are kept. Fails with `Busy` when `capacity` messages are
    /// already queued. The capacity check and the write are not atomic across
    /// processes, so concurrent senders may overshoot it slightly.
    pub async fn send(&self, text: &str) -> Result<()> {
        self.ensure().await?;
        if self.pending().await?.len() >= self.capacity {
            return Err(BingoError::Busy(self.name.to_string()));
        }

        let tmp = self.dir.join(hidden_file_name("tmp"));
        tokio::fs::write(&tmp, text.as_bytes()).await?;

        let target = self.dir.join(format!(
            "{:020}-{}.{}",
            next_stamp(),
            std::process::id(),
            MESSAGE_EXT
        ));
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        self.stats.add_sent(text.len());
        tracing::debug!("{} <- '{}'", self.name, text);
        Ok(())
    }

    /// Take the oldest queued message, if any
    pub async fn try_receive(&self) -> Result<Option<String>> {
        for message in self.pending().await? {
            let claimed = self.dir.join(hidden_file_name("claim"));
            match tokio::fs::rename(&message, &claimed).await {
                Ok(()) => {}
                // Another reader took it first
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }

            let text = tokio::fs::read_to_string(&claimed).await;
            let _ = tokio::fs::remove_file(&claimed).await;
            let text = text?;

            self.stats.add_received(text.len());
            tracing::debug!("{} -> '{}'", self.name, text);
            return Ok(Some(text));
        }
        Ok(None)
    }

    /// Wait for the next message for at most `timeout`
    ///
    /// Messages are delivered in send order. Fails with `Timeout` when
    /// nothing arrives in time, and with `Io` when the channel was destroyed.
    pub async fn receive(&self, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(text) = self.try_receive().await? {
                return Ok(text);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(BingoError::Timeout(self.name.to_string()));
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Discard queued messages, returning how many were dropped
    pub async fn purge(&self) -> Result<usize> {
        let mut dropped = 0;
        for message in self.pending().await? {
            match tokio::fs::remove_file(&message).await {
                Ok(()) => dropped += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if dropped > 0 {
            tracing::debug!("{} purged {} stale message(s)", self.name, dropped);
        }
        Ok(dropped)
    }

    /// Remove the channel and everything queued on it
    ///
    /// Destroying a channel that does not exist is not an error.
    pub async fn destroy(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                tracing::debug!("{} destroyed", self.name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
