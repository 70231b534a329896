//! Statistics tracking for channel traffic

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Snapshot of channel traffic for one process
#[derive(Debug, Clone)]
pub struct ChannelStats {
    /// Messages successfully queued on any channel
    pub messages_sent: u64,
    /// Messages taken from any channel
    pub messages_received: u64,
    /// Payload bytes sent
    pub bytes_sent: u64,
    /// Payload bytes received
    pub bytes_received: u64,
    /// Timestamp when stats collection started
    pub start_time: Instant,
    /// Sent messages per second
    pub send_rate: f64,
    /// Received messages per second
    pub receive_rate: f64,
}

impl ChannelStats {
    /// Create a new ChannelStats instance with zero counters
    pub fn new() -> Self {
        Self {
            messages_sent: 0,
            messages_received: 0,
            bytes_sent: 0,
            bytes_received: 0,
            start_time: Instant::now(),
            send_rate: 0.0,
            receive_rate: 0.0,
        }
    }

    /// Update rates based on elapsed time
    pub fn update_rates(&mut self) {
        let elapsed_secs = self.start_time.elapsed().as_secs_f64();
        if elapsed_secs > 0.0 {
            self.send_rate = self.messages_sent as f64 / elapsed_secs;
            self.receive_rate = self.messages_received as f64 / elapsed_secs;
        }
    }
}

impl Default for ChannelStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChannelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sent: {} msg ({} bytes, {:.2} msg/s), Received: {} msg ({} bytes, {:.2} msg/s)",
            self.messages_sent,
            self.bytes_sent,
            self.send_rate,
            self.messages_received,
            self.bytes_received,
            self.receive_rate
        )
    }
}

/// Thread-safe traffic counters shared by every channel of a namespace
///
/// Uses atomic operations for lock-free concurrent updates
#[derive(Debug, Clone)]
pub struct StatsTracker {
    messages_sent: Arc<AtomicU64>,
    messages_received: Arc<AtomicU64>,
    bytes_sent: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    start_time: Instant,
}

impl StatsTracker {
    /// Create a new StatsTracker
    pub fn new() -> Self {
        Self {
            messages_sent: Arc::new(AtomicU64::new(0)),
            messages_received: Arc::new(AtomicU64::new(0)),
            bytes_sent: Arc::new(AtomicU64::new(0)),
            bytes_received: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Count one sent message
    pub fn add_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Count one received message
    pub fn add_received(&self, bytes: usize) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn get_stats(&self) -> ChannelStats {
        let mut stats = ChannelStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            start_time: self.start_time,
            send_rate: 0.0,
            receive_rate: 0.0,
        };
        stats.update_rates();
        stats
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
