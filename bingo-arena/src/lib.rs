//! # bingo-arena
//!
//! Serverless coordination layer for multi-process bingo rounds.
//!
//! ## Overview
//!
//! One process creates a round, others join it, and every participant
//! observes roster changes, the win, or an abort. There is no central server:
//! a round record on disk is the source of truth for who plays and whether
//! the round is over, and named spool-directory channels carry notices
//! between processes.
//!
//! ## Key Features
//!
//! - File-backed round records with a plain line-oriented format
//! - Process-visible mailboxes with FIFO delivery and bounded queues
//! - Background notifier that mirrors the roster and gossips joins to peers
//! - Monotonic won/aborted flags shared with the foreground game loop
//! - Row, column and diagonal win detection
//!
//! ## Example
//!
//! ```rust,no_run
//! use bingo_arena::{Arena, ArenaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let arena = Arena::new(ArenaConfig::default());
//!     let round = arena.join_round("friday.round").player("bob")?.await?;
//!
//!     println!("Roster: {:?}", round.roster());
//!     round.report_win().await?;
//!     round.shutdown().await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod board;
pub mod channel;
pub mod config;
pub mod error;
pub mod name_generator;
mod round;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use board::Board;
pub use channel::{Channel, ChannelName, ChannelNamespace, ChannelStats, Notice};
pub use config::{ArenaConfig, RoundConfig};
pub use error::{BingoError, Result};
pub use round::builder::{Arena, RoundBuilder};
pub use round::coordinator::Coordinator;
pub use round::notifier::Notifier;
pub use round::state::{GameSnapshot, LocalGameState};
pub use store::{FileRoundStore, FinishReason, MemoryRoundStore, RoundRecord, RoundStore};
pub use types::{PlayerName, RoundEvent, RoundPhase};
