//! Parley Core Library
//!
//! This crate provides the core functionality for Parley, a chat client
//! built around a connectivity-aware message synchronization engine: the
//! policy that keeps a local message list consistent with a remote
//! append-only feed under intermittent connectivity.
//!
//! # Architecture
//!
//! - **Sync Engine**: single source of truth for the message list; picks
//!   the online or offline strategy from the connectivity monitor and
//!   reconciles on transitions (the first remote snapshot after a
//!   reconnect replaces local state wholesale).
//! - **Remote Feed**: live, ordered, subscribable message store with
//!   full-snapshot delivery (WebSocket adapter included).
//! - **Cache Store**: durable snapshot of the last known list, written
//!   atomically, read back when starting offline.
//! - **Connectivity Monitor**: injected observable connectivity source.
//!
//! # Quick Start
//!
//! ```text
//! let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
//! let feed = Arc::new(WsFeed::new("ws://localhost:4040"));
//! let cache = Arc::new(FileCacheStore::new(config.cache_path()));
//!
//! let mut engine = engine::start(
//!     EngineConfig::new("messages", author),
//!     feed,
//!     cache,
//!     &monitor,
//! );
//!
//! engine.send(Draft::text("hello")).await?;
//! while let Some(event) = engine.next_event().await { /* ... */ }
//! ```
//!
//! # Modules
//!
//! - `engine`: the sync engine (main entry point)
//! - `feed`: remote feed trait and adapters
//! - `cache`: local snapshot persistence
//! - `connectivity`: connectivity monitoring
//! - `models`: messages, drafts, and the ordered list
//! - `config`: application configuration
//! - `error`: error taxonomy

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod feed;
pub mod models;

pub use cache::{CacheStore, FileCacheStore};
pub use config::Config;
pub use connectivity::{ConnectivityMonitor, ConnectivityState};
pub use engine::{EngineConfig, EngineHandle, EngineState, SyncEvent};
pub use error::{CacheError, FeedError, SyncError};
pub use feed::{FeedSubscription, FeedUpdate, InMemoryFeed, RemoteFeed, WsFeed};
pub use models::{Author, Coordinates, Draft, Message, MessageList};
