//! Engine session wiring
//!
//! Shared by the commands that run the sync engine (send, delete,
//! watch): resolves the local author identity, derives the connectivity
//! state from configuration and flags, and starts the engine against
//! the WebSocket feed and the file cache.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;
use uuid::Uuid;

use parley_core::{
    engine, Author, Config, ConnectivityMonitor, ConnectivityState, EngineConfig, EngineHandle,
    FileCacheStore, Message, SyncError, SyncEvent, WsFeed,
};

/// How long commands wait on the engine before giving up
pub const WAIT: Duration = Duration::from_secs(10);

/// Stand-in URL when no feed is configured; such sessions run offline
/// and never dial it
const PLACEHOLDER_FEED_URL: &str = "ws://localhost:4040";

/// A running engine plus the identity and monitor it was started with
pub struct Session {
    pub handle: EngineHandle,
    pub author: Author,
    pub monitor: ConnectivityMonitor,
}

/// Derive the connectivity state from configuration and the --offline flag
pub fn connectivity(config: &Config, offline: bool) -> ConnectivityState {
    if offline || config.feed_url.is_none() {
        ConnectivityState::Offline
    } else {
        ConnectivityState::Online
    }
}

/// Start the engine against the configured feed and cache
pub fn start(config: &mut Config, offline: bool) -> Result<Session> {
    let author = resolve_author(config)?;
    let monitor = ConnectivityMonitor::new(connectivity(config, offline));

    let feed_url = config
        .feed_url
        .clone()
        .unwrap_or_else(|| PLACEHOLDER_FEED_URL.to_string());
    let feed = Arc::new(WsFeed::new(feed_url));
    let cache = Arc::new(FileCacheStore::new(config.cache_path()));

    let handle = engine::start(
        EngineConfig::new(config.channel.clone(), author.clone()),
        feed,
        cache,
        &monitor,
    );

    Ok(Session {
        handle,
        author,
        monitor,
    })
}

/// Receive the next engine event, bounded by [`WAIT`]
pub async fn next_event(handle: &mut EngineHandle) -> Result<SyncEvent> {
    match tokio::time::timeout(WAIT, handle.next_event()).await {
        Ok(Some(event)) => Ok(event),
        Ok(None) => anyhow::bail!("The sync engine stopped unexpectedly"),
        Err(_) => anyhow::bail!("Timed out waiting for the feed"),
    }
}

/// Wait for the first list the engine produces
///
/// A failed subscription is fatal here: the command was asked to work
/// against the feed and could not reach it. A cache failure is not; the
/// engine continues with an empty list.
pub async fn initial_list(handle: &mut EngineHandle) -> Result<Vec<Message>> {
    loop {
        match next_event(handle).await? {
            SyncEvent::ListChanged(messages) => return Ok(messages),
            SyncEvent::Error(SyncError::SubscriptionError(reason)) => {
                anyhow::bail!(
                    "Could not subscribe to the feed: {}. Check feed_url or pass --offline.",
                    reason
                );
            }
            SyncEvent::Error(SyncError::CachePersistenceFailed(reason)) => {
                warn!(%reason, "cache unavailable, continuing with an empty list");
            }
            _ => {}
        }
    }
}

/// The local author identity; generates and saves a stable id on first use
fn resolve_author(config: &mut Config) -> Result<Author> {
    let id = match config.author_id {
        Some(ref id) => id.clone(),
        None => {
            let id = Uuid::new_v4().to_string();
            config.author_id = Some(id.clone());
            config.save().context("Failed to save configuration")?;
            id
        }
    };

    let name = config
        .author_name
        .clone()
        .unwrap_or_else(|| "anonymous".to_string());

    Ok(Author::new(id, name))
}
