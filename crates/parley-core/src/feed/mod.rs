//! Remote message feed
//!
//! Abstraction over a live, ordered, subscribable message store.
//! A subscription delivers the full current list on every change
//! (full-snapshot semantics, not deltas), newest first, until cancelled.
//!
//! Implementations:
//! - [`WsFeed`]: WebSocket transport speaking a JSON frame protocol
//! - [`InMemoryFeed`]: in-process feed for tests and simulations

mod memory;
mod wire;
mod ws;

pub use memory::InMemoryFeed;
pub use wire::{AckStatus, ClientFrame, ServerFrame};
pub use ws::WsFeed;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::FeedError;
use crate::models::Message;

/// A delivery from a live subscription
#[derive(Debug, Clone)]
pub enum FeedUpdate {
    /// The full current list, newest first
    Snapshot(Vec<Message>),
    /// The subscription terminated unexpectedly and will deliver nothing
    /// further
    Lost(String),
}

/// Contract the sync engine requires from a remote feed
#[async_trait]
pub trait RemoteFeed: Send + Sync + 'static {
    /// Open a live subscription to the given conversation channel
    async fn subscribe(&self, channel: &str) -> Result<FeedSubscription, FeedError>;

    /// Durably append one message; success means it will appear in
    /// subsequent snapshots
    async fn append(&self, channel: &str, message: &Message) -> Result<(), FeedError>;

    /// Durably delete a message by id
    async fn delete(&self, channel: &str, id: Uuid) -> Result<(), FeedError>;
}

/// Handle to a live subscription
///
/// Dropping the handle cancels the subscription; no further updates are
/// delivered after [`FeedSubscription::cancel`] returns.
#[derive(Debug)]
pub struct FeedSubscription {
    updates: mpsc::Receiver<FeedUpdate>,
    task: Option<JoinHandle<()>>,
}

impl FeedSubscription {
    /// A subscription fed directly through a channel
    pub fn new(updates: mpsc::Receiver<FeedUpdate>) -> Self {
        Self {
            updates,
            task: None,
        }
    }

    /// A subscription backed by a reader task, aborted on cancel
    pub fn with_task(updates: mpsc::Receiver<FeedUpdate>, task: JoinHandle<()>) -> Self {
        Self {
            updates,
            task: Some(task),
        }
    }

    /// Receive the next update; `None` once the subscription has ended
    pub async fn recv(&mut self) -> Option<FeedUpdate> {
        self.updates.recv().await
    }

    /// Cancel the subscription
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.updates.close();
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
