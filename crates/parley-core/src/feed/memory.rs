//! In-process feed
//!
//! Holds the canonical message list in memory and broadcasts a full
//! snapshot to every subscriber on each change. Used by tests and
//! connectivity simulations; `set_reachable` and `drop_subscriptions`
//! stand in for a server outage and a dropped subscription.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{FeedSubscription, FeedUpdate, RemoteFeed};
use crate::error::FeedError;
use crate::models::{Message, MessageList};

pub struct InMemoryFeed {
    inner: Mutex<Inner>,
}

struct Inner {
    messages: MessageList,
    subscribers: Vec<mpsc::Sender<FeedUpdate>>,
    reachable: bool,
}

impl InMemoryFeed {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                messages: MessageList::new(),
                subscribers: Vec::new(),
                reachable: true,
            }),
        }
    }

    /// A feed pre-populated with messages
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let feed = Self::new();
        feed.inner.lock().unwrap().messages = MessageList::from_messages(messages);
        feed
    }

    /// Simulate the server becoming (un)reachable; while unreachable,
    /// subscribe/append/delete fail with a transient error
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.lock().unwrap().reachable = reachable;
    }

    /// Simulate the server dropping all live subscriptions
    pub fn drop_subscriptions(&self, reason: &str) {
        let subscribers = {
            let mut inner = self.inner.lock().unwrap();
            std::mem::take(&mut inner.subscribers)
        };
        for tx in subscribers {
            let _ = tx.try_send(FeedUpdate::Lost(reason.to_string()));
        }
    }

    /// Append a message as if another participant had sent it
    pub async fn publish(&self, message: Message) {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            inner.messages.insert(message);
            inner.messages.to_vec()
        };
        self.broadcast(snapshot).await;
    }

    /// The canonical list, newest first
    pub fn messages(&self) -> Vec<Message> {
        self.inner.lock().unwrap().messages.to_vec()
    }

    async fn broadcast(&self, snapshot: Vec<Message>) {
        let subscribers: Vec<_> = {
            let inner = self.inner.lock().unwrap();
            inner.subscribers.clone()
        };

        let mut closed = Vec::new();
        for (idx, tx) in subscribers.iter().enumerate() {
            if tx.send(FeedUpdate::Snapshot(snapshot.clone())).await.is_err() {
                closed.push(idx);
            }
        }

        if !closed.is_empty() {
            let mut inner = self.inner.lock().unwrap();
            inner.subscribers.retain(|tx| !tx.is_closed());
        }
    }

    fn ensure_reachable(&self) -> Result<(), FeedError> {
        if self.inner.lock().unwrap().reachable {
            Ok(())
        } else {
            Err(FeedError::Unavailable("feed unreachable".to_string()))
        }
    }
}

impl Default for InMemoryFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteFeed for InMemoryFeed {
    async fn subscribe(&self, _channel: &str) -> Result<FeedSubscription, FeedError> {
        self.ensure_reachable()?;

        let (tx, rx) = mpsc::channel(16);
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            inner.subscribers.push(tx.clone());
            inner.messages.to_vec()
        };

        // Initial delivery mirrors a live store pushing the current state
        let _ = tx.send(FeedUpdate::Snapshot(snapshot)).await;

        Ok(FeedSubscription::new(rx))
    }

    async fn append(&self, _channel: &str, message: &Message) -> Result<(), FeedError> {
        self.ensure_reachable()?;

        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            inner.messages.insert(message.clone());
            inner.messages.to_vec()
        };
        self.broadcast(snapshot).await;
        Ok(())
    }

    async fn delete(&self, _channel: &str, id: Uuid) -> Result<(), FeedError> {
        self.ensure_reachable()?;

        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.messages.remove(&id) {
                return Ok(());
            }
            inner.messages.to_vec()
        };
        self.broadcast(snapshot).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Draft};

    fn message(text: &str) -> Message {
        Draft::text(text).into_message(Author::new("u1", "Alice"))
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_snapshot() {
        let feed = InMemoryFeed::with_messages(vec![message("hello")]);

        let mut sub = feed.subscribe("messages").await.unwrap();
        match sub.recv().await.unwrap() {
            FeedUpdate::Snapshot(messages) => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].text.as_deref(), Some("hello"));
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_append_broadcasts_to_subscribers() {
        let feed = InMemoryFeed::new();
        let mut sub = feed.subscribe("messages").await.unwrap();

        // Skip the initial empty snapshot
        sub.recv().await.unwrap();

        feed.append("messages", &message("new")).await.unwrap();
        match sub.recv().await.unwrap() {
            FeedUpdate::Snapshot(messages) => assert_eq!(messages.len(), 1),
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_broadcasts_removal() {
        let msg = message("gone soon");
        let id = msg.id;
        let feed = InMemoryFeed::with_messages(vec![msg]);

        let mut sub = feed.subscribe("messages").await.unwrap();
        sub.recv().await.unwrap();

        feed.delete("messages", id).await.unwrap();
        match sub.recv().await.unwrap() {
            FeedUpdate::Snapshot(messages) => assert!(messages.is_empty()),
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_feed_fails_transiently() {
        let feed = InMemoryFeed::new();
        feed.set_reachable(false);

        assert!(feed.subscribe("messages").await.unwrap_err().is_transient());
        assert!(feed
            .append("messages", &message("x"))
            .await
            .unwrap_err()
            .is_transient());

        feed.set_reachable(true);
        assert!(feed.subscribe("messages").await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_subscription_reports_loss() {
        let feed = InMemoryFeed::new();
        let mut sub = feed.subscribe("messages").await.unwrap();
        sub.recv().await.unwrap();

        feed.drop_subscriptions("server restart");
        match sub.recv().await.unwrap() {
            FeedUpdate::Lost(reason) => assert_eq!(reason, "server restart"),
            other => panic!("expected loss, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_subscription_stops_delivery() {
        let feed = InMemoryFeed::new();
        let mut sub = feed.subscribe("messages").await.unwrap();
        sub.recv().await.unwrap();
        sub.cancel();

        feed.append("messages", &message("after cancel"))
            .await
            .unwrap();
        assert!(sub.recv().await.is_none());
    }
}
