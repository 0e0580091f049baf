//! WebSocket feed adapter
//!
//! Talks to a feed server speaking the JSON frame protocol in
//! [`super::wire`]. Subscriptions hold a long-lived socket whose frames
//! are pumped into the subscription channel by a spawned reader task;
//! append and delete use a short-lived request/ack exchange.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};
use uuid::Uuid;

use super::wire::{AckStatus, ClientFrame, ServerFrame};
use super::{FeedSubscription, FeedUpdate, RemoteFeed};
use crate::error::FeedError;
use crate::models::Message;

/// Default deadline for a request/ack exchange
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket-backed remote feed
pub struct WsFeed {
    url: String,
    request_timeout: Duration,
}

impl WsFeed {
    /// Create a feed client for the given server URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Override the request/ack deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The configured server URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open a connection, send one frame, and wait for its ack
    async fn request(&self, frame: ClientFrame) -> Result<(), FeedError> {
        let (ws, _) = connect_async(&self.url)
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        let (mut write, mut read) = ws.split();

        write
            .send(WsMessage::Text(frame.encode()?))
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let ack = tokio::time::timeout(self.request_timeout, async {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => match ServerFrame::decode(&text)? {
                        ServerFrame::Ack { status, detail } => return Ok((status, detail)),
                        ServerFrame::Error { message } => {
                            return Err(FeedError::Rejected(message));
                        }
                        // Snapshots on a request connection are not expected
                        ServerFrame::Snapshot { .. } => {}
                    },
                    Ok(WsMessage::Close(_)) => break,
                    Err(e) => return Err(FeedError::Unavailable(e.to_string())),
                    _ => {}
                }
            }
            Err(FeedError::Unavailable(
                "connection closed before acknowledgement".to_string(),
            ))
        })
        .await
        .map_err(|_| FeedError::Unavailable("timed out waiting for acknowledgement".to_string()))??;

        write.close().await.ok();

        match ack {
            (AckStatus::Ok, _) => Ok(()),
            (AckStatus::Error, detail) => Err(FeedError::Rejected(
                detail.unwrap_or_else(|| "request rejected".to_string()),
            )),
        }
    }
}

#[async_trait]
impl RemoteFeed for WsFeed {
    async fn subscribe(&self, channel: &str) -> Result<FeedSubscription, FeedError> {
        let (ws, _) = connect_async(&self.url)
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        let (mut write, mut read) = ws.split();

        let frame = ClientFrame::Subscribe {
            channel: channel.to_string(),
        };
        write
            .send(WsMessage::Text(frame.encode()?))
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        debug!(url = %self.url, channel, "feed subscription opened");

        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(async move {
            // The write half stays alive with the task so the server
            // keeps the subscription open.
            let _write = write;

            while let Some(msg) = read.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => match ServerFrame::decode(&text) {
                        Ok(ServerFrame::Snapshot { messages, .. }) => {
                            if tx.send(FeedUpdate::Snapshot(messages)).await.is_err() {
                                break;
                            }
                        }
                        Ok(ServerFrame::Error { message }) => {
                            warn!(%message, "feed subscription terminated by server");
                            let _ = tx.send(FeedUpdate::Lost(message)).await;
                            break;
                        }
                        Ok(ServerFrame::Ack { .. }) => {}
                        Err(e) => {
                            debug!(error = %e, "ignoring malformed feed frame");
                        }
                    },
                    Ok(WsMessage::Close(_)) => {
                        let _ = tx
                            .send(FeedUpdate::Lost("connection closed".to_string()))
                            .await;
                        break;
                    }
                    Err(e) => {
                        let _ = tx.send(FeedUpdate::Lost(e.to_string())).await;
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(FeedSubscription::with_task(rx, task))
    }

    async fn append(&self, channel: &str, message: &Message) -> Result<(), FeedError> {
        self.request(ClientFrame::Append {
            channel: channel.to_string(),
            message: message.clone(),
        })
        .await
    }

    async fn delete(&self, channel: &str, id: Uuid) -> Result<(), FeedError> {
        self.request(ClientFrame::Delete {
            channel: channel.to_string(),
            message_id: id,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_feed_new() {
        let feed = WsFeed::new("ws://localhost:4040");
        assert_eq!(feed.url(), "ws://localhost:4040");
        assert_eq!(feed.request_timeout, REQUEST_TIMEOUT);
    }

    #[test]
    fn test_with_request_timeout() {
        let feed = WsFeed::new("ws://localhost:4040")
            .with_request_timeout(Duration::from_millis(250));
        assert_eq!(feed.request_timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        // Nothing listens on this port
        let feed = WsFeed::new("ws://127.0.0.1:1").with_request_timeout(Duration::from_millis(250));
        let err = feed.subscribe("messages").await.unwrap_err();
        assert!(err.is_transient());
    }
}
