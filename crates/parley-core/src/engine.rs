//! Connectivity-aware message synchronization engine
//!
//! The engine is the single source of truth for the client's message
//! list. It composes a [`RemoteFeed`], a [`CacheStore`], and a
//! [`ConnectivityMonitor`] and owns the online/offline policy:
//!
//! - Online: subscribe to the remote feed and mirror every snapshot into
//!   the cache; sends append remotely and the list updates when the
//!   subscription echoes them back (no optimistic insert).
//! - Offline: serve and extend the cached list; sends append locally and
//!   rewrite the cache.
//! - Offline→Online: the first remote snapshot replaces the list and the
//!   cache wholesale. Offline-queued messages are not resubmitted; this
//!   replace-not-merge reconciliation is a documented limitation.
//!
//! The engine runs as a spawned task. Commands, connectivity
//! transitions, and feed deliveries are serialized by its select loop,
//! so the list needs no locking. Subscription lifetimes are tagged with
//! a generation counter; deliveries from superseded generations are
//! discarded.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::CacheStore;
use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::error::SyncError;
use crate::feed::{FeedUpdate, RemoteFeed};
use crate::models::{Author, Draft, Message, MessageList};

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created but not yet started
    Uninitialized,
    /// Mirroring the remote feed
    SyncingOnline,
    /// Serving the local cache
    SyncingOffline,
    /// Terminated; no further events
    Stopped,
}

/// Commands accepted by the engine task
#[derive(Debug)]
pub enum EngineCommand {
    Send(Draft),
    Delete(Uuid),
    Stop,
}

/// Events emitted by the engine
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The message list changed; carries the full current list
    ListChanged(Vec<Message>),
    /// The engine moved to a new lifecycle state
    StateChanged(EngineState),
    /// A recoverable error occurred; the engine keeps running
    Error(SyncError),
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Which feed to read (conversation key)
    pub channel: String,
    /// Identity stamped onto outgoing messages
    pub author: Author,
}

impl EngineConfig {
    pub fn new(channel: impl Into<String>, author: Author) -> Self {
        Self {
            channel: channel.into(),
            author,
        }
    }
}

/// Handle to a running engine
///
/// Dropping the handle stops the engine.
pub struct EngineHandle {
    /// Send commands to the engine task
    pub command_tx: mpsc::Sender<EngineCommand>,
    /// Receive events from the engine task
    pub event_rx: mpsc::Receiver<SyncEvent>,
    /// Watch the engine lifecycle state
    pub state_rx: watch::Receiver<EngineState>,
}

impl EngineHandle {
    /// Send a message following the online/offline policy
    ///
    /// Empty drafts are rejected before anything is stamped or queued.
    pub async fn send(&self, draft: Draft) -> Result<()> {
        if draft.is_empty() {
            anyhow::bail!("cannot send an empty message");
        }
        self.command_tx
            .send(EngineCommand::Send(draft))
            .await
            .map_err(|_| anyhow::anyhow!("sync engine is stopped"))
    }

    /// Delete a message; after completion the id is absent from the list
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.command_tx
            .send(EngineCommand::Delete(id))
            .await
            .map_err(|_| anyhow::anyhow!("sync engine is stopped"))
    }

    /// Stop the engine; safe to call any number of times
    pub async fn stop(&self) {
        let _ = self.command_tx.send(EngineCommand::Stop).await;
    }

    /// The current lifecycle state
    pub fn state(&self) -> EngineState {
        *self.state_rx.borrow()
    }

    /// Receive the next event; `None` once the engine has stopped
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.event_rx.recv().await
    }
}

/// Start the engine for the given conversation
///
/// Per the monitor's current state this either subscribes to the remote
/// feed or loads the cached snapshot. A cache failure at startup
/// degrades to an empty list; it never prevents the start.
pub fn start<F, C>(
    config: EngineConfig,
    feed: Arc<F>,
    cache: Arc<C>,
    connectivity: &ConnectivityMonitor,
) -> EngineHandle
where
    F: RemoteFeed,
    C: CacheStore + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(64);
    let (state_tx, state_rx) = watch::channel(EngineState::Uninitialized);
    let (feed_tx, feed_rx) = mpsc::channel(16);

    let task = EngineTask {
        config,
        feed,
        cache,
        conn_rx: connectivity.watch(),
        conn_closed: false,
        command_rx,
        event_tx,
        state_tx,
        feed_tx,
        feed_rx,
        list: MessageList::new(),
        state: EngineState::Uninitialized,
        generation: 0,
        forwarder: None,
    };

    tokio::spawn(task.run());

    EngineHandle {
        command_tx,
        event_rx,
        state_rx,
    }
}

struct EngineTask<F, C> {
    config: EngineConfig,
    feed: Arc<F>,
    cache: Arc<C>,
    conn_rx: watch::Receiver<ConnectivityState>,
    conn_closed: bool,
    command_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<SyncEvent>,
    state_tx: watch::Sender<EngineState>,
    /// Shared inbox for generation-tagged subscription deliveries
    feed_tx: mpsc::Sender<(u64, FeedUpdate)>,
    feed_rx: mpsc::Receiver<(u64, FeedUpdate)>,
    list: MessageList,
    state: EngineState,
    generation: u64,
    forwarder: Option<JoinHandle<()>>,
}

impl<F, C> EngineTask<F, C>
where
    F: RemoteFeed,
    C: CacheStore + 'static,
{
    async fn run(mut self) {
        let initial = *self.conn_rx.borrow();
        self.start_in(initial).await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(EngineCommand::Send(draft)) => self.handle_send(draft).await,
                        Some(EngineCommand::Delete(id)) => self.handle_delete(id).await,
                        Some(EngineCommand::Stop) | None => break,
                    }
                }
                changed = self.conn_rx.changed(), if !self.conn_closed => {
                    match changed {
                        Ok(()) => {
                            let state = *self.conn_rx.borrow_and_update();
                            self.on_connectivity_change(state).await;
                        }
                        // Monitor dropped; keep running in the current mode
                        Err(_) => self.conn_closed = true,
                    }
                }
                Some((generation, update)) = self.feed_rx.recv() => {
                    self.on_feed_update(generation, update).await;
                }
            }
        }

        self.cancel_subscription();
        self.set_state(EngineState::Stopped).await;
        debug!("sync engine stopped");
    }

    async fn start_in(&mut self, connectivity: ConnectivityState) {
        match connectivity {
            ConnectivityState::Online => {
                info!(channel = %self.config.channel, "starting in online mode");
                self.go_online().await;
            }
            ConnectivityState::Offline => {
                info!(channel = %self.config.channel, "starting in offline mode");
                self.set_state(EngineState::SyncingOffline).await;
                let cached = match self.cache.load() {
                    Ok(messages) => messages,
                    Err(e) => {
                        warn!(error = %e, "cache unavailable at startup, starting empty");
                        self.notify(SyncError::CachePersistenceFailed(e.to_string()))
                            .await;
                        Vec::new()
                    }
                };
                self.list.replace(cached);
                self.emit_list().await;
            }
        }
    }

    async fn handle_send(&mut self, draft: Draft) {
        let message = draft.into_message(self.config.author.clone());

        match self.state {
            EngineState::SyncingOnline => {
                match self.feed.append(&self.config.channel, &message).await {
                    // The list updates when the subscription echoes the
                    // append; remote stays the single source of truth.
                    Ok(()) => debug!(id = %message.id, "message appended to remote feed"),
                    Err(e) if e.is_transient() => {
                        warn!(error = %e, "append failed in flight, keeping message locally");
                        let notice = SyncError::ConnectivityTransient(e.to_string());
                        self.append_local(message).await;
                        self.notify(notice).await;
                    }
                    Err(e) => {
                        warn!(error = %e, "remote feed rejected append");
                        self.notify(SyncError::RemoteOperationFailed(e.to_string()))
                            .await;
                    }
                }
            }
            _ => self.append_local(message).await,
        }
    }

    async fn handle_delete(&mut self, id: Uuid) {
        match self.state {
            EngineState::SyncingOnline => {
                match self.feed.delete(&self.config.channel, id).await {
                    Ok(()) => {
                        debug!(%id, "message deleted from remote feed");
                        self.remove_local(id).await;
                    }
                    Err(e) if e.is_transient() => {
                        warn!(error = %e, "delete failed in flight, removing locally");
                        self.remove_local(id).await;
                        self.notify(SyncError::ConnectivityTransient(e.to_string()))
                            .await;
                    }
                    Err(e) => {
                        warn!(error = %e, "remote feed rejected delete");
                        self.notify(SyncError::RemoteOperationFailed(e.to_string()))
                            .await;
                    }
                }
            }
            _ => self.remove_local(id).await,
        }
    }

    async fn on_connectivity_change(&mut self, connectivity: ConnectivityState) {
        match connectivity {
            ConnectivityState::Online if self.state != EngineState::SyncingOnline => {
                info!("connectivity restored, switching to online sync");
                self.go_online().await;
            }
            ConnectivityState::Offline if self.state != EngineState::SyncingOffline => {
                info!("connectivity lost, switching to offline mode");
                self.cancel_subscription();
                // Supersede deliveries still in flight from the old
                // subscription; the retained list must not be clobbered.
                self.generation += 1;
                self.set_state(EngineState::SyncingOffline).await;
            }
            _ => {}
        }
    }

    async fn on_feed_update(&mut self, generation: u64, update: FeedUpdate) {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding delivery from superseded subscription"
            );
            return;
        }

        match update {
            FeedUpdate::Snapshot(messages) => {
                debug!(count = messages.len(), "applying remote snapshot");
                self.list.replace(messages);
                self.persist_cache().await;
                self.emit_list().await;
            }
            FeedUpdate::Lost(reason) => {
                warn!(%reason, "live subscription lost, attempting one resubscription");
                if let Err(e) = self.open_subscription().await {
                    warn!(error = %e, "resubscription failed, staying on cached list");
                    self.notify(SyncError::SubscriptionError(format!(
                        "{}; resubscribe failed: {}",
                        reason, e
                    )))
                    .await;
                }
            }
        }
    }

    async fn go_online(&mut self) {
        self.set_state(EngineState::SyncingOnline).await;
        if let Err(e) = self.open_subscription().await {
            warn!(error = %e, "failed to subscribe to remote feed");
            self.notify(SyncError::SubscriptionError(e.to_string())).await;
        }
    }

    /// Tear down any current subscription and open a new one under a
    /// fresh generation
    async fn open_subscription(&mut self) -> Result<(), crate::error::FeedError> {
        self.cancel_subscription();
        self.generation += 1;
        let generation = self.generation;

        let mut subscription = self.feed.subscribe(&self.config.channel).await?;
        let feed_tx = self.feed_tx.clone();
        self.forwarder = Some(tokio::spawn(async move {
            while let Some(update) = subscription.recv().await {
                if feed_tx.send((generation, update)).await.is_err() {
                    break;
                }
            }
        }));

        debug!(generation, "feed subscription established");
        Ok(())
    }

    fn cancel_subscription(&mut self) {
        if let Some(task) = self.forwarder.take() {
            // Aborting the forwarder drops the subscription handle,
            // which cancels delivery on the feed side.
            task.abort();
        }
    }

    async fn append_local(&mut self, message: Message) {
        if self.list.insert(message) {
            self.persist_cache().await;
            self.emit_list().await;
        }
    }

    async fn remove_local(&mut self, id: Uuid) {
        if self.list.remove(&id) {
            self.persist_cache().await;
            self.emit_list().await;
        }
    }

    async fn persist_cache(&mut self) {
        if let Err(e) = self.cache.save(self.list.messages()) {
            warn!(error = %e, "failed to persist message cache");
            self.notify(SyncError::CachePersistenceFailed(e.to_string()))
                .await;
        }
    }

    async fn emit_list(&mut self) {
        let _ = self
            .event_tx
            .send(SyncEvent::ListChanged(self.list.to_vec()))
            .await;
    }

    async fn notify(&mut self, error: SyncError) {
        let _ = self.event_tx.send(SyncEvent::Error(error)).await;
    }

    async fn set_state(&mut self, state: EngineState) {
        if self.state == state {
            return;
        }
        self.state = state;
        let _ = self.state_tx.send(state);
        let _ = self.event_tx.send(SyncEvent::StateChanged(state)).await;
    }
}
