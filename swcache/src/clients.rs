//! Registry of connected clients (open pages).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use swcache_core::{ClientMessage, Notification};
use tokio::sync::mpsc;
use tracing::debug;

use crate::lifecycle::WorkerId;

/// Identifier of a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Returns the raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Snapshot of a connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client id.
    pub id: ClientId,
    /// URL of the page.
    pub url: String,
    /// Worker generation controlling the page, if any.
    pub controller: Option<WorkerId>,
}

#[derive(Debug)]
struct ClientSlot {
    url: String,
    controller: Option<WorkerId>,
    sender: mpsc::UnboundedSender<ClientMessage>,
}

#[derive(Debug, Default)]
struct ClientRegistryInner {
    clients: DashMap<ClientId, ClientSlot>,
    next_id: AtomicU64,
}

/// Connected clients and their message channels.
///
/// Delivery is best effort: a client whose receiver was dropped is pruned on
/// the next send, nothing is retried and there is no ordering across clients.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<ClientRegistryInner>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a page. Messages for it arrive on the returned receiver.
    pub fn connect(&self, url: impl Into<String>) -> (ClientId, mpsc::UnboundedReceiver<ClientMessage>) {
        let id = ClientId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();
        let url = url.into();
        debug!(client = %id, %url, "client connected");
        self.inner.clients.insert(
            id,
            ClientSlot {
                url,
                controller: None,
                sender,
            },
        );
        (id, receiver)
    }

    /// Removes a client. Returns `false` if it was not connected.
    pub fn disconnect(&self, id: ClientId) -> bool {
        self.inner.clients.remove(&id).is_some()
    }

    /// Makes `worker` the controller of every connected client and tells them.
    ///
    /// Returns the number of clients claimed.
    pub fn claim(&self, worker: WorkerId) -> usize {
        let mut claimed = 0;
        self.inner.clients.retain(|id, slot| {
            slot.controller = Some(worker);
            let alive = slot
                .sender
                .send(ClientMessage::ControllerChanged { worker: worker.get() })
                .is_ok();
            if alive {
                claimed += 1;
            } else {
                debug!(client = %id, "pruning closed client");
            }
            alive
        });
        claimed
    }

    /// Sends a notification to every connected client.
    ///
    /// Returns the number of clients it was delivered to.
    pub fn broadcast(&self, notification: &Notification) -> usize {
        let mut delivered = 0;
        self.inner.clients.retain(|id, slot| {
            let alive = slot
                .sender
                .send(ClientMessage::Notify(notification.clone()))
                .is_ok();
            if alive {
                delivered += 1;
            } else {
                debug!(client = %id, "pruning closed client");
            }
            alive
        });
        delivered
    }

    /// Snapshots every connected client, ordered by id.
    pub fn match_all(&self) -> Vec<ClientInfo> {
        let mut clients: Vec<ClientInfo> = self
            .inner
            .clients
            .iter()
            .map(|entry| ClientInfo {
                id: *entry.key(),
                url: entry.url.clone(),
                controller: entry.controller,
            })
            .collect();
        clients.sort_by_key(|client| client.id);
        clients
    }

    /// Number of connected clients.
    pub fn len(&self) -> usize {
        self.inner.clients.len()
    }

    /// Whether no client is connected.
    pub fn is_empty(&self) -> bool {
        self.inner.clients.is_empty()
    }
}
