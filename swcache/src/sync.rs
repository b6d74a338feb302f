//! Background sync and client notification.
//!
//! [`SyncBridge`] reacts to a sync trigger by running the application's
//! [`Resync`] routine and broadcasting `DATA_SYNCED` to every client.
//! [`SyncManager`] plays the host's part: it remembers registered tags and
//! fires them in the background once connectivity is back.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashSet;
use smol_str::SmolStr;
use swcache_core::Notification;
use tracing::{debug, error, info, instrument};

use crate::clients::ClientRegistry;
use crate::metrics;
use crate::offload::{OffloadManager, TaskKey};

/// Error returned by a resync routine.
pub type ResyncError = Box<dyn std::error::Error + Send + Sync>;

/// Application routine that brings local data back in line with the server.
#[async_trait]
pub trait Resync: Send + Sync {
    /// Runs one resync.
    async fn resync(&self) -> Result<(), ResyncError>;
}

/// Resync routine that does nothing and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResync;

#[async_trait]
impl Resync for NoopResync {
    async fn resync(&self) -> Result<(), ResyncError> {
        Ok(())
    }
}

/// Adapts an async closure into a [`Resync`].
///
/// ```
/// use swcache::sync::{FnResync, ResyncError};
///
/// let resync = FnResync::new(|| async { Ok::<(), ResyncError>(()) });
/// # let _ = resync;
/// ```
pub struct FnResync<F> {
    f: F,
}

impl<F> FnResync<F> {
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Resync for FnResync<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ResyncError>> + Send,
{
    async fn resync(&self) -> Result<(), ResyncError> {
        (self.f)().await
    }
}

/// What a sync trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The tag is not handled by this worker.
    Ignored,
    /// Resync succeeded and `DATA_SYNCED` reached `notified` clients.
    Synced {
        /// Number of clients the notification was delivered to.
        notified: usize,
    },
    /// Resync failed. Logged, nothing broadcast.
    Failed,
}

/// Runs the resync routine on the configured tag and notifies clients.
pub struct SyncBridge {
    tag: SmolStr,
    resync: Arc<dyn Resync>,
    clients: ClientRegistry,
}

impl std::fmt::Debug for SyncBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBridge")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl SyncBridge {
    /// Creates a bridge reacting to `tag`.
    pub fn new(tag: impl Into<SmolStr>, resync: Arc<dyn Resync>, clients: ClientRegistry) -> Self {
        Self {
            tag: tag.into(),
            resync,
            clients,
        }
    }

    /// The handled tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Handles a sync trigger. Never fails: resync errors are logged.
    #[instrument(skip(self))]
    pub async fn on_sync(&self, tag: &str) -> SyncOutcome {
        if self.tag.as_str() != tag {
            debug!("ignoring sync tag");
            metrics::record_sync("ignored");
            return SyncOutcome::Ignored;
        }
        match self.resync.resync().await {
            Ok(()) => {
                let notified = self.clients.broadcast(&Notification::data_synced());
                info!(notified, "data synced");
                metrics::record_sync("synced");
                SyncOutcome::Synced { notified }
            }
            Err(error) => {
                error!(%error, "resync failed");
                metrics::record_sync("failed");
                SyncOutcome::Failed
            }
        }
    }
}

/// Deferred sync trigger.
///
/// Tags registered while offline are fired once, in the background, when
/// [`connectivity_restored`](Self::connectivity_restored) is called. A tag whose
/// resync fails is registered again for the next reconnect.
#[derive(Debug, Clone)]
pub struct SyncManager {
    bridge: Arc<SyncBridge>,
    pending: Arc<DashSet<SmolStr>>,
    offload: OffloadManager,
}

impl SyncManager {
    /// Creates a manager firing tags through `bridge` on `offload`.
    pub fn new(bridge: Arc<SyncBridge>, offload: OffloadManager) -> Self {
        Self {
            bridge,
            pending: Arc::new(DashSet::new()),
            offload,
        }
    }

    /// The bridge tags are fired through.
    pub fn bridge(&self) -> &Arc<SyncBridge> {
        &self.bridge
    }

    /// Records a tag to fire on the next reconnect. Registering twice is a no-op.
    pub fn register(&self, tag: impl Into<SmolStr>) {
        let tag = tag.into();
        if self.pending.insert(tag.clone()) {
            debug!(%tag, "sync registered");
        }
    }

    /// Tags waiting for connectivity.
    pub fn pending(&self) -> Vec<SmolStr> {
        let mut tags: Vec<SmolStr> = self.pending.iter().map(|t| t.clone()).collect();
        tags.sort();
        tags
    }

    /// Fires every pending tag as a background task. Returns how many were spawned.
    ///
    /// A tag whose previous run is still in flight is skipped and stays pending.
    pub fn connectivity_restored(&self) -> usize {
        let mut spawned = 0;
        for tag in self.pending() {
            let bridge = self.bridge.clone();
            let pending = self.pending.clone();
            let retry_tag = tag.clone();
            // Removed before spawning so a failure can put it back.
            self.pending.remove(&tag);
            let started = self.offload.spawn_with_key(TaskKey::sync(tag.clone()), async move {
                if bridge.on_sync(&retry_tag).await == SyncOutcome::Failed {
                    pending.insert(retry_tag);
                }
            });
            if started {
                spawned += 1;
            } else {
                self.pending.insert(tag);
            }
        }
        spawned
    }

    /// Waits for every background sync to finish.
    pub async fn wait_idle(&self) {
        self.offload.wait_all().await;
    }
}
