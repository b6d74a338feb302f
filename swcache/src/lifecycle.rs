//! Worker lifecycle: install, activate, control messages.
//!
//! ```text
//! parsed ──install──▶ installing ──ok──▶ waiting ──activate──▶ activating ──▶ active
//!                          │
//!                          └──err──▶ redundant
//! ```
//!
//! State changes are published on a [`watch`] channel.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use http::Uri;
use swcache_core::{CacheEntry, ControlMessage, PartitionName, RequestKey, Upstream};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::ClientRegistry;
use crate::config::WorkerConfig;
use crate::error::{ActivateError, ConfigError, InstallError};
use crate::metrics;
use crate::partition::PartitionManager;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of one worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Allocates a fresh, process-unique id.
    pub fn next() -> Self {
        WorkerId(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Lifecycle state of a worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    /// Created, install not started.
    #[default]
    Parsed,
    /// Populating the static partition.
    Installing,
    /// Installed, waiting to take over.
    Waiting,
    /// Cleaning up stale partitions.
    Activating,
    /// In control of its clients.
    Active,
    /// Install failed; this generation will never serve.
    Redundant,
}

impl WorkerState {
    /// Returns the state as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Waiting => "waiting",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Partition that was populated.
    pub partition: PartitionName,
    /// Number of manifest entries stored.
    pub entries: usize,
}

/// Result of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// Stale partitions removed.
    pub deleted: Vec<PartitionName>,
    /// Clients now controlled by this worker.
    pub claimed: usize,
}

/// What a control message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Skip waiting was requested.
    SkipWaiting,
    /// A JSON entry was stored in the data partition.
    Cached(RequestKey),
    /// The message was unknown, malformed or could not be applied.
    Ignored,
}

/// Drives one worker generation through its lifecycle.
pub struct LifecycleController {
    id: WorkerId,
    config: Arc<WorkerConfig>,
    manifest: Vec<Uri>,
    partitions: PartitionManager,
    clients: ClientRegistry,
    state: watch::Sender<WorkerState>,
    skip_waiting: AtomicBool,
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("skip_waiting", &self.skip_waiting.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl LifecycleController {
    /// Creates a controller in the `parsed` state.
    pub fn new(
        config: Arc<WorkerConfig>,
        partitions: PartitionManager,
        clients: ClientRegistry,
    ) -> Result<Self, ConfigError> {
        let manifest = config.manifest()?;
        let (state, _) = watch::channel(WorkerState::Parsed);
        Ok(Self {
            id: WorkerId::next(),
            config,
            manifest,
            partitions,
            clients,
            state,
            skip_waiting: AtomicBool::new(false),
        })
    }

    /// Id of this generation.
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    fn transition(&self, to: WorkerState) {
        let from = self.state.send_replace(to);
        debug!(worker = %self.id, %from, %to, "state change");
    }

    /// Populates the static partition with the precache manifest.
    ///
    /// On success the worker is `waiting` and skip waiting is requested. On
    /// failure it is `redundant` and no partition of the previous generation
    /// has been touched.
    #[instrument(skip_all, fields(worker = %self.id))]
    pub async fn install<U>(&self, upstream: &U) -> Result<InstallReport, InstallError>
    where
        U: Upstream + ?Sized,
    {
        let state = self.state();
        if state != WorkerState::Parsed {
            return Err(InstallError::InvalidState(state));
        }
        self.transition(WorkerState::Installing);

        let partition = &self.config.caches.static_cache;
        match self.partitions.populate(partition, &self.manifest, upstream).await {
            Ok(entries) => {
                info!(%partition, entries, "installed");
                self.transition(WorkerState::Waiting);
                self.skip_waiting();
                Ok(InstallReport {
                    partition: partition.clone(),
                    entries,
                })
            }
            Err(err) => {
                error!(%partition, error = %err, "install failed");
                metrics::record_install_failure();
                self.transition(WorkerState::Redundant);
                Err(err)
            }
        }
    }

    /// Deletes stale partitions, claims every client and becomes `active`.
    ///
    /// Storage failures during cleanup are logged; activation still completes.
    #[instrument(skip_all, fields(worker = %self.id))]
    pub async fn activate(&self) -> Result<ActivationReport, ActivateError> {
        let state = self.state();
        if state != WorkerState::Waiting {
            return Err(ActivateError::InvalidState(state));
        }
        self.transition(WorkerState::Activating);

        let keep = self.config.caches.current();
        let deleted = match self.partitions.delete_all_except(&keep).await {
            Ok(deleted) => deleted,
            Err(error) => {
                warn!(%error, "could not enumerate partitions, skipping cleanup");
                Vec::new()
            }
        };
        let claimed = self.clients.claim(self.id);
        self.transition(WorkerState::Active);
        info!(deleted = deleted.len(), claimed, "activated");
        Ok(ActivationReport { deleted, claimed })
    }

    /// Requests promotion without waiting for old clients to close.
    pub fn skip_waiting(&self) {
        if !self.skip_waiting.swap(true, Ordering::AcqRel) {
            debug!(worker = %self.id, "skip waiting requested");
        }
    }

    /// Whether the host should activate this worker now.
    pub fn should_activate(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire) && self.state() == WorkerState::Waiting
    }

    /// Applies a control message.
    #[instrument(skip_all, fields(worker = %self.id))]
    pub async fn handle_message(&self, message: ControlMessage) -> MessageOutcome {
        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting();
                MessageOutcome::SkipWaiting
            }
            ControlMessage::CacheData { data, key } => {
                let url = match self.config.resolve(&key) {
                    Ok(url) => url,
                    Err(error) => {
                        warn!(%key, %error, "ignoring CACHE_DATA with invalid key");
                        return MessageOutcome::Ignored;
                    }
                };
                let key = RequestKey::get(url.to_string());
                let stored = self
                    .partitions
                    .store(&self.config.caches.data, &key, CacheEntry::json(&data))
                    .await;
                if stored {
                    MessageOutcome::Cached(key)
                } else {
                    MessageOutcome::Ignored
                }
            }
            ControlMessage::Unknown => {
                debug!("ignoring unknown message");
                MessageOutcome::Ignored
            }
        }
    }
}
