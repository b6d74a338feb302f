//! The worker dispatcher.
//!
//! A [`ServiceWorker`] bundles every component behind five hooks the host
//! calls and awaits. No state lives outside the value.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use swcache::{ServiceWorker, WorkerConfig};
//! # async fn run<U: swcache_core::Upstream + 'static>(
//! #     storage: Arc<dyn swcache_backend::Storage>,
//! #     upstream: U,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let worker = ServiceWorker::builder()
//!     .config(WorkerConfig::default())
//!     .storage(storage)
//!     .upstream(upstream)
//!     .build()?;
//!
//! worker.on_install().await?;
//! if worker.should_activate() {
//!     worker.on_activate().await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use smol_str::SmolStr;
use swcache_core::{ControlMessage, FetchRequest, FetchResponse, Upstream};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::clients::{ClientId, ClientRegistry};
use crate::config::WorkerConfig;
use crate::error::{ActivateError, ConfigError, InstallError, ResolveError};
use crate::executor::StrategyExecutor;
use crate::lifecycle::{
    ActivationReport, InstallReport, LifecycleController, MessageOutcome, WorkerId, WorkerState,
};
use crate::offload::{OffloadConfig, OffloadManager, TimeoutPolicy};
use crate::partition::{PartitionManager, SharedStorage};
use crate::sync::{NoopResync, Resync, SyncBridge, SyncManager, SyncOutcome};

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct FetchEvent {
    /// The request.
    pub request: FetchRequest,
    /// Client that issued it, if known.
    pub client: Option<ClientId>,
}

impl FetchEvent {
    /// Wraps a request with no known client.
    pub fn new(request: FetchRequest) -> Self {
        Self {
            request,
            client: None,
        }
    }
}

/// A message posted by the application.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Raw message payload.
    pub data: serde_json::Value,
    /// Client that posted it, if known.
    pub source: Option<ClientId>,
}

impl MessageEvent {
    /// Wraps a payload with no known sender.
    pub fn new(data: serde_json::Value) -> Self {
        Self { data, source: None }
    }
}

/// A sync trigger.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    /// Tag the sync was registered under.
    pub tag: SmolStr,
    /// Whether the host will give up on this tag after this attempt.
    pub last_chance: bool,
}

impl SyncEvent {
    /// Creates a first-attempt trigger for `tag`.
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            last_chance: false,
        }
    }
}

/// One worker generation: lifecycle, request interception and sync.
pub struct ServiceWorker<U> {
    config: Arc<WorkerConfig>,
    partitions: PartitionManager,
    upstream: Arc<U>,
    lifecycle: LifecycleController,
    executor: StrategyExecutor<Arc<U>>,
    clients: ClientRegistry,
    sync: SyncManager,
}

impl<U> std::fmt::Debug for ServiceWorker<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceWorker")
            .field("lifecycle", &self.lifecycle)
            .field("executor", &self.executor)
            .field("clients", &self.clients.len())
            .finish_non_exhaustive()
    }
}

impl ServiceWorker<NotSet> {
    /// Creates a new [`ServiceWorkerBuilder`].
    pub fn builder() -> ServiceWorkerBuilder<NotSet, NotSet> {
        ServiceWorkerBuilder::new()
    }
}

impl<U> ServiceWorker<U>
where
    U: Upstream + 'static,
{
    /// Install hook: precaches the manifest.
    pub async fn on_install(&self) -> Result<InstallReport, InstallError> {
        self.lifecycle.install(self.upstream.as_ref()).await
    }

    /// Activate hook: drops stale partitions and claims clients.
    pub async fn on_activate(&self) -> Result<ActivationReport, ActivateError> {
        self.lifecycle.activate().await
    }

    /// Fetch hook: resolves an intercepted request.
    pub async fn on_fetch(&self, event: FetchEvent) -> Result<FetchResponse, ResolveError> {
        if let Some(client) = event.client {
            debug!(%client, "fetch from client");
        }
        self.executor.resolve(event.request).await
    }

    /// Message hook. Malformed and unknown messages are ignored.
    pub async fn on_message(&self, event: MessageEvent) -> MessageOutcome {
        match ControlMessage::parse(event.data) {
            Ok(message) => self.lifecycle.handle_message(message).await,
            Err(error) => {
                warn!(source = ?event.source, %error, "ignoring malformed message");
                MessageOutcome::Ignored
            }
        }
    }

    /// Sync hook: resync and notify clients. Never fails.
    pub async fn on_sync(&self, event: SyncEvent) -> SyncOutcome {
        if event.last_chance {
            debug!(tag = %event.tag, "last sync attempt");
        }
        self.sync.bridge().on_sync(&event.tag).await
    }
}

impl<U> ServiceWorker<U> {
    /// Id of this generation.
    pub fn id(&self) -> WorkerId {
        self.lifecycle.id()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.lifecycle.state()
    }

    /// Subscribes to lifecycle state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.lifecycle.subscribe()
    }

    /// Requests promotion without waiting for old clients to close.
    pub fn skip_waiting(&self) {
        self.lifecycle.skip_waiting();
    }

    /// Whether the host should activate this worker now.
    pub fn should_activate(&self) -> bool {
        self.lifecycle.should_activate()
    }

    /// Registers a deferred sync to fire on the next reconnect.
    pub fn register_sync(&self, tag: impl Into<SmolStr>) {
        self.sync.register(tag);
    }

    /// Fires every registered sync in the background.
    pub fn connectivity_restored(&self) -> usize {
        self.sync.connectivity_restored()
    }

    /// The deferred sync trigger.
    pub fn sync(&self) -> &SyncManager {
        &self.sync
    }

    /// Connected clients.
    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// Partition access.
    pub fn partitions(&self) -> &PartitionManager {
        &self.partitions
    }

    /// Active configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

/// Marker type for unset builder fields.
///
/// When you see `NotSet` in a compiler error, the corresponding builder
/// method has not been called yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSet;

/// Builder for [`ServiceWorker`]. Storage and upstream are required.
pub struct ServiceWorkerBuilder<St, U> {
    config: WorkerConfig,
    storage: St,
    upstream: U,
    resync: Arc<dyn Resync>,
    clients: ClientRegistry,
}

impl ServiceWorkerBuilder<NotSet, NotSet> {
    /// Creates a builder with default configuration and no storage or upstream.
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
            storage: NotSet,
            upstream: NotSet,
            resync: Arc::new(NoopResync),
            clients: ClientRegistry::new(),
        }
    }
}

impl Default for ServiceWorkerBuilder<NotSet, NotSet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<St, U> ServiceWorkerBuilder<St, U> {
    /// Sets the configuration.
    pub fn config(self, config: WorkerConfig) -> Self {
        Self { config, ..self }
    }

    /// Sets the partition storage.
    pub fn storage(self, storage: SharedStorage) -> ServiceWorkerBuilder<SharedStorage, U> {
        ServiceWorkerBuilder {
            config: self.config,
            storage,
            upstream: self.upstream,
            resync: self.resync,
            clients: self.clients,
        }
    }

    /// Sets the network.
    pub fn upstream<NewU>(self, upstream: NewU) -> ServiceWorkerBuilder<St, NewU>
    where
        NewU: Upstream,
    {
        ServiceWorkerBuilder {
            config: self.config,
            storage: self.storage,
            upstream,
            resync: self.resync,
            clients: self.clients,
        }
    }

    /// Sets the routine run on background sync. Defaults to [`NoopResync`].
    pub fn resync(self, resync: impl Resync + 'static) -> Self {
        Self {
            resync: Arc::new(resync),
            ..self
        }
    }

    /// Shares an existing client registry, e.g. one the previous generation used.
    pub fn clients(self, clients: ClientRegistry) -> Self {
        Self { clients, ..self }
    }
}

impl<U> ServiceWorkerBuilder<SharedStorage, U>
where
    U: Upstream + 'static,
{
    /// Validates the configuration and builds the worker in the `parsed` state.
    pub fn build(self) -> Result<ServiceWorker<U>, ConfigError> {
        self.config.validate()?;
        let config = Arc::new(self.config);
        let partitions = PartitionManager::new(self.storage);
        let upstream = Arc::new(self.upstream);

        let lifecycle =
            LifecycleController::new(config.clone(), partitions.clone(), self.clients.clone())?;
        let executor = StrategyExecutor::new(&config, partitions.clone(), upstream.clone())?;

        let bridge = Arc::new(SyncBridge::new(
            config.sync.tag.as_str(),
            self.resync,
            self.clients.clone(),
        ));
        let offload = OffloadManager::new(
            OffloadConfig::default().with_timeout_policy(TimeoutPolicy::from(&config.sync)),
        );
        let sync = SyncManager::new(bridge, offload);

        Ok(ServiceWorker {
            config,
            partitions,
            upstream,
            lifecycle,
            executor,
            clients: self.clients,
            sync,
        })
    }
}
