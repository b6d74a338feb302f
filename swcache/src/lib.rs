#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # swcache
//!
//! Offline-capable request interception for the Praise web application.
//!
//! The worker owns two partitions, a static one for the application shell and
//! a data one for API responses, and answers every intercepted request with
//! one of four strategies chosen by the request's class. Around that sit the
//! install/activate lifecycle, a control message channel, and a background
//! sync hook that notifies every open page.
//!
//! Storage is pluggable through [`swcache_backend::Storage`] (see
//! `swcache-moka` for the in-memory implementation) and the network through
//! [`swcache_core::Upstream`] (see `swcache-reqwest`).

/// Request classification.
pub mod classify;

/// Connected clients and best-effort broadcast.
pub mod clients;

/// YAML configuration with production defaults.
pub mod config;

/// Error types.
///
/// Storage and network failures inside a strategy never surface here; they
/// are logged and trigger the strategy's fallback.
pub mod error;

/// Classify, dispatch and record.
pub mod executor;

/// Install, activate and control messages.
pub mod lifecycle;

/// Metrics collection.
///
/// With the `metrics` feature enabled this module records request
/// resolution by class and source, offline placeholders, install failures,
/// partition cleanup, sync outcomes and background task timings.
pub mod metrics;

/// Background task execution for deferred syncs.
pub mod offload;

/// Named partition management.
pub mod partition;

/// The four caching strategies.
pub mod strategy;

/// Background sync and `DATA_SYNCED` notification.
pub mod sync;

/// The event dispatcher.
pub mod worker;

pub use classify::{Classifier, RequestClass};
pub use clients::{ClientId, ClientInfo, ClientRegistry};
pub use config::{CacheNames, RouteRules, SyncConfig, TimeoutAction, WorkerConfig};
pub use error::{ActivateError, ConfigError, InstallError, ResolveError};
pub use executor::StrategyExecutor;
pub use lifecycle::{
    ActivationReport, InstallReport, LifecycleController, MessageOutcome, WorkerId, WorkerState,
};
pub use partition::{PartitionManager, SharedStorage};
pub use sync::{FnResync, NoopResync, Resync, ResyncError, SyncBridge, SyncManager, SyncOutcome};
pub use worker::{FetchEvent, MessageEvent, NotSet, ServiceWorker, ServiceWorkerBuilder, SyncEvent};

pub use swcache_core::{
    CacheEntry, ClientMessage, ControlMessage, Destination, FetchRequest, FetchResponse,
    NetworkError, Notification, PartitionName, RequestKey, RequestMode, ResponseSource, Upstream,
};
