//! Error types for the worker.

use http::StatusCode;
use swcache_backend::BackendError;
use swcache_core::NetworkError;
use thiserror::Error;

use crate::classify::RequestClass;
use crate::lifecycle::WorkerState;

/// Neither the network nor any partition could satisfy an intercepted request.
///
/// Carries the network failure that started the fallback chain.
#[derive(Debug, Error)]
#[error("{class} request for {url} failed and no cached copy is available")]
pub struct ResolveError {
    /// Class the request was routed as.
    pub class: RequestClass,
    /// Absolute URL of the request.
    pub url: String,
    /// The rejected fetch.
    #[source]
    pub source: NetworkError,
}

/// Install aborted. The previous worker generation stays in charge.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A manifest URL could not be fetched at all.
    #[error("failed to fetch {url}")]
    Fetch {
        /// URL that failed.
        url: String,
        /// Underlying network error.
        #[source]
        source: NetworkError,
    },

    /// A manifest URL answered with something other than `200 OK`.
    #[error("{url} answered with status {status}")]
    Status {
        /// URL that failed.
        url: String,
        /// Status received.
        status: StatusCode,
    },

    /// The static partition could not be opened or written.
    #[error(transparent)]
    Storage(#[from] BackendError),

    /// Install was requested in a state other than `parsed`.
    #[error("cannot install a worker that is {0}")]
    InvalidState(WorkerState),
}

/// Activation was requested before the worker finished installing.
#[derive(Debug, Error)]
pub enum ActivateError {
    /// Activation is only possible from the `waiting` state.
    #[error("cannot activate a worker that is {0}")]
    InvalidState(WorkerState),
}

/// Invalid worker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Static and data partitions must have distinct names.
    #[error("static and data caches share the name {0}")]
    SameCacheNames(String),

    /// A partition name is empty.
    #[error("cache name must not be empty")]
    EmptyCacheName,

    /// The origin is not an absolute `scheme://host` URL.
    #[error("origin {0} is not an absolute URL")]
    InvalidOrigin(String),

    /// A manifest entry or the root document is not an origin-relative path.
    #[error("path {0} must start with '/'")]
    InvalidPath(String),

    /// A path could not be joined with the origin.
    #[error("cannot build a URL from {0}")]
    InvalidUrl(String),
}
