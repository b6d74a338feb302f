//! Caching strategies.
//!
//! Each strategy resolves one request class against the network and the
//! partitions. A strategy only fails when neither source can answer.
//!
//! | class        | strategy                                  |
//! |--------------|-------------------------------------------|
//! | Api          | [`NetworkFirst`] over the data partition  |
//! | StaticAsset  | [`CacheFirst`] over the static partition  |
//! | Navigation   | [`NavigationFallback`] to the shell       |
//! | Other        | [`Passthrough`] to any partition          |
//!
//! Responses are snapshotted with [`FetchResponse::snapshot`] before being
//! returned, so the stored copy and the live response share the body bytes.

mod cache_first;
mod navigation;
mod network_first;
mod passthrough;

use std::time::Instant;

use async_trait::async_trait;
use swcache_core::{FetchRequest, FetchResponse, NetworkError, RequestKey, Upstream};
use tracing::debug;

use crate::classify::RequestClass;
use crate::config::CacheNames;
use crate::error::ResolveError;
use crate::metrics;
use crate::partition::PartitionManager;

pub use cache_first::CacheFirst;
pub use navigation::NavigationFallback;
pub use network_first::{NetworkFirst, offline_placeholder};
pub use passthrough::Passthrough;

/// Everything a strategy may touch while resolving one request.
pub struct StrategyContext<'a, U> {
    /// Partition access.
    pub partitions: &'a PartitionManager,
    /// The network.
    pub upstream: &'a U,
    /// Current partition names.
    pub caches: &'a CacheNames,
    /// Key of the shell document served to offline navigations.
    pub root: &'a RequestKey,
}

impl<U> StrategyContext<'_, U>
where
    U: Upstream,
{
    /// Sends the request to the network, recording latency.
    pub async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, NetworkError> {
        let start = Instant::now();
        let result = self.upstream.call(request).await;
        metrics::record_upstream(start.elapsed(), result.is_ok());
        if let Ok(response) = &result {
            debug!(status = %response.status(), "network responded");
        }
        result
    }
}

/// An async resolution policy for one request class.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// The class this strategy serves, used in errors and logs.
    fn class(&self) -> RequestClass;

    /// Resolves the request to a response.
    async fn resolve<U>(
        &self,
        ctx: &StrategyContext<'_, U>,
        request: FetchRequest,
    ) -> Result<FetchResponse, ResolveError>
    where
        U: Upstream;

    /// Builds the error returned when nothing can answer.
    fn unresolved(&self, key: &RequestKey, source: NetworkError) -> ResolveError {
        ResolveError {
            class: self.class(),
            url: key.url().to_owned(),
            source,
        }
    }
}
