//! Strategy executor: classify, dispatch, record.

use std::time::Instant;

use swcache_core::{FetchRequest, FetchResponse, RequestKey, Upstream};
use tracing::{Span, debug, instrument};

use crate::classify::{Classifier, RequestClass};
use crate::config::{CacheNames, WorkerConfig};
use crate::error::{ConfigError, ResolveError};
use crate::metrics;
use crate::partition::PartitionManager;
use crate::strategy::{
    CacheFirst, NavigationFallback, NetworkFirst, Passthrough, Strategy, StrategyContext,
};

/// Resolves intercepted requests with the strategy of their class.
///
/// Every request gets an answer or a [`ResolveError`]; none is skipped.
pub struct StrategyExecutor<U> {
    classifier: Classifier,
    partitions: PartitionManager,
    upstream: U,
    caches: CacheNames,
    root: RequestKey,
}

impl<U> std::fmt::Debug for StrategyExecutor<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyExecutor")
            .field("classifier", &self.classifier)
            .field("caches", &self.caches)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<U> StrategyExecutor<U>
where
    U: Upstream,
{
    /// Creates an executor from configuration.
    pub fn new(
        config: &WorkerConfig,
        partitions: PartitionManager,
        upstream: U,
    ) -> Result<Self, ConfigError> {
        let root = RequestKey::get(config.resolve(&config.root_document)?.to_string());
        Ok(Self {
            classifier: Classifier::new(&config.routes),
            partitions,
            upstream,
            caches: config.caches.clone(),
            root,
        })
    }

    /// Classifies a request without resolving it.
    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        self.classifier.classify(request)
    }

    /// Resolves a request.
    #[instrument(
        name = "resolve",
        skip_all,
        fields(method = %request.method(), url = %request.uri(), class = tracing::field::Empty)
    )]
    pub async fn resolve(&self, request: FetchRequest) -> Result<FetchResponse, ResolveError> {
        let class = self.classifier.classify(&request);
        Span::current().record("class", class.as_str());

        let ctx = StrategyContext {
            partitions: &self.partitions,
            upstream: &self.upstream,
            caches: &self.caches,
            root: &self.root,
        };
        let start = Instant::now();
        let result = match class {
            RequestClass::Api => NetworkFirst.resolve(&ctx, request).await,
            RequestClass::StaticAsset => CacheFirst.resolve(&ctx, request).await,
            RequestClass::Navigation => NavigationFallback.resolve(&ctx, request).await,
            RequestClass::Other => Passthrough.resolve(&ctx, request).await,
        };

        match &result {
            Ok(response) => {
                debug!(source = response.source().as_str(), status = %response.status(), "resolved");
                metrics::record_resolved(class, response.source(), start.elapsed());
            }
            Err(error) => {
                debug!(%error, "unresolved");
                metrics::record_unresolved(class, start.elapsed());
            }
        }
        result
    }
}
