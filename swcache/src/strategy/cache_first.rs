use async_trait::async_trait;
use swcache_core::{FetchRequest, FetchResponse, ResponseSource, Upstream};
use tracing::debug;

use super::{Strategy, StrategyContext};
use crate::classify::RequestClass;
use crate::error::ResolveError;

/// Static partition first; the network only refills misses.
///
/// A hit never touches the network. A miss is fetched and stored on `200 OK`;
/// other statuses and network errors reach the caller unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheFirst;

#[async_trait]
impl Strategy for CacheFirst {
    fn class(&self) -> RequestClass {
        RequestClass::StaticAsset
    }

    async fn resolve<U>(
        &self,
        ctx: &StrategyContext<'_, U>,
        request: FetchRequest,
    ) -> Result<FetchResponse, ResolveError>
    where
        U: Upstream,
    {
        let key = request.key();
        let static_cache = &ctx.caches.static_cache;

        if let Some(entry) = ctx.partitions.lookup(static_cache, &key).await {
            debug!(%key, "static cache hit");
            return Ok(entry.into_response(ResponseSource::Partition(static_cache.clone())));
        }

        debug!(%key, "static cache miss");
        let response = ctx
            .fetch(request)
            .await
            .map_err(|source| self.unresolved(&key, source))?;
        if response.is_cacheable_status() {
            ctx.partitions.store(static_cache, &key, response.snapshot()).await;
        }
        Ok(response)
    }
}
