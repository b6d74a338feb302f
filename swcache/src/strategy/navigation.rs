use async_trait::async_trait;
use swcache_core::{FetchRequest, FetchResponse, ResponseSource, Upstream};
use tracing::{debug, warn};

use super::{Strategy, StrategyContext};
use crate::classify::RequestClass;
use crate::error::ResolveError;

/// Network first for documents. Offline, the exact cached page is served,
/// else the cached root shell, so navigation keeps working while any shell
/// is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationFallback;

#[async_trait]
impl Strategy for NavigationFallback {
    fn class(&self) -> RequestClass {
        RequestClass::Navigation
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

        let error = match ctx.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable_status() {
                    ctx.partitions.store(static_cache, &key, response.snapshot()).await;
                }
                return Ok(response);
            }
            Err(error) => error,
        };

        warn!(%key, %error, "navigation failed, falling back to static cache");
        let source = ResponseSource::Partition(static_cache.clone());
        if let Some(entry) = ctx.partitions.lookup(static_cache, &key).await {
            return Ok(entry.into_response(source));
        }
        if let Some(entry) = ctx.partitions.lookup(static_cache, ctx.root).await {
            debug!(%key, root = %ctx.root, "serving cached shell");
            return Ok(entry.into_response(source));
        }
        Err(self.unresolved(&key, error))
    }
}
