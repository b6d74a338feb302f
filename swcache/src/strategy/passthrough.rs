use async_trait::async_trait;
use swcache_core::{FetchRequest, FetchResponse, ResponseSource, Upstream};
use tracing::warn;

use super::{Strategy, StrategyContext};
use crate::classify::RequestClass;
use crate::error::ResolveError;

/// Network, nothing stored. A rejected fetch falls back to whichever
/// partition holds the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

#[async_trait]
impl Strategy for Passthrough {
    fn class(&self) -> RequestClass {
        RequestClass::Other
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
        match ctx.fetch(request).await {
            Ok(response) => Ok(response),
            Err(error) => {
                warn!(%key, %error, "network failed, searching all partitions");
                match ctx.partitions.match_any(&key).await {
                    Some((name, entry)) => Ok(entry.into_response(ResponseSource::Partition(name))),
                    None => Err(self.unresolved(&key, error)),
                }
            }
        }
    }
}
