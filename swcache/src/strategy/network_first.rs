use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde_json::json;
use swcache_core::{FetchRequest, FetchResponse, ResponseSource, Upstream};
use tracing::{debug, warn};

use super::{Strategy, StrategyContext};
use crate::classify::RequestClass;
use crate::error::ResolveError;
use crate::metrics;

/// Network first, falling back to the data partition, then to a synthesized
/// offline placeholder. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkFirst;

#[async_trait]
impl Strategy for NetworkFirst {
    fn class(&self) -> RequestClass {
        RequestClass::Api
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
        let data = &ctx.caches.data;

        match ctx.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable_status() {
                    ctx.partitions.store(data, &key, response.snapshot()).await;
                } else {
                    debug!(%key, status = %response.status(), "passing through uncached");
                }
                Ok(response)
            }
            Err(error) => {
                warn!(%key, %error, "network failed, falling back to data cache");
                if let Some(entry) = ctx.partitions.lookup(data, &key).await {
                    return Ok(entry.into_response(ResponseSource::Partition(data.clone())));
                }
                debug!(%key, "no cached data, serving offline placeholder");
                metrics::record_offline_placeholder();
                Ok(offline_placeholder(Utc::now()))
            }
        }
    }
}

/// The response served to an offline API request with nothing cached.
///
/// Deliberately `200 OK` so that pages can render it without special casing.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use swcache::strategy::offline_placeholder;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
/// let response = offline_placeholder(at);
/// assert_eq!(response.status(), 200);
/// assert_eq!(
///     response.body().as_ref(),
///     br#"{"error":"Offline","message":"No cached data available","timestamp":"2024-03-01T12:30:00.000Z"}"#,
/// );
/// ```
pub fn offline_placeholder(at: DateTime<Utc>) -> FetchResponse {
    let body = json!({
        "error": "Offline",
        "message": "No cached data available",
        "timestamp": swcache_core::iso8601(at),
    });
    FetchResponse::json(StatusCode::OK, &body).with_source(ResponseSource::Synthesized)
}
