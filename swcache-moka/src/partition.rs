//! A single Moka-backed partition.

use async_trait::async_trait;
use moka::future::Cache;
use swcache_backend::{Backend, BackendError, BackendResult, DeleteStatus};
use swcache_core::{CacheEntry, PartitionName, RequestKey};
use tokio::sync::Mutex;
use tracing::warn;

use crate::builder::Capacity;
use crate::metrics;

/// Entry count and approximate byte size of a partition.
#[derive(Debug, Clone, Copy, Default)]
struct Usage {
    entries: u64,
    bytes: u64,
}

/// One named partition held in memory by a Moka async cache.
///
/// Reads are lock-free; writes replace the stored snapshot wholesale. The
/// cache is built without a capacity, so entries are never evicted. A quota
/// configured on the [`MokaStorage`](crate::MokaStorage) that created the
/// partition is enforced on [`write`](Backend::write) instead.
pub struct MokaPartition {
    name: PartitionName,
    cache: Cache<RequestKey, CacheEntry>,
    capacity: Capacity,
    // Serializes writers so the quota check and the insert see the same usage.
    usage: Mutex<Usage>,
}

impl std::fmt::Debug for MokaPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaPartition")
            .field("name", &self.name)
            .field("entries", &self.cache.entry_count())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl MokaPartition {
    pub(crate) fn new(
        name: PartitionName,
        cache: Cache<RequestKey, CacheEntry>,
        capacity: Capacity,
    ) -> Self {
        Self {
            name,
            cache,
            capacity,
            usage: Mutex::default(),
        }
    }

    /// Returns the underlying Moka cache.
    ///
    /// Writes made directly on the cache bypass the partition quota.
    pub fn cache(&self) -> &Cache<RequestKey, CacheEntry> {
        &self.cache
    }
}

/// Approximate byte cost of one stored snapshot.
fn weigh(key: &RequestKey, entry: &CacheEntry) -> u64 {
    (key.memory_size() + entry.memory_size()) as u64
}

#[async_trait]
impl Backend for MokaPartition {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CacheEntry>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, key: &RequestKey, entry: CacheEntry) -> BackendResult<()> {
        let mut usage = self.usage.lock().await;
        let weight = weigh(key, &entry);
        let next = match self.cache.get(key).await {
            Some(old) => Usage {
                entries: usage.entries,
                bytes: usage.bytes.saturating_sub(weigh(key, &old)) + weight,
            },
            None => Usage {
                entries: usage.entries + 1,
                bytes: usage.bytes + weight,
            },
        };
        if !self.capacity.admits(next.entries, next.bytes) {
            warn!(partition = %self.name, %key, capacity = ?self.capacity, "partition quota exceeded");
            metrics::record_quota_rejected(self.name.as_str());
            return Err(BackendError::QuotaExceeded(self.name.clone()));
        }

        self.cache.insert(key.clone(), entry).await;
        *usage = next;
        metrics::record_capacity(self.name.as_str(), usage.entries, usage.bytes);
        Ok(())
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        let mut usage = self.usage.lock().await;
        match self.cache.remove(key).await {
            Some(old) => {
                usage.entries = usage.entries.saturating_sub(1);
                usage.bytes = usage.bytes.saturating_sub(weigh(key, &old));
                metrics::record_capacity(self.name.as_str(), usage.entries, usage.bytes);
                Ok(DeleteStatus::Deleted(1))
            }
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Ok(self.cache.iter().map(|(key, _)| (*key).clone()).collect())
    }

    fn name(&self) -> &PartitionName {
        &self.name
    }
}
