//! The set of named partitions.

use async_trait::async_trait;
use swcache_core::{CacheEntry, PartitionName, RequestKey};
use tracing::warn;

use crate::backend::{BackendResult, PartitionHandle};

/// A keyed store of named partitions, the equivalent of a browser's cache storage.
///
/// Opening is idempotent: `open` on an existing name returns a handle to the
/// same partition, `open` on a new name creates it. Reads go through `get`,
/// which never creates anything.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Opens the partition with the given name, creating it if absent.
    async fn open(&self, name: &PartitionName) -> BackendResult<PartitionHandle>;

    /// Returns the partition with the given name without creating it.
    async fn get(&self, name: &PartitionName) -> BackendResult<Option<PartitionHandle>>;

    /// Whether a partition with the given name exists.
    async fn has(&self, name: &PartitionName) -> BackendResult<bool>;

    /// Returns partition names in creation order.
    async fn names(&self) -> BackendResult<Vec<PartitionName>>;

    /// Deletes a partition. Returns `false` if it did not exist.
    async fn delete(&self, name: &PartitionName) -> BackendResult<bool>;

    /// Looks the key up in every partition, in creation order, and returns the first hit.
    ///
    /// A partition that fails to read is skipped.
    async fn match_any(&self, key: &RequestKey) -> BackendResult<Option<(PartitionName, CacheEntry)>> {
        for name in self.names().await? {
            // A partition deleted since `names` returned is simply not there any more.
            let Some(partition) = self.get(&name).await? else {
                continue;
            };
            match partition.read(key).await {
                Ok(Some(entry)) => return Ok(Some((name, entry))),
                Ok(None) => {}
                Err(error) => warn!(partition = %name, %error, "partition read failed"),
            }
        }
        Ok(None)
    }
}
