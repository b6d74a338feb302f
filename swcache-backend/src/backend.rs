use std::sync::Arc;

use async_trait::async_trait;
use swcache_core::{CacheEntry, PartitionName, RequestKey};

use crate::{BackendError, DeleteStatus};

/// Result of a storage operation.
pub type BackendResult<T> = Result<T, BackendError>;

/// Shared handle to one open partition.
///
/// Handles outlive deletion: a partition removed from its [`Storage`](crate::Storage)
/// stays readable and writable through handles acquired earlier, but is no
/// longer reachable by name.
pub type PartitionHandle = Arc<dyn Backend>;

/// One cache partition: request keys mapped to response snapshots.
///
/// Writes replace the whole entry (last write wins); there is no merge.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads the entry stored under `key`.
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CacheEntry>>;

    /// Stores `entry` under `key`, replacing any previous entry.
    async fn write(&self, key: &RequestKey, entry: CacheEntry) -> BackendResult<()>;

    /// Removes the entry stored under `key`.
    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus>;

    /// Returns every key currently stored.
    async fn keys(&self) -> BackendResult<Vec<RequestKey>>;

    /// Returns the name of the partition this backend stores.
    fn name(&self) -> &PartitionName;
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CacheEntry>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &RequestKey, entry: CacheEntry) -> BackendResult<()> {
        (*self).write(key, entry).await
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        (*self).keys().await
    }

    fn name(&self) -> &PartitionName {
        (*self).name()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CacheEntry>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &RequestKey, entry: CacheEntry) -> BackendResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        (**self).keys().await
    }

    fn name(&self) -> &PartitionName {
        (**self).name()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend> {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CacheEntry>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &RequestKey, entry: CacheEntry) -> BackendResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        (**self).keys().await
    }

    fn name(&self) -> &PartitionName {
        (**self).name()
    }
}
