use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use swcache_backend::{BackendError, BackendResult, PartitionHandle, Storage};
use swcache_core::PartitionName;
use tokio::sync::RwLock;
use tracing::debug;

use crate::builder::{MokaStorageBuilder, NoCapacity, PartitionTemplate};
use crate::metrics;
use crate::partition::MokaPartition;

/// In-memory partition storage powered by Moka.
///
/// Partitions are kept in creation order, which is the order
/// [`Storage::match_any`] searches them in. Nothing is persisted: storage is
/// lost when the process exits.
pub struct MokaStorage {
    partitions: RwLock<IndexMap<PartitionName, Arc<MokaPartition>>>,
    template: PartitionTemplate,
    max_partitions: Option<usize>,
}

impl std::fmt::Debug for MokaStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStorage")
            .field("max_partitions", &self.max_partitions)
            .finish_non_exhaustive()
    }
}

impl MokaStorage {
    /// Creates a new builder. Without a capacity the storage is unbounded.
    pub fn builder() -> MokaStorageBuilder<NoCapacity> {
        MokaStorageBuilder::new()
    }

    pub(crate) fn new(template: PartitionTemplate, max_partitions: Option<usize>) -> Self {
        Self {
            partitions: RwLock::default(),
            template,
            max_partitions,
        }
    }

    /// Returns the concrete partition with the given name, if it exists.
    pub async fn partition(&self, name: &PartitionName) -> Option<Arc<MokaPartition>> {
        self.partitions.read().await.get(name).cloned()
    }
}

#[async_trait]
impl Storage for MokaStorage {
    async fn open(&self, name: &PartitionName) -> BackendResult<PartitionHandle> {
        if let Some(partition) = self.partitions.read().await.get(name) {
            return Ok(partition.clone());
        }

        let mut partitions = self.partitions.write().await;
        // Another task may have created it between the two locks.
        if let Some(partition) = partitions.get(name) {
            return Ok(partition.clone());
        }
        if let Some(max) = self.max_partitions
            && partitions.len() >= max
        {
            return Err(BackendError::QuotaExceeded(name.clone()));
        }

        debug!(partition = %name, "creating partition");
        let partition = Arc::new(self.template.new_partition(name.clone()));
        partitions.insert(name.clone(), partition.clone());
        metrics::record_partitions(partitions.len());
        Ok(partition)
    }

    async fn get(&self, name: &PartitionName) -> BackendResult<Option<PartitionHandle>> {
        let partitions = self.partitions.read().await;
        Ok(partitions.get(name).map(|p| p.clone() as PartitionHandle))
    }

    async fn has(&self, name: &PartitionName) -> BackendResult<bool> {
        Ok(self.partitions.read().await.contains_key(name))
    }

    async fn names(&self) -> BackendResult<Vec<PartitionName>> {
        Ok(self.partitions.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &PartitionName) -> BackendResult<bool> {
        let mut partitions = self.partitions.write().await;
        let removed = partitions.shift_remove(name).is_some();
        if removed {
            debug!(partition = %name, "deleted partition");
            metrics::record_partitions(partitions.len());
        }
        Ok(removed)
    }
}
