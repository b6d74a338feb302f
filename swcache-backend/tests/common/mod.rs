//! Simple in-memory test storage using DashMap partitions.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use indexmap::IndexMap;
use swcache_backend::{Backend, BackendError, BackendResult, DeleteStatus, PartitionHandle, Storage};
use swcache_core::{CacheEntry, PartitionName, RequestKey};
use tokio::sync::RwLock;

/// In-memory partition. Can be told to fail every read.
pub struct TestPartition {
    name: PartitionName,
    entries: DashMap<RequestKey, CacheEntry>,
    broken: bool,
}

impl TestPartition {
    pub fn new(name: PartitionName, broken: bool) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            broken,
        }
    }
}

#[async_trait]
impl Backend for TestPartition {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CacheEntry>> {
        if self.broken {
            return Err(BackendError::Unavailable("broken partition".to_owned()));
        }
        Ok(self.entries.get(key).map(|e| e.clone()))
    }

    async fn write(&self, key: &RequestKey, entry: CacheEntry) -> BackendResult<()> {
        self.entries.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        Ok(match self.entries.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }

    fn name(&self) -> &PartitionName {
        &self.name
    }
}

/// Storage keeping partitions in creation order.
#[derive(Default)]
pub struct TestStorage {
    partitions: RwLock<IndexMap<PartitionName, Arc<TestPartition>>>,
    broken: Vec<PartitionName>,
}

impl TestStorage {
    pub fn with_broken(broken: &[&str]) -> Self {
        Self {
            partitions: RwLock::default(),
            broken: broken.iter().map(|n| PartitionName::from(*n)).collect(),
        }
    }
}

#[async_trait]
impl Storage for TestStorage {
    async fn open(&self, name: &PartitionName) -> BackendResult<PartitionHandle> {
        let mut partitions = self.partitions.write().await;
        let broken = self.broken.contains(name);
        let partition: PartitionHandle = partitions
            .entry(name.clone())
            .or_insert_with(|| Arc::new(TestPartition::new(name.clone(), broken)))
            .clone();
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
        Ok(self.partitions.write().await.shift_remove(name).is_some())
    }
}
