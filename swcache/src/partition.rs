//! Cache partition manager.
//!
//! Owns the lifecycle of named partitions: opening, install-time population
//! and activation-time cleanup. Strategies go through the helpers here, which
//! turn storage errors into logged misses so that a broken store never fails
//! an intercepted request.

use std::sync::Arc;

use futures::future::try_join_all;
use http::Uri;
use swcache_backend::{BackendResult, PartitionHandle, Storage};
use swcache_core::{CacheEntry, FetchRequest, PartitionName, RequestKey, Upstream};
use tracing::{debug, warn};

use crate::error::InstallError;
use crate::metrics;

/// Shared, type-erased partition storage.
pub type SharedStorage = Arc<dyn Storage>;

/// Manages named partitions on top of a [`Storage`].
#[derive(Clone)]
pub struct PartitionManager {
    storage: SharedStorage,
}

impl std::fmt::Debug for PartitionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionManager").finish_non_exhaustive()
    }
}

impl PartitionManager {
    /// Creates a manager over the given storage.
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Opens a partition, creating it if absent.
    pub async fn open(&self, name: &PartitionName) -> BackendResult<PartitionHandle> {
        self.storage.open(name).await
    }

    /// Deletes every partition whose name is not in `keep` and returns the deleted names.
    ///
    /// A partition that fails to delete is logged and skipped.
    pub async fn delete_all_except(&self, keep: &[PartitionName]) -> BackendResult<Vec<PartitionName>> {
        let mut deleted = Vec::new();
        for name in self.storage.names().await? {
            if keep.contains(&name) {
                continue;
            }
            match self.storage.delete(&name).await {
                Ok(true) => {
                    debug!(partition = %name, "deleted stale partition");
                    deleted.push(name);
                }
                Ok(false) => {}
                Err(error) => warn!(partition = %name, %error, "failed to delete stale partition"),
            }
        }
        metrics::record_stale_deleted(deleted.len());
        Ok(deleted)
    }

    /// Fetches every URL and stores the responses in partition `name`.
    ///
    /// All or nothing: the partition is only written once every fetch returned
    /// a `2xx` status. If a write fails on a partition this call created, the
    /// partition is deleted again. Repeating the call overwrites the same keys
    /// with fresh content. Returns the number of entries written.
    pub async fn populate<U>(
        &self,
        name: &PartitionName,
        urls: &[Uri],
        upstream: &U,
    ) -> Result<usize, InstallError>
    where
        U: Upstream + ?Sized,
    {
        let fetched = try_join_all(urls.iter().map(|uri| async move {
            let request = FetchRequest::get(uri.clone());
            let key = request.key();
            let response = upstream.call(request).await.map_err(|source| InstallError::Fetch {
                url: uri.to_string(),
                source,
            })?;
            // Install accepts any 2xx, like a browser's `addAll`.
            if !response.status().is_success() {
                return Err(InstallError::Status {
                    url: uri.to_string(),
                    status: response.status(),
                });
            }
            Ok((key, response.snapshot()))
        }))
        .await?;

        let count = fetched.len();
        let existed = self.storage.has(name).await?;
        let partition = self.storage.open(name).await?;
        for (key, entry) in fetched {
            if let Err(error) = partition.write(&key, entry).await {
                if !existed && let Err(cleanup) = self.storage.delete(name).await {
                    warn!(partition = %name, error = %cleanup, "failed to drop partial partition");
                }
                return Err(error.into());
            }
        }
        debug!(partition = %name, entries = count, "partition populated");
        Ok(count)
    }

    /// Reads `key` from partition `name`. Storage errors count as a miss.
    pub async fn lookup(&self, name: &PartitionName, key: &RequestKey) -> Option<CacheEntry> {
        // `get`, not `open`: a read must never create the partition.
        let result = match self.storage.get(name).await {
            Ok(Some(partition)) => partition.read(key).await,
            Ok(None) => return None,
            Err(error) => Err(error),
        };
        match result {
            Ok(entry) => entry,
            Err(error) => {
                warn!(partition = %name, %key, %error, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Writes a snapshot to partition `name`. Only `GET` keys are stored.
    ///
    /// Returns whether the entry was written; failures are logged.
    pub async fn store(&self, name: &PartitionName, key: &RequestKey, entry: CacheEntry) -> bool {
        if !key.is_get() {
            debug!(%key, "not storing non-GET response");
            return false;
        }
        let result = match self.storage.open(name).await {
            Ok(partition) => partition.write(key, entry).await,
            Err(error) => Err(error),
        };
        match result {
            Ok(()) => {
                debug!(partition = %name, %key, "stored response");
                true
            }
            Err(error) => {
                warn!(partition = %name, %key, %error, "cache write failed, skipping");
                false
            }
        }
    }

    /// Looks `key` up in every partition, oldest first.
    pub async fn match_any(&self, key: &RequestKey) -> Option<(PartitionName, CacheEntry)> {
        match self.storage.match_any(key).await {
            Ok(found) => found,
            Err(error) => {
                warn!(%key, %error, "storage unavailable, treating lookup as miss");
                None
            }
        }
    }
}
