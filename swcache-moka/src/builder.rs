//! Builder for configuring [`MokaStorage`].

use moka::future::Cache;
use swcache_core::PartitionName;

use crate::partition::MokaPartition;
use crate::storage::MokaStorage;

/// Marker type: no capacity configured. Partitions grow without bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: each partition holds at most `n` entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: each partition uses at most `n` bytes (approximate).
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Per-partition quota, resolved at build time.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Capacity {
    Unbounded,
    Entries(u64),
    Bytes(u64),
}

impl Capacity {
    /// Whether a partition may hold `entries` entries weighing `bytes` in total.
    pub(crate) fn admits(self, entries: u64, bytes: u64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Entries(max) => entries <= max,
            Self::Bytes(max) => bytes <= max,
        }
    }
}

/// Recipe for every partition a storage opens.
#[derive(Debug, Clone)]
pub(crate) struct PartitionTemplate {
    capacity: Capacity,
}

impl PartitionTemplate {
    pub(crate) fn new_partition(&self, name: PartitionName) -> MokaPartition {
        // No max capacity: Moka never evicts, the quota is checked on write.
        let cache = Cache::builder().build();
        MokaPartition::new(name, cache, self.capacity)
    }
}

/// Builder for creating and configuring a [`MokaStorage`].
///
/// Without a capacity the storage is unbounded. A capacity set with
/// [`max_entries`](MokaStorageBuilder::max_entries) or
/// [`max_bytes`](MokaStorageBuilder::max_bytes) applies to each partition
/// separately and is a quota, not an eviction bound: a write that would exceed
/// it fails with
/// [`BackendError::QuotaExceeded`](swcache_backend::BackendError::QuotaExceeded)
/// and stored entries are never dropped to make room.
///
/// ```
/// use swcache_moka::MokaStorage;
///
/// let storage = MokaStorage::builder()
///     .max_entries(1_000)
///     .max_partitions(8)
///     .build();
/// ```
pub struct MokaStorageBuilder<Cap> {
    capacity: Cap,
    max_partitions: Option<usize>,
}

impl MokaStorageBuilder<NoCapacity> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            max_partitions: None,
        }
    }

    /// Limits every partition to `capacity` entries.
    pub fn max_entries(self, capacity: u64) -> MokaStorageBuilder<EntryCapacity> {
        MokaStorageBuilder {
            capacity: EntryCapacity(capacity),
            max_partitions: self.max_partitions,
        }
    }

    /// Limits every partition to approximately `bytes` bytes of keys and snapshots.
    pub fn max_bytes(self, bytes: u64) -> MokaStorageBuilder<ByteCapacity> {
        MokaStorageBuilder {
            capacity: ByteCapacity(bytes),
            max_partitions: self.max_partitions,
        }
    }

    /// Builds unbounded storage. Entries leave a partition only when they are
    /// overwritten, removed, or the partition is deleted.
    pub fn build(self) -> MokaStorage {
        MokaStorage::new(
            PartitionTemplate {
                capacity: Capacity::Unbounded,
            },
            self.max_partitions,
        )
    }
}

impl Default for MokaStorageBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaStorageBuilder<Cap> {
    /// Caps the number of partitions that may exist at once.
    ///
    /// Opening a new partition past the cap fails with
    /// [`BackendError::QuotaExceeded`](swcache_backend::BackendError::QuotaExceeded).
    /// Unlimited by default.
    pub fn max_partitions(mut self, max: usize) -> Self {
        self.max_partitions = Some(max);
        self
    }
}

impl MokaStorageBuilder<EntryCapacity> {
    /// Builds the storage with an entry-count quota per partition.
    pub fn build(self) -> MokaStorage {
        MokaStorage::new(
            PartitionTemplate {
                capacity: Capacity::Entries(self.capacity.0),
            },
            self.max_partitions,
        )
    }
}

impl MokaStorageBuilder<ByteCapacity> {
    /// Builds the storage with a byte quota per partition.
    pub fn build(self) -> MokaStorage {
        MokaStorage::new(
            PartitionTemplate {
                capacity: Capacity::Bytes(self.capacity.0),
            },
            self.max_partitions,
        )
    }
}
