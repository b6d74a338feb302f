//! Partition capacity metrics.
//!
//! Enable the `metrics` feature to use these metrics.
//!
//! ## Metrics
//!
//! - `swcache_partition_entries` - Current number of entries in a partition (gauge)
//! - `swcache_partition_size_bytes` - Current weighted size in bytes (gauge)
//! - `swcache_partitions` - Number of partitions currently open (gauge)
//! - `swcache_partition_quota_rejections_total` - Writes refused by a partition quota (counter)
//!
//! Per-partition gauges carry a `partition` label.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for partition entry count gauge.
    pub static ref PARTITION_ENTRIES: &'static str = {
        metrics::describe_gauge!(
            "swcache_partition_entries",
            "Current number of entries in a partition."
        );
        "swcache_partition_entries"
    };

    /// Metric name for partition size gauge.
    pub static ref PARTITION_SIZE_BYTES: &'static str = {
        metrics::describe_gauge!(
            "swcache_partition_size_bytes",
            "Current weighted size of a partition in bytes."
        );
        "swcache_partition_size_bytes"
    };

    /// Metric name for the open partition count gauge.
    pub static ref PARTITIONS: &'static str = {
        metrics::describe_gauge!(
            "swcache_partitions",
            "Number of partitions currently open."
        );
        "swcache_partitions"
    };

    /// Metric name for the quota rejection counter.
    pub static ref QUOTA_REJECTIONS: &'static str = {
        metrics::describe_counter!(
            "swcache_partition_quota_rejections_total",
            "Writes refused because a partition reached its quota."
        );
        "swcache_partition_quota_rejections_total"
    };
}

/// Record current partition capacity.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_capacity(partition: &str, entries: u64, size_bytes: u64) {
    metrics::gauge!(*PARTITION_ENTRIES, "partition" => partition.to_string()).set(entries as f64);
    metrics::gauge!(*PARTITION_SIZE_BYTES, "partition" => partition.to_string())
        .set(size_bytes as f64);
}

/// Record current partition capacity (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_capacity(_partition: &str, _entries: u64, _size_bytes: u64) {}

/// Record the number of open partitions.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_partitions(count: usize) {
    metrics::gauge!(*PARTITIONS).set(count as f64);
}

/// Record the number of open partitions (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_partitions(_count: usize) {}

/// Record a write refused by the partition quota.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_quota_rejected(partition: &str) {
    metrics::counter!(*QUOTA_REJECTIONS, "partition" => partition.to_string()).increment(1);
}

/// Record a write refused by the partition quota (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_quota_rejected(_partition: &str) {}
