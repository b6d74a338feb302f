//! Error types for storage operations.

use swcache_core::PartitionName;
use thiserror::Error;

/// Error type for storage operations.
///
/// Every variant is non-fatal for an intercepted request: callers log it and
/// carry on as if the lookup missed or the write was skipped.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Storage refused to grow: too many partitions, or a partition is full.
    #[error("storage quota exceeded for partition {0}")]
    QuotaExceeded(PartitionName),

    /// Storage is not available at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Internal backend error, state or computation error.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}
