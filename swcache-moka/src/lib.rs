//! In-memory partition storage for swcache, built on [Moka](https://docs.rs/moka).
//!
//! ```
//! use swcache_moka::MokaStorage;
//!
//! // Unbounded: entries stay until overwritten or their partition is deleted.
//! let storage = MokaStorage::builder().build();
//!
//! // Writes past 32 MiB in one partition fail with `QuotaExceeded`.
//! let bounded = MokaStorage::builder().max_bytes(32 * 1024 * 1024).build();
//! ```
#![warn(missing_docs)]

mod builder;
pub mod metrics;
mod partition;
mod storage;

pub use builder::{ByteCapacity, EntryCapacity, MokaStorageBuilder, NoCapacity};
pub use partition::MokaPartition;
pub use storage::MokaStorage;
