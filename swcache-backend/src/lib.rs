#![warn(missing_docs)]
//! Traits and structs for swcache partition storage.
//!
//! Storage is two-level: a [`Storage`] is a set of named partitions, and each
//! partition is a [`Backend`] mapping request keys to response snapshots.
//! Implement both to plug a new store into the worker.
mod backend;
mod error;
mod storage;

pub use backend::{Backend, BackendResult, PartitionHandle};
pub use error::BackendError;
pub use storage::Storage;

/// Outcome of removing a key from a partition.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Entry removed.
    Deleted(u32),
    /// No entry was stored under the key.
    Missing,
}
