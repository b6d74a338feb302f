//! Background task execution.
//!
//! Deferred sync work runs here instead of inside the event that triggered it,
//! with per-key deduplication and a timeout policy.

mod manager;
mod policy;

pub use manager::{OffloadManager, TaskKey};
pub use policy::{OffloadConfig, TimeoutPolicy};
