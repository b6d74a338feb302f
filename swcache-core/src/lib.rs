#![warn(missing_docs)]
//! # swcache-core
//!
//! Core types for the swcache offline request-interception layer.
//!
//! This crate holds the vocabulary shared by the storage backends and the
//! orchestration crate:
//!
//! - **Identify** stored responses ([`RequestKey`], [`PartitionName`])
//! - **Describe** intercepted traffic ([`FetchRequest`], [`FetchResponse`])
//! - **Snapshot** responses for storage ([`CacheEntry`])
//! - **Call** the network ([`Upstream`])
//! - **Talk** to clients ([`ControlMessage`], [`Notification`])
//!
//! Nothing in here performs I/O on its own; backends live in
//! `swcache-backend` implementations and strategies in `swcache`.

pub mod context;
pub mod entry;
pub mod error;
pub mod key;
pub mod label;
pub mod message;
pub mod request;
pub mod response;
pub mod upstream;

pub use context::ResponseSource;
pub use entry::CacheEntry;
pub use error::NetworkError;
pub use key::RequestKey;
pub use label::PartitionName;
pub use message::{ClientMessage, ControlMessage, Notification};
pub use request::{Destination, FetchRequest, RequestMode};
pub use response::FetchResponse;
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use upstream::Upstream;

/// Raw byte data type used for response bodies.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;

/// Formats a timestamp the way clients expect it: ISO-8601, UTC, milliseconds, `Z` suffix.
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
/// assert_eq!(swcache_core::iso8601(at), "2024-03-01T12:30:00.000Z");
/// ```
pub fn iso8601(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
