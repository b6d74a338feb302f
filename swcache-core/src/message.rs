//! Cross-context messages.
//!
//! Two directions:
//!
//! - [`ControlMessage`]: sent by the application to the worker
//!   (`{"type":"SKIP_WAITING"}`, `{"type":"CACHE_DATA","data":..,"key":".."}`).
//! - [`Notification`]: broadcast by the worker to every client
//!   (`{"type":"DATA_SYNCED","timestamp":"2024-03-01T12:30:00.000Z"}`).
//!
//! [`ClientMessage`] is what a connected client actually receives: either a
//! notification or the news that a new worker took control of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message the application posts to the worker.
///
/// Unknown `type` values parse into [`ControlMessage::Unknown`] and are ignored.
///
/// ```
/// use swcache_core::ControlMessage;
///
/// let msg = ControlMessage::parse(serde_json::json!({"type": "SKIP_WAITING"})).unwrap();
/// assert_eq!(msg, ControlMessage::SkipWaiting);
///
/// let msg = ControlMessage::parse(serde_json::json!({"type": "PING"})).unwrap();
/// assert_eq!(msg, ControlMessage::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Promote the waiting worker immediately.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    /// Store `data` as a JSON response under `key` in the data partition.
    #[serde(rename = "CACHE_DATA")]
    CacheData {
        /// Payload to serialize as the response body.
        #[serde(default)]
        data: serde_json::Value,
        /// URL (absolute or origin-relative) to store the payload under.
        key: String,
    },
    /// Any other message type.
    #[serde(other)]
    Unknown,
}

impl ControlMessage {
    /// Parses a posted message.
    ///
    /// Fails for non-object payloads and for known types with missing fields.
    pub fn parse(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// A notification broadcast to every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// The background resync finished.
    #[serde(rename = "DATA_SYNCED")]
    DataSynced {
        /// When the resync finished.
        #[serde(with = "iso8601")]
        timestamp: DateTime<Utc>,
    },
}

impl Notification {
    /// Creates a `DATA_SYNCED` notification stamped with the current time.
    pub fn data_synced() -> Self {
        Notification::DataSynced {
            timestamp: Utc::now(),
        }
    }

    /// Returns the wire representation.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// What a connected client receives from the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// A broadcast notification.
    Notify(Notification),
    /// A worker generation claimed this client.
    ControllerChanged {
        /// Id of the worker generation now in control.
        worker: u64,
    },
}

mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&crate::iso8601(*at))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
