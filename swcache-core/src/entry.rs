//! Stored response snapshots.
//!
//! A [`CacheEntry`] is an immutable copy of a response (status, headers and
//! body bytes) taken at the time of storage. Entries are overwritten wholesale
//! when the same key is cached again and are never merged.
//!
//! ```
//! use http::StatusCode;
//! use swcache_core::CacheEntry;
//!
//! let entry = CacheEntry::json(&serde_json::json!({"songs": []}));
//! assert_eq!(entry.status(), StatusCode::OK);
//! assert_eq!(entry.body().as_ref(), br#"{"songs":[]}"#);
//! ```

use chrono::{DateTime, Utc};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use std::mem::size_of;

use crate::Raw;
use crate::context::ResponseSource;
use crate::response::FetchResponse;

/// An immutable snapshot of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    status: StatusCode,
    headers: HeaderMap,
    body: Raw,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates a snapshot stamped with the current time.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Raw>) -> Self {
        CacheEntry {
            status,
            headers,
            body: body.into(),
            stored_at: Utc::now(),
        }
    }

    /// Creates a `200 OK` snapshot holding `data` serialized as JSON.
    pub fn json(data: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // Serializing a `Value` cannot fail: every map key is already a string.
        let body = serde_json::to_vec(data).unwrap_or_default();
        Self::new(StatusCode::OK, headers, body)
    }

    /// Returns the stored status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the stored headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the stored body.
    #[inline]
    pub fn body(&self) -> &Raw {
        &self.body
    }

    /// Returns when the snapshot was taken.
    #[inline]
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Rebuilds a response from the snapshot, tagged with where it was read from.
    pub fn into_response(self, source: ResponseSource) -> FetchResponse {
        FetchResponse::new(self.status, self.body)
            .with_headers(self.headers)
            .with_source(source)
    }

    /// Returns the estimated memory usage of this entry in bytes.
    ///
    /// This includes the fixed struct size, header names and values, and the body.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();

        size_of::<Self>() + headers + self.body.len()
    }
}
