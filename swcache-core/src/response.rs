//! Response type handed back to intercepted requests.
//!
//! [`FetchResponse`] bodies are [`Bytes`](bytes::Bytes), so a response can be
//! read by the page and stored in a partition without one consumer starving
//! the other. Every path that both returns and stores a response takes a
//! [`CacheEntry`] snapshot first, via [`FetchResponse::snapshot`].

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::Raw;
use crate::context::ResponseSource;
use crate::entry::CacheEntry;

/// A response to an intercepted request.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Raw,
    source: ResponseSource,
}

impl FetchResponse {
    /// Creates a network response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Raw>) -> Self {
        FetchResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            source: ResponseSource::Network,
        }
    }

    /// Creates a JSON response with `Content-Type: application/json`.
    pub fn json(status: StatusCode, data: &serde_json::Value) -> Self {
        let body = serde_json::to_vec(data).unwrap_or_default();
        Self::new(status, body).with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    /// Replaces all headers.
    pub fn with_headers(self, headers: HeaderMap) -> Self {
        Self { headers, ..self }
    }

    /// Sets a header, replacing any previous value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Tags the response with its source.
    pub fn with_source(self, source: ResponseSource) -> Self {
        Self { source, ..self }
    }

    /// Returns the status code.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is exactly `200 OK`, the only status that gets cached.
    #[inline]
    pub fn is_cacheable_status(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Returns the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body.
    #[inline]
    pub fn body(&self) -> &Raw {
        &self.body
    }

    /// Returns where the response came from.
    #[inline]
    pub fn source(&self) -> &ResponseSource {
        &self.source
    }

    /// Consumes the response and returns the body.
    pub fn into_body(self) -> Raw {
        self.body
    }

    /// Parses the body as JSON.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }

    /// Takes an immutable snapshot of the response for storage.
    pub fn snapshot(&self) -> CacheEntry {
        CacheEntry::new(self.status, self.headers.clone(), self.body.clone())
    }
}
