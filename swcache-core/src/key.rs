//! Request key type.
//!
//! A [`RequestKey`] identifies one stored response inside a partition. It is
//! made of the request method and the absolute request URL, the same pair a
//! browser cache matches on (ignoring `Vary`).
//!
//! ## Format
//!
//! When displayed, keys follow the `{METHOD} {url}` format:
//!
//! ```
//! use swcache_core::RequestKey;
//!
//! let key = RequestKey::get("https://praise.example/api/songs");
//! assert_eq!(key.to_string(), "GET https://praise.example/api/songs");
//! assert!(key.is_get());
//! ```
//!
//! ## Performance
//!
//! [`RequestKey`] uses `Arc` internally for cheap cloning - copying a key
//! only increments a reference count. Both components are [`SmolStr`], so
//! methods and short URLs are stored inline.

use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use http::Method;

#[derive(Debug, Clone, Eq, PartialEq, Hash, serde::Serialize)]
struct RequestKeyInner {
    method: SmolStr,
    url: SmolStr,
}

/// A key identifying a stored response: method plus absolute URL.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(into = "RequestKeyInner")]
pub struct RequestKey {
    inner: Arc<RequestKeyInner>,
}

impl PartialEq for RequestKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl From<RequestKey> for RequestKeyInner {
    fn from(key: RequestKey) -> Self {
        Arc::try_unwrap(key.inner).unwrap_or_else(|arc| (*arc).clone())
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)
    }
}

impl RequestKey {
    /// Creates a key from a method and an absolute URL.
    pub fn new(method: &Method, url: impl Into<SmolStr>) -> Self {
        RequestKey {
            inner: Arc::new(RequestKeyInner {
                method: SmolStr::new(method.as_str()),
                url: url.into(),
            }),
        }
    }

    /// Creates a `GET` key for the given URL.
    pub fn get(url: impl Into<SmolStr>) -> Self {
        Self::new(&Method::GET, url)
    }

    /// Returns the request method.
    pub fn method(&self) -> &str {
        &self.inner.method
    }

    /// Returns the absolute request URL.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Whether the key belongs to a `GET` request, the only method stored in partitions.
    pub fn is_get(&self) -> bool {
        self.inner.method == Method::GET.as_str()
    }

    /// Returns the estimated memory usage of this key in bytes.
    ///
    /// Counts the Arc allocation plus heap-allocated string content
    /// (SmolStr keeps strings of up to 23 bytes inline).
    pub fn memory_size(&self) -> usize {
        use std::mem::size_of;

        let heap_size = |len: usize| len.saturating_sub(23);
        let arc_overhead = 2 * size_of::<usize>() + size_of::<RequestKeyInner>();

        arc_overhead + heap_size(self.inner.method.len()) + heap_size(self.inner.url.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_with_different_methods_differ() {
        let get = RequestKey::get("https://praise.example/api/songs");
        let post = RequestKey::new(&Method::POST, "https://praise.example/api/songs");

        assert_ne!(get, post);
        assert!(!post.is_get());
        assert_eq!(post.method(), "POST");
    }

    #[test]
    fn clones_compare_equal() {
        let key = RequestKey::get("https://praise.example/");
        let clone = key.clone();

        assert_eq!(key, clone);
        assert_eq!(clone.url(), "https://praise.example/");
    }

    #[test]
    fn long_urls_count_heap_bytes() {
        let short = RequestKey::get("https://a.io/");
        let long = RequestKey::get(format!("https://praise.example/{}", "x".repeat(100)));

        assert!(long.memory_size() > short.memory_size());
    }
}
