//! Network error type.

use thiserror::Error;

/// A fetch that was rejected before any response arrived.
///
/// Offline, DNS failure, refused connection or timeout. A response with a
/// non-success status is *not* a `NetworkError`: it is a normal
/// [`FetchResponse`](crate::FetchResponse) that callers see unmodified.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Could not reach the remote host.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The request could not be built (bad URL, unsupported method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other transport failure.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
