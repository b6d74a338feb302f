use std::future::Future;
use std::sync::Arc;

use crate::{FetchRequest, FetchResponse, NetworkError};

/// Trait for sending intercepted requests to the network.
///
/// An `Err` means the fetch was rejected (offline, DNS, timeout) and is what
/// triggers the fallback branch of a strategy. A response with any status,
/// including 4xx and 5xx, is an `Ok`.
///
/// # Examples
///
/// ```rust
/// use std::future::Ready;
/// use http::StatusCode;
/// use swcache_core::{FetchRequest, FetchResponse, NetworkError, Upstream};
///
/// struct Offline;
///
/// impl Upstream for Offline {
///     type Future = Ready<Result<FetchResponse, NetworkError>>;
///
///     fn call(&self, _req: FetchRequest) -> Self::Future {
///         std::future::ready(Err(NetworkError::Connect("offline".into())))
///     }
/// }
/// ```
pub trait Upstream: Send + Sync {
    /// The future that resolves to the response
    type Future: Future<Output = Result<FetchResponse, NetworkError>> + Send;

    /// Send the request to the network
    fn call(&self, req: FetchRequest) -> Self::Future;
}

impl<U> Upstream for Arc<U>
where
    U: Upstream + ?Sized,
{
    type Future = U::Future;

    fn call(&self, req: FetchRequest) -> Self::Future {
        (**self).call(req)
    }
}
