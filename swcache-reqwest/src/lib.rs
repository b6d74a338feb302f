//! # swcache-reqwest
//!
//! The network side of the worker, backed by a [`reqwest::Client`].
//!
//! [`ReqwestUpstream`] implements [`swcache_core::Upstream`]: every response,
//! whatever its status, comes back as a [`FetchResponse`](swcache_core::FetchResponse),
//! and only transport failures (refused connection, DNS, timeout, broken body)
//! become a [`NetworkError`](swcache_core::NetworkError) that sends a strategy
//! down its fallback path.
//!
//! ```no_run
//! use std::time::Duration;
//! use swcache_reqwest::ReqwestUpstream;
//!
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//! let upstream = ReqwestUpstream::new(client);
//! # let _ = upstream;
//! ```

mod upstream;

pub use upstream::{ReqwestUpstream, classify_error};

/// Re-export of the reqwest client type for convenience in type annotations.
pub use reqwest::Client as ReqwestClient;
