//! Upstream backed by a reqwest client.

use std::future::Future;
use std::pin::Pin;

use swcache_core::{FetchRequest, FetchResponse, NetworkError, Upstream};
use tracing::debug;

/// Sends intercepted requests over HTTP with a shared [`reqwest::Client`].
///
/// Cloning is cheap: the client is reference counted internally.
#[derive(Debug, Clone, Default)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    /// Wraps an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The wrapped client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Upstream for ReqwestUpstream {
    type Future = Pin<Box<dyn Future<Output = Result<FetchResponse, NetworkError>> + Send>>;

    fn call(&self, req: FetchRequest) -> Self::Future {
        let client = self.client.clone();

        Box::pin(async move {
            let url = req.uri().to_string();
            let request = client
                .request(req.method().clone(), &url)
                .headers(req.headers().clone())
                .body(req.body().clone())
                .build()
                .map_err(classify_error)?;

            let response = client.execute(request).await.map_err(classify_error)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(classify_error)?;
            debug!(%url, %status, bytes = body.len(), "upstream responded");

            Ok(FetchResponse::new(status, body).with_headers(headers))
        })
    }
}

/// Maps a reqwest failure onto the transport error the strategies understand.
pub fn classify_error(error: reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout
    } else if error.is_builder() {
        NetworkError::InvalidRequest(error.to_string())
    } else if error.is_connect() {
        NetworkError::Connect(error.to_string())
    } else if error.is_body() || error.is_decode() {
        NetworkError::Body(error.to_string())
    } else {
        NetworkError::Other(Box::new(error))
    }
}
