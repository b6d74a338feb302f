//! Shared test fixtures: a scripted upstream and worker construction.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Ready;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::StatusCode;
use swcache::{FetchRequest, FetchResponse, NetworkError, ServiceWorker, Upstream, WorkerConfig};
use swcache_moka::MokaStorage;

pub const ORIGIN: &str = "https://praise.example";

#[derive(Debug, Clone)]
enum Route {
    Respond(StatusCode, Bytes),
    Fail,
}

#[derive(Debug, Default)]
struct MockInner {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

/// Upstream answering from a script and counting every call.
///
/// Unscripted URLs answer `404`. Offline mode rejects every fetch.
#[derive(Debug, Clone, Default)]
pub struct MockUpstream {
    inner: Arc<MockInner>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: StatusCode, body: impl Into<Bytes>) -> &Self {
        self.inner
            .routes
            .lock()
            .unwrap()
            .insert(url.to_owned(), Route::Respond(status, body.into()));
        self
    }

    pub fn ok(&self, url: &str, body: &'static str) -> &Self {
        self.respond(url, StatusCode::OK, body)
    }

    pub fn fail(&self, url: &str) -> &Self {
        self.inner
            .routes
            .lock()
            .unwrap()
            .insert(url.to_owned(), Route::Fail);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.inner
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

impl Upstream for MockUpstream {
    type Future = Ready<Result<FetchResponse, NetworkError>>;

    fn call(&self, req: FetchRequest) -> Self::Future {
        let url = req.uri().to_string();
        self.inner.calls.lock().unwrap().push(url.clone());

        if self.inner.offline.load(Ordering::SeqCst) {
            return std::future::ready(Err(NetworkError::Connect("offline".to_owned())));
        }
        let route = self.inner.routes.lock().unwrap().get(&url).cloned();
        let result = match route {
            Some(Route::Respond(status, body)) => Ok(FetchResponse::new(status, body)),
            Some(Route::Fail) => Err(NetworkError::Connect(format!("cannot reach {url}"))),
            None => Ok(FetchResponse::new(StatusCode::NOT_FOUND, "not found")),
        };
        std::future::ready(result)
    }
}

pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

pub fn config(precache: &[&str]) -> WorkerConfig {
    WorkerConfig {
        origin: ORIGIN.to_owned(),
        precache: precache.iter().map(|p| (*p).to_owned()).collect(),
        ..WorkerConfig::default()
    }
}

pub fn storage() -> Arc<MokaStorage> {
    Arc::new(MokaStorage::builder().build())
}

pub fn worker(
    config: WorkerConfig,
    storage: &Arc<MokaStorage>,
    upstream: &MockUpstream,
) -> ServiceWorker<MockUpstream> {
    ServiceWorker::builder()
        .config(config)
        .storage(storage.clone())
        .upstream(upstream.clone())
        .build()
        .expect("valid worker")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
