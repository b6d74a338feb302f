use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use smol_str::SmolStr;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::policy::{OffloadConfig, TimeoutPolicy};
use crate::metrics;

/// Key identifying a background task. At most one task per key is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    kind: &'static str,
    name: SmolStr,
}

impl TaskKey {
    /// Key of the deferred sync for `tag`.
    pub fn sync(tag: impl Into<SmolStr>) -> Self {
        Self {
            kind: "sync",
            name: tag.into(),
        }
    }

    /// Returns the kind used for metrics labels and spans.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the name within the kind, e.g. the sync tag.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
struct OffloadManagerInner {
    config: OffloadConfig,
    tasks: DashMap<TaskKey, JoinHandle<()>>,
}

/// Runs tasks in the background, detached from the event that spawned them.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    inner: Arc<OffloadManagerInner>,
}

impl OffloadManager {
    /// Creates a manager with the given configuration.
    pub fn new(config: OffloadConfig) -> Self {
        Self {
            inner: Arc::new(OffloadManagerInner {
                config,
                tasks: DashMap::new(),
            }),
        }
    }

    /// Spawns a task under `key`.
    ///
    /// With deduplication on, a key that is already in flight is skipped.
    /// Returns `true` if the task was spawned.
    pub fn spawn_with_key<F>(&self, key: TaskKey, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.config.deduplicate && self.is_in_flight(&key) {
            debug!(?key, "task already in flight");
            metrics::record_task_deduplicated(key.kind());
            return false;
        }

        self.cleanup_finished();
        metrics::record_task_spawned(key.kind());
        let handle = self.spawn_inner(key.clone(), task);
        self.inner.tasks.insert(key, handle);
        true
    }

    /// Whether a task with `key` is running.
    pub fn is_in_flight(&self, key: &TaskKey) -> bool {
        self.inner.tasks.get(key).is_some_and(|h| !h.is_finished())
    }

    /// Drops handles of finished tasks.
    pub fn cleanup_finished(&self) {
        self.inner.tasks.retain(|_, handle| !handle.is_finished());
    }

    /// Waits until every tracked task has finished.
    pub async fn wait_all(&self) {
        loop {
            self.cleanup_finished();
            if self.inner.tasks.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    fn spawn_inner<F>(&self, key: TaskKey, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let policy = self.inner.config.timeout_policy;
        let kind = key.kind();
        let span = info_span!("offload_task", kind, name = key.name());

        tokio::spawn(
            async move {
                let start = Instant::now();
                let mut timed_out = false;
                match policy {
                    TimeoutPolicy::None => task.await,
                    TimeoutPolicy::Cancel(limit) => {
                        if tokio::time::timeout(limit, task).await.is_err() {
                            warn!(?key, limit_ms = limit.as_millis(), "task cancelled by timeout");
                            timed_out = true;
                        }
                    }
                    TimeoutPolicy::Warn(limit) => {
                        task.await;
                        let elapsed = start.elapsed();
                        if elapsed > limit {
                            warn!(
                                ?key,
                                elapsed_ms = elapsed.as_millis(),
                                threshold_ms = limit.as_millis(),
                                "task exceeded timeout threshold"
                            );
                        }
                    }
                }
                metrics::record_task_finished(kind, start.elapsed(), timed_out);
            }
            .instrument(span),
        )
    }
}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::new(OffloadConfig::default())
    }
}
