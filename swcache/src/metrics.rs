//! Metrics declaration and recording.
//!
//! With the `metrics` feature disabled every `record_*` function is an empty
//! inline function.

use std::time::Duration;

use swcache_core::ResponseSource;

use crate::classify::RequestClass;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Request resolution

    /// Track resolved requests by class and source.
    pub static ref REQUESTS_RESOLVED: &'static str = {
        metrics::describe_counter!(
            "swcache_requests_resolved_total",
            "Total number of intercepted requests answered, by class and source."
        );
        "swcache_requests_resolved_total"
    };
    /// Track requests nothing could answer.
    pub static ref REQUESTS_UNRESOLVED: &'static str = {
        metrics::describe_counter!(
            "swcache_requests_unresolved_total",
            "Total number of intercepted requests neither network nor cache could answer."
        );
        "swcache_requests_unresolved_total"
    };
    /// Track offline placeholders served.
    pub static ref OFFLINE_PLACEHOLDERS: &'static str = {
        metrics::describe_counter!(
            "swcache_offline_placeholders_total",
            "Total number of synthesized offline API responses."
        );
        "swcache_offline_placeholders_total"
    };
    /// Histogram of request resolution duration.
    pub static ref RESOLVE_DURATION: &'static str = {
        metrics::describe_histogram!(
            "swcache_resolve_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of request resolution in seconds."
        );
        "swcache_resolve_duration_seconds"
    };
    /// Histogram of upstream fetch duration.
    pub static ref UPSTREAM_DURATION: &'static str = {
        metrics::describe_histogram!(
            "swcache_upstream_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of network fetches in seconds."
        );
        "swcache_upstream_duration_seconds"
    };

    // Lifecycle

    /// Track failed installs.
    pub static ref INSTALL_FAILURES: &'static str = {
        metrics::describe_counter!(
            "swcache_install_failures_total",
            "Total number of aborted installs."
        );
        "swcache_install_failures_total"
    };
    /// Track stale partitions removed on activation.
    pub static ref STALE_PARTITIONS_DELETED: &'static str = {
        metrics::describe_counter!(
            "swcache_stale_partitions_deleted_total",
            "Total number of stale partitions deleted."
        );
        "swcache_stale_partitions_deleted_total"
    };

    // Sync

    /// Track sync events by outcome.
    pub static ref SYNC_EVENTS: &'static str = {
        metrics::describe_counter!(
            "swcache_sync_events_total",
            "Total number of sync events, by outcome."
        );
        "swcache_sync_events_total"
    };

    // Background tasks

    /// Track background tasks spawned.
    pub static ref TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "swcache_tasks_spawned_total",
            "Total number of background tasks spawned."
        );
        "swcache_tasks_spawned_total"
    };
    /// Track background tasks skipped because the same key was in flight.
    pub static ref TASKS_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "swcache_tasks_deduplicated_total",
            "Total number of background tasks skipped because already in flight."
        );
        "swcache_tasks_deduplicated_total"
    };
    /// Track background tasks cancelled by timeout.
    pub static ref TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "swcache_tasks_timeout_total",
            "Total number of background tasks cancelled by timeout."
        );
        "swcache_tasks_timeout_total"
    };
    /// Histogram of background task duration.
    pub static ref TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "swcache_task_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of background tasks in seconds."
        );
        "swcache_task_duration_seconds"
    };
}

/// Record a request answered by network, cache or placeholder.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_resolved(class: RequestClass, source: &ResponseSource, duration: Duration) {
    let source = match source {
        ResponseSource::Network => "network",
        ResponseSource::Partition(_) => "cache",
        ResponseSource::Synthesized => "synthesized",
    };
    metrics::counter!(*REQUESTS_RESOLVED, "class" => class.as_str(), "source" => source)
        .increment(1);
    metrics::histogram!(*RESOLVE_DURATION, "class" => class.as_str())
        .record(duration.as_secs_f64());
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_resolved(_class: RequestClass, _source: &ResponseSource, _duration: Duration) {}

/// Record a request nothing could answer.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_unresolved(class: RequestClass, duration: Duration) {
    metrics::counter!(*REQUESTS_UNRESOLVED, "class" => class.as_str()).increment(1);
    metrics::histogram!(*RESOLVE_DURATION, "class" => class.as_str())
        .record(duration.as_secs_f64());
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_unresolved(_class: RequestClass, _duration: Duration) {}

/// Record a network fetch.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_upstream(duration: Duration, ok: bool) {
    let outcome = if ok { "response" } else { "error" };
    metrics::histogram!(*UPSTREAM_DURATION, "outcome" => outcome).record(duration.as_secs_f64());
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_upstream(_duration: Duration, _ok: bool) {}

/// Record a synthesized offline response.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_offline_placeholder() {
    metrics::counter!(*OFFLINE_PLACEHOLDERS).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_offline_placeholder() {}

/// Record an aborted install.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_install_failure() {
    metrics::counter!(*INSTALL_FAILURES).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_install_failure() {}

/// Record partitions deleted on activation.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_stale_deleted(count: usize) {
    metrics::counter!(*STALE_PARTITIONS_DELETED).increment(count as u64);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_stale_deleted(_count: usize) {}

/// Record the outcome of a sync event.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_sync(outcome: &'static str) {
    metrics::counter!(*SYNC_EVENTS, "outcome" => outcome).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_sync(_outcome: &'static str) {}

/// Record a spawned background task.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_task_spawned(kind: &str) {
    metrics::counter!(*TASKS_SPAWNED, "kind" => kind.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_task_spawned(_kind: &str) {}

/// Record a background task skipped as a duplicate.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_task_deduplicated(kind: &str) {
    metrics::counter!(*TASKS_DEDUPLICATED, "kind" => kind.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_task_deduplicated(_kind: &str) {}

/// Record a finished (or cancelled) background task.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_task_finished(kind: &str, duration: Duration, timed_out: bool) {
    if timed_out {
        metrics::counter!(*TASKS_TIMEOUT, "kind" => kind.to_string()).increment(1);
    }
    metrics::histogram!(*TASK_DURATION, "kind" => kind.to_string())
        .record(duration.as_secs_f64());
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_task_finished(_kind: &str, _duration: Duration, _timed_out: bool) {}
