//! Background task policies.

use std::time::Duration;

use crate::config::{SyncConfig, TimeoutAction};

/// Policy for handling task timeouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// No timeout - task runs until completion.
    #[default]
    None,
    /// Cancel task after specified duration.
    Cancel(Duration),
    /// Log warning after duration but let task continue.
    Warn(Duration),
}

impl From<&SyncConfig> for TimeoutPolicy {
    fn from(config: &SyncConfig) -> Self {
        match (config.timeout, config.on_timeout) {
            (None, _) => TimeoutPolicy::None,
            (Some(limit), TimeoutAction::Cancel) => TimeoutPolicy::Cancel(limit),
            (Some(limit), TimeoutAction::Warn) => TimeoutPolicy::Warn(limit),
        }
    }
}

/// Configuration for the [`OffloadManager`](super::OffloadManager).
#[derive(Debug, Clone)]
pub struct OffloadConfig {
    /// Timeout policy for spawned tasks.
    pub timeout_policy: TimeoutPolicy,
    /// Skip a keyed task while another with the same key is in flight.
    pub deduplicate: bool,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            timeout_policy: TimeoutPolicy::None,
            deduplicate: true,
        }
    }
}

impl OffloadConfig {
    /// Sets the timeout policy.
    pub fn with_timeout_policy(self, timeout_policy: TimeoutPolicy) -> Self {
        Self {
            timeout_policy,
            ..self
        }
    }
}
