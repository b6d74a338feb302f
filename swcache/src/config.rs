//! Worker configuration.
//!
//! Every field has a default reproducing the production deployment, so an
//! empty document is a valid configuration:
//!
//! ```
//! use swcache::WorkerConfig;
//!
//! let config = WorkerConfig::from_yaml("{}").unwrap();
//! assert_eq!(config.caches.static_cache, "praise-static-v1");
//! assert_eq!(config.sync.tag, "background-sync");
//! ```
//!
//! A full document:
//!
//! ```yaml
//! origin: https://praise.example
//! caches:
//!   static: praise-static-v2
//!   data: praise-data-v2
//! routes:
//!   api_prefix: /api/
//!   data_marker: data
//!   static_extensions: [".css", ".js"]
//! precache: ["/", "/songs", "/manifest.json"]
//! root_document: /
//! sync:
//!   tag: background-sync
//!   timeout: 30s
//!   on_timeout: cancel
//! ```

use std::path::Path;
use std::time::Duration;

use http::Uri;
use serde::{Deserialize, Serialize};
use swcache_core::PartitionName;

use crate::error::ConfigError;

/// Paths fetched into the static partition at install time.
pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/songs",
    "/rehearsals",
    "/categories",
    "/subscribe",
    "/manifest.json",
    "/logo192.png",
    "/logo512.png",
    "/splash.png",
    "/photos/worship-team.jpg",
];

/// Top-level worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Origin every relative path is resolved against, e.g. `https://praise.example`.
    pub origin: String,
    /// Current partition names.
    pub caches: CacheNames,
    /// Request classification rules.
    pub routes: RouteRules,
    /// Paths fetched into the static partition at install time.
    pub precache: Vec<String>,
    /// Path of the shell document served when a navigation fails offline.
    pub root_document: String,
    /// Background sync settings.
    pub sync: SyncConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_owned(),
            caches: CacheNames::default(),
            routes: RouteRules::default(),
            precache: DEFAULT_PRECACHE.iter().map(|p| (*p).to_owned()).collect(),
            root_document: "/".to_owned(),
            sync: SyncConfig::default(),
        }
    }
}

/// Names of the current partitions. Bumping a version here retires the old
/// partition on the next activation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheNames {
    /// Long-lived partition for shell assets.
    #[serde(rename = "static")]
    pub static_cache: PartitionName,
    /// Partition for API-shaped responses.
    pub data: PartitionName,
}

impl Default for CacheNames {
    fn default() -> Self {
        Self {
            static_cache: PartitionName::new_static("praise-static-v1"),
            data: PartitionName::new_static("praise-data-v1"),
        }
    }
}

impl CacheNames {
    /// Both current names, static first.
    pub fn current(&self) -> [PartitionName; 2] {
        [self.static_cache.clone(), self.data.clone()]
    }
}

/// Inputs of the request classifier. The order the rules apply in is fixed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouteRules {
    /// Paths starting with this prefix are API requests.
    pub api_prefix: String,
    /// Paths containing this substring are API requests too. Empty disables the rule.
    pub data_marker: String,
    /// Path suffixes of cacheable static assets.
    pub static_extensions: Vec<String>,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            api_prefix: "/api/".to_owned(),
            data_marker: "data".to_owned(),
            static_extensions: vec![".css".to_owned(), ".js".to_owned()],
        }
    }
}

/// What happens to a background resync that runs past its timeout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutAction {
    /// Abort the task.
    #[default]
    Cancel,
    /// Log a warning and let it finish.
    Warn,
}

/// Background sync settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// The only sync tag the worker reacts to.
    pub tag: String,
    /// Time budget of a deferred resync (e.g. "30s"). `None` means unbounded.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
    /// Action taken when the budget is exceeded.
    pub on_timeout: TimeoutAction,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag: "background-sync".to_owned(),
            timeout: Some(Duration::from_secs(30)),
            on_timeout: TimeoutAction::Cancel,
        }
    }
}

impl WorkerConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: WorkerConfig =
            serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Checks the invariants the worker relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin: Uri = self
            .origin
            .parse()
            .map_err(|_| ConfigError::InvalidOrigin(self.origin.clone()))?;
        if origin.scheme().is_none() || origin.authority().is_none() {
            return Err(ConfigError::InvalidOrigin(self.origin.clone()));
        }

        if self.caches.static_cache.as_str().is_empty() || self.caches.data.as_str().is_empty() {
            return Err(ConfigError::EmptyCacheName);
        }
        if self.caches.static_cache == self.caches.data {
            return Err(ConfigError::SameCacheNames(self.caches.data.to_string()));
        }

        for path in self.precache.iter().chain(std::iter::once(&self.root_document)) {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
            self.resolve(path)?;
        }
        Ok(())
    }

    /// Resolves `target` against the origin. Absolute URLs are returned as is.
    ///
    /// ```
    /// use swcache::WorkerConfig;
    ///
    /// let config = WorkerConfig::default();
    /// assert_eq!(config.resolve("/songs").unwrap(), "http://localhost:3000/songs");
    /// assert_eq!(config.resolve("api/songs").unwrap(), "http://localhost:3000/api/songs");
    /// assert_eq!(config.resolve("https://cdn.example/a.mp3").unwrap(), "https://cdn.example/a.mp3");
    /// ```
    pub fn resolve(&self, target: &str) -> Result<Uri, ConfigError> {
        if let Ok(uri) = target.parse::<Uri>()
            && uri.scheme().is_some()
        {
            return Ok(uri);
        }
        let origin = self.origin.trim_end_matches('/');
        let path = target.trim_start_matches('/');
        format!("{origin}/{path}")
            .parse()
            .map_err(|_| ConfigError::InvalidUrl(target.to_owned()))
    }

    /// Absolute URLs of the precache manifest, in order.
    pub fn manifest(&self) -> Result<Vec<Uri>, ConfigError> {
        self.precache.iter().map(|path| self.resolve(path)).collect()
    }
}
