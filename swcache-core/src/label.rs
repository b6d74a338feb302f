//! Partition name type for identifying cache partitions.
//!
//! `PartitionName` is a newtype wrapper around `SmolStr` that provides type safety
//! for partition identifiers used in storage, response source tracking and metrics.

use smol_str::SmolStr;
use std::fmt;

/// The name of a cache partition.
///
/// Names carry the deployment version (`praise-static-v2`), so two generations
/// of the same role never share a partition.
///
/// # Example
/// ```
/// use swcache_core::PartitionName;
///
/// let name = PartitionName::new("praise-static-v2");
/// assert_eq!(name.as_str(), "praise-static-v2");
/// assert_eq!(name.to_string(), "praise-static-v2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PartitionName(SmolStr);

impl PartitionName {
    /// Creates a new partition name.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a partition name from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PartitionName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for PartitionName {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl AsRef<str> for PartitionName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for PartitionName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for PartitionName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
