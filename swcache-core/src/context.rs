//! Response source tracking.

use crate::label::PartitionName;

/// Where a response handed back to the page came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseSource {
    /// Response came from the network (live fetch).
    #[default]
    Network,
    /// Response was replayed from the named partition.
    Partition(PartitionName),
    /// Response was produced locally, e.g. the offline placeholder.
    Synthesized,
}

impl ResponseSource {
    /// Returns the source as a string slice, used as a metrics label.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Partition(name) => name.as_str(),
            ResponseSource::Synthesized => "synthesized",
        }
    }

    /// Whether the response was served from a partition.
    pub fn is_cached(&self) -> bool {
        matches!(self, ResponseSource::Partition(_))
    }
}
